use super::{Sink, Source};
use crate::ffmpeg::Ffmpeg;
use crate::prelude::*;
use anyhow::bail;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
enum Behavior {
    /// Copies the input file to the output as if the effect was applied
    Copy,
    /// Fails with the given diagnostic
    Fail(String),
}

#[derive(Debug)]
pub(crate) struct MockFfmpeg {
    behavior: Behavior,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockFfmpeg {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Default::default(),
        })
    }

    pub(crate) fn copying() -> Arc<Self> {
        Self::new(Behavior::Copy)
    }

    pub(crate) fn failing(stderr: &str) -> Arc<Self> {
        Self::new(Behavior::Fail(stderr.to_owned()))
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Ffmpeg for MockFfmpeg {
    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(args.clone());

        let stderr = match &self.behavior {
            Behavior::Fail(stderr) => stderr,
            Behavior::Copy => {
                let input_pos = args.iter().position(|arg| arg == "-i").unwrap();
                let input = &args[input_pos + 1];
                let output = args.last().unwrap();

                let bytes = fs::read(input).await?;

                // Give concurrent requests a chance to interleave
                tokio::time::sleep(Duration::from_millis(10)).await;

                fs::write(output, bytes).await?;

                return Ok(vec![]);
            }
        };

        bail!("{stderr}")
    }
}

pub(crate) struct MemorySource {
    name: String,
    bytes: Option<Vec<u8>>,
}

impl MemorySource {
    pub(crate) fn new(name: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_owned(),
            bytes: Some(bytes.to_vec()),
        }
    }

    /// Source which fails to download
    pub(crate) fn broken(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            bytes: None,
        }
    }
}

#[async_trait]
impl Source for MemorySource {
    fn file_name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        self.bytes.clone().context("connection reset")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    Text(String),
    File { name: String, bytes: Vec<u8> },
}

#[derive(Default)]
pub(crate) struct RecordingSink(Mutex<Vec<Reply>>);

impl RecordingSink {
    pub(crate) fn into_replies(self) -> Vec<Reply> {
        self.0.into_inner().unwrap()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn say(&self, text: &str) -> Result {
        self.0.lock().unwrap().push(Reply::Text(text.to_owned()));
        Ok(())
    }

    async fn send_file(&self, path: &Utf8Path) -> Result {
        let bytes = fs::read(path).await?;
        let name = path.file_name().unwrap().to_owned();

        self.0.lock().unwrap().push(Reply::File { name, bytes });
        Ok(())
    }
}
