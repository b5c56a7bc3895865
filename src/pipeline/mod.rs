//! The path of a single request: the attachment is saved into a scratch
//! directory, transformed with ffmpeg and sent back as a reply.

mod local;

#[cfg(test)]
pub(crate) mod testing;

use crate::display;
use crate::effect::Effect;
use crate::ffmpeg::Ffmpeg;
use crate::prelude::*;
use crate::util::byte_size::MIB;
use crate::util::path::sanitize_file_name;
use async_trait::async_trait;
use buildstructor::buildstructor;
use std::sync::Arc;

pub(crate) use local::{LocalFile, LocalSink};

pub(crate) const ATTACH_PROMPT: &str = "Please attach a video or audio file.";

pub(crate) const ERROR_PREFIX: &str = "❌ Error: ";

/// Discord rejects messages longer than this
pub(crate) const MAX_MESSAGE_CHARS: usize = 2000;

/// Upload limit of Discord for bots in servers without boosts
pub(crate) const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * MIB;

/// The file that the user wants to process
#[async_trait]
pub(crate) trait Source: Send + Sync {
    /// Name of the file as given by the user. It may contain anything,
    /// including path separators.
    fn file_name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Where the replies to the user go
#[async_trait]
pub(crate) trait Sink: Send + Sync {
    async fn say(&self, text: &str) -> Result;

    async fn send_file(&self, path: &Utf8Path) -> Result;
}

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum Outcome {
    MissingAttachment,
    Sent,
    Failed,
}

pub(crate) struct Pipeline {
    ffmpeg: Arc<dyn Ffmpeg>,
    work_dir: Utf8PathBuf,
    max_upload_bytes: u64,
}

#[buildstructor]
impl Pipeline {
    #[builder]
    pub(crate) fn new(
        ffmpeg: Arc<dyn Ffmpeg>,
        work_dir: Utf8PathBuf,
        max_upload_bytes: Option<u64>,
    ) -> Self {
        Self {
            ffmpeg,
            work_dir,
            max_upload_bytes: max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

impl Pipeline {
    /// Processes the `source` with the `effect` and replies to the `sink`.
    ///
    /// Failures of the processing itself, including a failed file upload, are
    /// reported to the user and aren't returned as errors. Only a failure to
    /// send a text reply is returned.
    #[instrument(
        name = "pipeline",
        skip_all,
        fields(
            %effect,
            file = source.map(|source| source.file_name()),
        )
    )]
    pub(crate) async fn run(
        &self,
        effect: &Effect,
        source: Option<&dyn Source>,
        sink: &dyn Sink,
    ) -> Result<Outcome> {
        let Some(source) = source else {
            info!("No attachment was given");
            sink.say(ATTACH_PROMPT).await?;
            return Ok(Outcome::MissingAttachment);
        };

        let Err(err) = self.process(effect, source, sink).await else {
            return Ok(Outcome::Sent);
        };

        warn!("Failed to process the attachment: {err:#}");

        sink.say(&error_message(&err)).await?;

        Ok(Outcome::Failed)
    }

    async fn process(&self, effect: &Effect, source: &dyn Source, sink: &dyn Sink) -> Result {
        let scratch = Scratch::new(&self.work_dir, source.file_name())?;

        let result = self.process_in(&scratch, effect, source, sink).await;

        scratch.close();

        result
    }

    async fn process_in(
        &self,
        scratch: &Scratch,
        effect: &Effect,
        source: &dyn Source,
        sink: &dyn Sink,
    ) -> Result {
        let bytes = source
            .fetch()
            .await
            .context("Failed to download the attachment")?;

        debug!(size = %display::human_size(bytes.len()), "Downloaded the attachment");

        fs::write(&scratch.input, bytes).await?;

        let output = self
            .ffmpeg
            .transform(&scratch.input, &scratch.output, effect.ffmpeg_args())
            .await?;

        let size = fs::metadata(&output).await?.len();

        ensure!(
            size <= self.max_upload_bytes,
            "The output file is {}, which exceeds the upload limit of {}",
            display::human_size(size),
            display::human_size(self.max_upload_bytes),
        );

        sink.send_file(&output).await?;

        info!("🔥 Sent the output of {}", display::bold(&display::human_size(size)));

        Ok(())
    }
}

fn error_message(err: &anyhow::Error) -> String {
    let max_chars = MAX_MESSAGE_CHARS - ERROR_PREFIX.chars().count();
    let details = display::truncate_start(&format!("{err:#}"), max_chars);
    format!("{ERROR_PREFIX}{details}")
}

/// A directory unique to a single request that holds its input and output
/// files. It is removed on drop, so nothing is left behind even if the
/// request is cancelled midway.
struct Scratch {
    dir: tempfile::TempDir,
    input: Utf8PathBuf,
    output: Utf8PathBuf,
}

impl Scratch {
    fn new(work_dir: &Utf8Path, file_name: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(".cv")
            .tempdir_in(work_dir)
            .with_context(|| format!("Failed to create a scratch directory in `{work_dir}`"))?;

        let path = dir.path().to_utf8()?;
        let file_name = sanitize_file_name(file_name);

        Ok(Self {
            input: path.join(format!("input_{file_name}")),
            output: path.join(format!("output_{file_name}")),
            dir,
        })
    }

    fn close(self) {
        let path = self.dir.path().to_owned();
        self.dir
            .close()
            .warn_err(&format!("Failed to remove the scratch directory {path:?}"));
    }
}
