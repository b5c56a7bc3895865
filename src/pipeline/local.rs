use super::{Sink, Source};
use crate::prelude::*;
use async_trait::async_trait;

/// A file on the local file system used in place of a chat attachment
pub(crate) struct LocalFile {
    path: Utf8PathBuf,
}

impl LocalFile {
    pub(crate) fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Source for LocalFile {
    fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).await.err_into()
    }
}

/// Writes the output file to the given destination and the messages to the log
pub(crate) struct LocalSink {
    destination: Utf8PathBuf,
}

impl LocalSink {
    pub(crate) fn new(destination: Utf8PathBuf) -> Self {
        Self { destination }
    }
}

#[async_trait]
impl Sink for LocalSink {
    async fn say(&self, text: &str) -> Result {
        warn!("{text}");
        Ok(())
    }

    async fn send_file(&self, path: &Utf8Path) -> Result {
        fs::copy(path, &self.destination).await?;

        let out_file = nu_ansi_term::Color::Magenta
            .bold()
            .paint(self.destination.as_str());

        info!("🔥 Saved output at {out_file}");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;
    use crate::pipeline::testing::MockFfmpeg;
    use crate::pipeline::{Outcome, Pipeline};

    #[test_log::test(tokio::test)]
    async fn local_file_round_trips_through_the_pipeline() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().to_utf8().unwrap();

        let input = dir.join("song.ogg");
        let output = dir.join("out.ogg");
        fs::write(&input, "audio").await.unwrap();

        let pipeline = Pipeline::builder()
            .ffmpeg(MockFfmpeg::copying() as std::sync::Arc<dyn crate::ffmpeg::Ffmpeg>)
            .work_dir(dir.to_owned())
            .build();

        let outcome = pipeline
            .run(
                &Effect::Pitch { semitones: 3.0 },
                Some(&LocalFile::new(input.clone())),
                &LocalSink::new(output.clone()),
            )
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Sent);
        assert_eq!(fs::read_to_string(&output).await.unwrap(), "audio");

        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        entries.sort();

        assert_eq!(entries, ["out.ogg", "song.ogg"]);
    }
}
