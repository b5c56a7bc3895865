use crate::effect::Effect;
use crate::ffmpeg::FfmpegOptions;
use crate::pipeline::{LocalFile, LocalSink, Outcome, Pipeline};
use crate::prelude::*;
use async_trait::async_trait;
use clap::Parser;

/// Apply an effect to a local media file the same way the bot does
///
/// Example: cheesevideo apply clip.mp4 huesaturation 180 2.0
#[derive(Parser, Debug)]
pub struct Apply {
    /// Path to the input media file
    input: Utf8PathBuf,

    /// Path to the output. By default, the output is put into the same
    /// directory under the name `output_<input file name>`.
    #[clap(long, short)]
    output: Option<Utf8PathBuf>,

    #[clap(flatten)]
    ffmpeg: FfmpegOptions,

    #[command(subcommand)]
    effect: Effect,
}

#[async_trait]
impl crate::cmd::Cmd for Apply {
    async fn run(self) -> Result {
        let output = self.output_path()?;

        let work_dir = output
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."))
            .to_owned();

        ensure!(
            fs::metadata(&self.input).await?.is_file(),
            "The input must be a file: {}",
            self.input
        );

        let pipeline = Pipeline::builder()
            .ffmpeg(self.ffmpeg.into_process())
            .work_dir(work_dir)
            .max_upload_bytes(u64::MAX)
            .build();

        let outcome = pipeline
            .run(
                &self.effect,
                Some(&LocalFile::new(self.input.clone())),
                &LocalSink::new(output),
            )
            .await?;

        ensure!(outcome == Outcome::Sent, "Failed to apply {}", self.effect);

        Ok(())
    }
}

impl Apply {
    fn output_path(&self) -> Result<Utf8PathBuf> {
        if let Some(output) = &self.output {
            return Ok(output.clone());
        }

        let file_name = self
            .input
            .file_name()
            .with_context(|| format!("Input must have a file name, but got `{}`", self.input))?;

        Ok(self.input.with_file_name(format!("output_{file_name}")))
    }
}
