use crate::prelude::*;
use crate::util::cmd;
use async_trait::async_trait;
use clap::Args;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[async_trait]
pub(crate) trait Ffmpeg: fmt::Debug + Send + Sync {
    /// Invoke ffmpeg process with the given arguments.
    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>>;

    /// Transforms the `input` file into the `output` file, overwriting the
    /// latter if it exists. The `args` are placed between the input and the
    /// output on the command line.
    async fn transform(
        &self,
        input: &Utf8Path,
        output: &Utf8Path,
        args: Vec<String>,
    ) -> Result<Utf8PathBuf> {
        let args = ["-y", "-i", input.as_str()]
            .into_iter()
            .map(ToOwned::to_owned)
            .chain(args)
            .chain([output.to_string()])
            .collect();

        self.run(args).await?;

        Ok(output.to_owned())
    }
}

/// Options of the real ffmpeg process
#[derive(Args, Debug, Clone)]
pub(crate) struct FfmpegOptions {
    /// Name or path of the ffmpeg executable
    #[clap(long = "ffmpeg", env = "CHEESEVIDEO_FFMPEG", default_value = "ffmpeg")]
    program: String,

    /// Kill ffmpeg if it runs longer than this. No limit by default.
    #[clap(long, value_parser = crate::util::duration::parse)]
    ffmpeg_timeout: Option<Duration>,

    /// Max number of ffmpeg processes running at the same time.
    /// Defaults to the number of available CPUs.
    #[clap(long)]
    max_jobs: Option<NonZeroUsize>,
}

impl FfmpegOptions {
    pub(crate) fn into_process(self) -> Arc<dyn Ffmpeg> {
        let max_jobs = self.max_jobs.unwrap_or_else(default_max_jobs);

        Arc::new(FfmpegProcess {
            program: self.program,
            timeout: self.ffmpeg_timeout,
            jobs: Semaphore::new(max_jobs.get()),
        })
    }
}

fn default_max_jobs() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or_else(|err| {
        let default = NonZeroUsize::MIN;
        warn!(
            err = &err as &dyn std::error::Error,
            "Failed to query the system's available parallelism. \
            Falling back to the default value of {default}",
        );
        default
    })
}

#[derive(Debug)]
pub(crate) struct FfmpegProcess {
    program: String,
    timeout: Option<Duration>,
    jobs: Semaphore,
}

#[async_trait]
impl Ffmpeg for FfmpegProcess {
    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>> {
        let _permit = self
            .jobs
            .acquire()
            .await
            .context("ffmpeg job queue was closed")?;

        cmd::run_cmd(&self.program, args, self.timeout).await
    }
}
