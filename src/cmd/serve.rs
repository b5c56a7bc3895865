use crate::bot::BotConfig;
use crate::ffmpeg::FfmpegOptions;
use crate::pipeline::DEFAULT_MAX_UPLOAD_BYTES;
use crate::prelude::*;
use async_trait::async_trait;
use clap::Parser;

/// Run the Discord bot
///
/// The bot listens for messages that start with the prefix, downloads the
/// attached file, runs ffmpeg over it and replies with the result.
#[derive(Parser)]
pub struct Serve {
    /// Token of the Discord bot
    #[clap(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: String,

    /// Text that the commands must start with
    #[clap(long, default_value = "cv ")]
    prefix: String,

    /// Directory where temporary files of the requests are created
    #[clap(long, default_value = ".")]
    work_dir: Utf8PathBuf,

    /// Outputs bigger than this many bytes are reported as errors instead
    /// of being uploaded
    #[clap(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: u64,

    #[clap(flatten)]
    ffmpeg: FfmpegOptions,
}

#[async_trait]
impl crate::cmd::Cmd for Serve {
    async fn run(self) -> Result {
        ensure!(!self.prefix.trim().is_empty(), "The prefix must not be blank");

        fs::create_dir_all(&self.work_dir).await?;

        let config = BotConfig {
            token: self.token,
            prefix: self.prefix,
            work_dir: self.work_dir,
            max_upload_bytes: self.max_upload_bytes,
            ffmpeg: self.ffmpeg.into_process(),
        };

        crate::bot::run(config).await
    }
}
