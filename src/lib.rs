mod bot;
mod cmd;
mod display;
mod effect;
mod ffmpeg;
mod pipeline;
mod prelude;
mod util;

use clap::Parser;
use cmd::Cmd;

/// A Discord bot that applies ffmpeg effects to the attached media files
#[derive(Parser)]
#[command(version)]
enum Args {
    Serve(cmd::Serve),
    Apply(cmd::Apply),
}

pub async fn run() -> anyhow::Result<()> {
    match Args::parse() {
        Args::Serve(cmd) => cmd.run().await,
        Args::Apply(cmd) => cmd.run().await,
    }
}
