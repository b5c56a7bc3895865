//! Discord front end of the bot

mod command;
mod discord;

use crate::display;
use crate::ffmpeg::Ffmpeg;
use crate::pipeline::{Pipeline, Sink, Source, MAX_MESSAGE_CHARS};
use crate::prelude::*;
use async_trait::async_trait;
use command::Dispatch;
use discord::{AttachmentSource, ChannelSink};
use serenity::client::{Client, Context, EventHandler};
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use std::fmt;
use std::sync::Arc;

/// Everything the bot needs to run. Built once at startup.
pub(crate) struct BotConfig {
    pub(crate) token: String,

    /// Text that the commands start with
    pub(crate) prefix: String,

    /// Directory where the scratch directories of the requests are created
    pub(crate) work_dir: Utf8PathBuf,

    pub(crate) max_upload_bytes: u64,
    pub(crate) ffmpeg: Arc<dyn Ffmpeg>,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("prefix", &self.prefix)
            .field("work_dir", &self.work_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("ffmpeg", &self.ffmpeg)
            .finish()
    }
}

struct Handler {
    prefix: String,
    pipeline: Pipeline,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        let Some(dispatch) = self.command(msg.author.bot, &msg.content) else {
            return;
        };

        let span = info_span!(
            "request",
            channel = %msg.channel_id,
            author = %msg.author.name,
        );

        let sink = ChannelSink::new(ctx.http.clone(), &msg);
        let sources = msg.attachments.iter().map(AttachmentSource).collect_vec();

        if let Err(err) = self.respond(dispatch, &sources, &sink).instrument(span).await {
            error!(channel = %msg.channel_id, "Failed to reply to the message: {err:?}");
        }
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!("✅ Connected as {}", ready.user.name);
    }
}

impl Handler {
    /// Returns `None` if the message isn't meant for the bot. Messages of
    /// other bots are ignored to avoid reply loops.
    fn command(&self, from_bot: bool, content: &str) -> Option<Dispatch> {
        if from_bot {
            return None;
        }
        command::parse(&self.prefix, content)
    }

    /// Only the first of the `sources` is processed
    async fn respond(
        &self,
        dispatch: Dispatch,
        sources: &[impl Source],
        sink: &dyn Sink,
    ) -> Result {
        let effect = match dispatch {
            Dispatch::Effect(effect) => effect,
            Dispatch::Usage(usage) => {
                debug!("Replying with usage");
                return sink.say(&usage_reply(&usage)).await;
            }
        };

        let source = sources.first().map(|source| source as &dyn Source);

        let outcome = self.pipeline.run(&effect, source, sink).await?;

        info!(%outcome, "Request is handled");

        Ok(())
    }
}

/// Wraps the usage into a code block that fits into a single message
fn usage_reply(usage: &str) -> String {
    const FENCE: &str = "```";
    let max_chars = MAX_MESSAGE_CHARS - 2 * (FENCE.len() + 1);
    let usage = display::truncate_start(usage, max_chars);
    format!("{FENCE}\n{usage}\n{FENCE}")
}

/// Connects to Discord and serves the commands until `Ctrl+C`.
pub(crate) async fn run(config: BotConfig) -> Result {
    debug!(?config, "Starting the bot");

    let pipeline = Pipeline::builder()
        .ffmpeg(config.ffmpeg)
        .work_dir(config.work_dir)
        .max_upload_bytes(config.max_upload_bytes)
        .build();

    let handler = Handler {
        prefix: config.prefix,
        pipeline,
    };

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.token, intents)
        .event_handler(handler)
        .await
        .context("Failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err:?}");
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    client.start().await.context("Discord client failed")
}
