use crate::pipeline::{Sink, Source};
use crate::prelude::*;
use async_trait::async_trait;
use serenity::builder::{CreateAllowedMentions, CreateAttachment, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::{Attachment, Message, MessageReference};
use serenity::model::id::ChannelId;
use std::sync::Arc;

pub(crate) struct AttachmentSource<'a>(pub(crate) &'a Attachment);

#[async_trait]
impl Source for AttachmentSource<'_> {
    fn file_name(&self) -> &str {
        &self.0.filename
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        self.0.download().await.err_into()
    }
}

/// Replies into the channel of the message that triggered the request
pub(crate) struct ChannelSink {
    http: Arc<Http>,
    channel_id: ChannelId,
    reference: MessageReference,
}

impl ChannelSink {
    pub(crate) fn new(http: Arc<Http>, msg: &Message) -> Self {
        Self {
            http,
            channel_id: msg.channel_id,
            reference: MessageReference::from(msg),
        }
    }
}

#[async_trait]
impl Sink for ChannelSink {
    async fn say(&self, text: &str) -> Result {
        self.channel_id
            .send_message(&self.http, text_message(text))
            .await?;
        Ok(())
    }

    async fn send_file(&self, path: &Utf8Path) -> Result {
        let attachment = CreateAttachment::path(path.as_std_path())
            .await
            .with_context(|| format!("Failed to read the output file {path}"))?;

        let message = file_message(self.reference.clone());

        self.channel_id
            .send_files(&self.http, vec![attachment], message)
            .await?;

        Ok(())
    }
}

/// Replies echo user input, so they must never ping anyone
fn quiet_message() -> CreateMessage {
    CreateMessage::new().allowed_mentions(CreateAllowedMentions::new())
}

fn text_message(text: &str) -> CreateMessage {
    quiet_message().content(text)
}

fn file_message(reference: MessageReference) -> CreateMessage {
    quiet_message().reference_message(reference)
}
