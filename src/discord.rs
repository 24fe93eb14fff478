//! Chat delivery: hands rendered messages to a Discord channel over the REST API.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DeliveryError;
use crate::models::{DisplayField, DisplayMessage};
use crate::render::truncate_chars;

pub const DEFAULT_API_URL: &str = "https://discord.com/api/v10";

const MAX_TITLE_LENGTH: usize = 256;
const MAX_FIELD_VALUE_LENGTH: usize = 1024;
const MAX_FOOTER_LENGTH: usize = 2048;
/// Discord rejects empty field values.
const EMPTY_FIELD_VALUE: &str = "\u{200b}";

/// Destination channel snowflake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything able to deliver a rendered message to a channel.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, channel: &ChannelId, message: &DisplayMessage)
        -> Result<(), DeliveryError>;
}

pub struct DiscordClient {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

impl DiscordClient {
    pub fn new(token: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self, channel: &ChannelId) -> String {
        format!("{}/channels/{channel}/messages", self.api_url)
    }
}

#[async_trait]
impl DeliverySink for DiscordClient {
    async fn deliver(
        &self,
        channel: &ChannelId,
        message: &DisplayMessage,
    ) -> Result<(), DeliveryError> {
        let body = CreateMessage {
            embeds: vec![Embed::from(message)],
        };

        let resp = self
            .client
            .post(self.messages_url(channel))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        tracing::debug!(%channel, "Discord accepted message");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CreateMessage {
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    url: String,
    color: u32,
    fields: Vec<EmbedField>,
    footer: EmbedFooter,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

impl From<&DisplayMessage> for Embed {
    fn from(message: &DisplayMessage) -> Self {
        Self {
            title: truncate_chars(&message.title, MAX_TITLE_LENGTH),
            url: message.link_target.clone(),
            color: message.accent_color.to_u32(),
            fields: message.fields.iter().map(EmbedField::from).collect(),
            footer: EmbedFooter {
                text: truncate_chars(&message.footer, MAX_FOOTER_LENGTH),
            },
            timestamp: message.timestamp.to_rfc3339(),
        }
    }
}

impl From<&DisplayField> for EmbedField {
    fn from(field: &DisplayField) -> Self {
        let value = if field.value.is_empty() {
            EMPTY_FIELD_VALUE.to_string()
        } else {
            truncate_chars(&field.value, MAX_FIELD_VALUE_LENGTH)
        };

        Self {
            name: field.label.clone(),
            value,
            inline: field.inline,
        }
    }
}
