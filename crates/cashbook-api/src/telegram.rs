//! Telegram Bot API payloads and the outbound transport

use async_trait::async_trait;
use cashbook_config::TelegramConfig;
use cashbook_core::{ChatTransport, CoreError, CoreResult, InboundMessage};
use serde::{Deserialize, Serialize};

// ==================== Webhook Payload ====================

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub date: i64,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
}

impl Update {
    /// Text messages only; everything else is acknowledged and ignored
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let text = message.text?;
        if text.trim().is_empty() {
            return None;
        }
        Some(InboundMessage {
            chat_id: message.chat.id.to_string(),
            text,
            username: message.from.and_then(|u| u.username),
        })
    }
}

// ==================== Transport ====================

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Posts replies to `sendMessage`
pub struct TelegramTransport {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    parse_mode: String,
}

impl TelegramTransport {
    /// `None` when no bot token is configured
    pub fn from_config(config: &TelegramConfig) -> Option<Self> {
        let token = config.bot_token.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: token.to_string(),
            parse_mode: config.parse_mode.clone(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, chat_id: &str, text: &str) -> CoreResult<()> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: &self.parse_mode,
        };
        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CoreError::transport(format!("sendMessage returned {}: {}", status, detail)));
        }
        Ok(())
    }
}

/// Drops replies when no bot token is configured
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl ChatTransport for LogTransport {
    async fn send(&self, chat_id: &str, text: &str) -> CoreResult<()> {
        log::warn!(
            target: "cashbook::telegram",
            "Bot token not configured, reply to chat {} dropped ({} chars)",
            chat_id,
            text.chars().count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_into_inbound() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 7,
                "from": { "id": 99, "is_bot": false, "first_name": "John", "username": "johnny" },
                "chat": { "id": -100123, "type": "private" },
                "date": 1704877200,
                "text": "gave john 500"
            }
        }))
        .unwrap();

        let inbound = update.into_inbound().unwrap();
        assert_eq!(inbound.chat_id, "-100123");
        assert_eq!(inbound.text, "gave john 500");
        assert_eq!(inbound.username.as_deref(), Some("johnny"));
    }

    #[test]
    fn test_non_text_updates_are_ignored() {
        let no_message: Update = serde_json::from_value(serde_json::json!({ "update_id": 2 })).unwrap();
        assert!(no_message.into_inbound().is_none());

        let sticker: Update = serde_json::from_value(serde_json::json!({
            "update_id": 3,
            "message": { "message_id": 8, "chat": { "id": 5, "type": "private" }, "date": 0 }
        }))
        .unwrap();
        assert!(sticker.into_inbound().is_none());
    }

    #[test]
    fn test_transport_requires_token() {
        assert!(TelegramTransport::from_config(&TelegramConfig::default()).is_none());

        let config = TelegramConfig {
            bot_token: " 123:abc ".to_string(),
            api_base: "https://api.telegram.org/".to_string(),
            parse_mode: "HTML".to_string(),
        };
        let transport = TelegramTransport::from_config(&config).unwrap();
        assert_eq!(
            transport.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
