use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::info;

use common::TelegramConfig;

/// Delivers generated posts to a Telegram chat through the Bot API.
pub struct TelegramNotifier {
    base_url: String,
    bot_token: String,
    chat_id: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn from_config(
        config: &TelegramConfig,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Trendpost/0.1.0")
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client,
        })
    }

    /// Send one message, with `chat_id` and `text` as query parameters of a
    /// GET request. Exactly a 200 status counts as delivered; anything else
    /// is an error carrying the response body. Telegram's message length
    /// limit is left to the API to enforce.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);

        let response = self
            .client
            .get(&url)
            .query(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await
            .context("telegram request failed")?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("telegram sendMessage failed with status {}: {}", status, body);
        }

        info!("telegram message delivered to chat {}", self.chat_id);
        Ok(())
    }
}
