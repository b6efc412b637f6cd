// https://core.telegram.org/bots/api#sendmessage

use std::time::Duration;

pub mod models;
use reqwest::Client;
use thiserror::Error;

use crate::models::{ApiResponse, SendMessageRequest};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("request to Telegram failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    client: Client,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { options, client }
    }

    pub fn chat_id(&self) -> &str {
        &self.options.chat_id
    }

    /// Post an HTML-formatted message to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let url = format!(
            "{base}/bot{token}/sendMessage",
            base = API_BASE,
            token = self.options.bot_token
        );

        let body = SendMessageRequest {
            chat_id: &self.options.chat_id,
            text,
            parse_mode: Some("HTML"),
        };

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ApiResponse>().await {
                Ok(api) => api.description.unwrap_or_default(),
                Err(_) => String::new(),
            };
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api = response.json::<ApiResponse>().await?;
        if !api.ok {
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message: api.description.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
