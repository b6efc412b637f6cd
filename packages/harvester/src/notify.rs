//! Session-end notifications.

use async_trait::async_trait;
use telegram::{TelegramOptions, TelegramService};
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::traits::notifier::Notifier;

/// Posts to a Telegram chat through the Bot API.
pub struct TelegramNotifier {
    service: TelegramService,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            service: TelegramService::new(TelegramOptions {
                bot_token: bot_token.into(),
                chat_id: chat_id.into(),
            }),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.service.send_message(message).await?;
        info!(chat_id = self.service.chat_id(), "Notification sent");
        Ok(())
    }
}

/// Fire-and-forget delivery: failures are logged, never returned.
pub async fn notify_quietly(notifier: Option<&dyn Notifier>, message: &str) -> bool {
    let Some(notifier) = notifier else {
        return false;
    };
    match notifier.notify(message).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Notification not delivered");
            false
        }
    }
}
