//! Notification channel seam.

use async_trait::async_trait;

use crate::error::NotifyError;

/// Posts a short message somewhere a human will see it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}
