use std::time::Duration;

use async_trait::async_trait;

use super::domain::{ChannelKind, NotificationMessage};

/// Successful channel outcomes. A skip means the channel had nowhere to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped(String),
}

/// A channel failed or ran out of time. Recorded on the attempt, never raised further.
#[derive(Debug, thiserror::Error)]
pub enum ChannelDeliveryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl From<reqwest::Error> for ChannelDeliveryError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return Self::Transport(format!("request timed out: {value}"));
        }
        Self::Transport(value.to_string())
    }
}

/// Building the shared HTTP client failed.
#[derive(Debug, thiserror::Error)]
#[error("unable to build notification http client: {0}")]
pub struct ChannelSetupError(#[from] reqwest::Error);

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn deliver(
        &self,
        message: &NotificationMessage,
    ) -> Result<Delivery, ChannelDeliveryError>;
}
