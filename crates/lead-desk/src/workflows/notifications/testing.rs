use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{ChannelDeliveryError, ChannelKind, Delivery, NotificationChannel, NotificationMessage};

#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    Send,
    Skip(&'static str),
    Fail(&'static str),
    Stall(Duration),
}

/// Scripted channel that records every message it is handed.
#[derive(Debug)]
pub(crate) struct FakeChannel {
    kind: ChannelKind,
    behavior: Behavior,
    received: Mutex<Vec<NotificationMessage>>,
}

impl FakeChannel {
    pub(crate) fn new(kind: ChannelKind, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behavior,
            received: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn received(&self) -> Vec<NotificationMessage> {
        self.received.lock().expect("fake channel mutex").clone()
    }
}

#[async_trait]
impl NotificationChannel for FakeChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn deliver(
        &self,
        message: &NotificationMessage,
    ) -> Result<Delivery, ChannelDeliveryError> {
        self.received
            .lock()
            .expect("fake channel mutex")
            .push(message.clone());

        match &self.behavior {
            Behavior::Send => Ok(Delivery::Sent),
            Behavior::Skip(reason) => Ok(Delivery::Skipped(reason.to_string())),
            Behavior::Fail(reason) => Err(ChannelDeliveryError::Transport(reason.to_string())),
            Behavior::Stall(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(Delivery::Sent)
            }
        }
    }
}
