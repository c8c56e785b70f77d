//! Notification routing: CRM webhook plus SMS or email, depending on the lead's route.

mod channel;
pub mod domain;
mod http;
mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{ChannelDeliveryError, ChannelSetupError, Delivery, NotificationChannel};
pub use domain::{
    AttemptStatus, ChannelKind, NotificationAttempt, NotificationMessage, NotificationPayload,
    NotificationSettings,
};
pub use http::{CrmWebhookChannel, EmailChannel, SmsGatewayChannel};
pub use router::NotificationRouter;
