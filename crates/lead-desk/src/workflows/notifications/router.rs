use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};

use super::channel::{ChannelDeliveryError, ChannelSetupError, Delivery, NotificationChannel};
use super::domain::{
    ChannelKind, NotificationAttempt, NotificationMessage, NotificationPayload,
    NotificationSettings,
};
use super::http::{CrmWebhookChannel, EmailChannel, SmsGatewayChannel};
use crate::workflows::leads::{ContactDetails, LeadRoute, LeadTier};

/// Stand-in for "no deadline" when the configured one does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Concurrent fan-out to the channels a route calls for. Every channel gets its own
/// timeout and the whole fan-out shares one deadline.
#[derive(Clone)]
pub struct NotificationRouter {
    crm: Option<Arc<dyn NotificationChannel>>,
    sms: Option<Arc<dyn NotificationChannel>>,
    email: Option<Arc<dyn NotificationChannel>>,
    channel_timeout: Duration,
    deadline: Duration,
}

impl NotificationRouter {
    pub fn new(channel_timeout: Duration, deadline: Duration) -> Self {
        Self {
            crm: None,
            sms: None,
            email: None,
            channel_timeout,
            deadline,
        }
    }

    /// Router with no channels; every attempt is reported as skipped.
    pub fn disabled() -> Self {
        let defaults = NotificationSettings::default();
        Self::new(defaults.channel_timeout, defaults.deadline)
    }

    /// HTTP channels for every destination present in the settings.
    pub fn from_settings(settings: &NotificationSettings) -> Result<Self, ChannelSetupError> {
        let client = reqwest::Client::builder()
            .timeout(settings.channel_timeout)
            .build()?;

        let mut router = Self::new(settings.channel_timeout, settings.deadline);
        if let Some(url) = &settings.crm_webhook_url {
            router = router.with_channel(Arc::new(CrmWebhookChannel::new(client.clone(), url)));
        }
        if let Some(url) = &settings.sms_gateway_url {
            router = router.with_channel(Arc::new(SmsGatewayChannel::new(
                client.clone(),
                url,
                settings.sms_api_key.clone(),
                settings.sms_sender.clone(),
                settings.staff_phone.clone(),
            )));
        }
        if let Some(url) = &settings.email_api_url {
            router = router.with_channel(Arc::new(EmailChannel::new(
                client,
                url,
                settings.email_api_key.clone(),
                settings.email_sender.clone(),
            )));
        }

        tracing::debug!(
            crm = router.crm.is_some(),
            sms = router.sms.is_some(),
            email = router.email.is_some(),
            "notification channels configured"
        );
        Ok(router)
    }

    /// Install a channel in the slot matching its kind, replacing any previous one.
    pub fn with_channel(mut self, channel: Arc<dyn NotificationChannel>) -> Self {
        match channel.kind() {
            ChannelKind::CrmWebhook => self.crm = Some(channel),
            ChannelKind::Sms => self.sms = Some(channel),
            ChannelKind::Email => self.email = Some(channel),
        }
        self
    }

    fn channel(&self, kind: ChannelKind) -> Option<Arc<dyn NotificationChannel>> {
        match kind {
            ChannelKind::CrmWebhook => self.crm.clone(),
            ChannelKind::Sms => self.sms.clone(),
            ChannelKind::Email => self.email.clone(),
        }
    }

    /// One attempt per channel of the route, in route order. Never fails.
    pub async fn notify(
        &self,
        route: LeadRoute,
        tier: LeadTier,
        contact: &ContactDetails,
        payload: NotificationPayload,
    ) -> Vec<NotificationAttempt> {
        let kinds = ChannelKind::for_route(route);
        let message = Arc::new(NotificationMessage::new(route, tier, contact, payload));
        let deadline = deadline_after(self.deadline);

        let mut attempts: Vec<Option<NotificationAttempt>> = vec![None; kinds.len()];
        let mut tasks = JoinSet::new();

        for (index, kind) in kinds.into_iter().enumerate() {
            let Some(channel) = self.channel(kind) else {
                tracing::debug!(channel = %kind, "notification channel not configured");
                attempts[index] = Some(NotificationAttempt::skipped(
                    kind,
                    "channel not configured",
                ));
                continue;
            };
            let message = Arc::clone(&message);
            let budget = self.channel_timeout;
            tasks.spawn(async move {
                let outcome = match timeout(budget, channel.deliver(&message)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ChannelDeliveryError::Timeout(budget)),
                };
                (index, kind, outcome)
            });
        }

        let mut deadline_hit = false;
        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, kind, outcome)))) => {
                    attempts[index] = Some(record_outcome(kind, outcome));
                }
                Ok(Some(Err(join_error))) => {
                    tracing::warn!(error = %join_error, "notification task aborted");
                }
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    tasks.abort_all();
                    break;
                }
            }
        }

        kinds
            .into_iter()
            .zip(attempts)
            .map(|(kind, attempt)| {
                attempt.unwrap_or_else(|| {
                    let detail = if deadline_hit {
                        format!(
                            "notification deadline of {}ms elapsed",
                            self.deadline.as_millis()
                        )
                    } else {
                        "channel task aborted".to_string()
                    };
                    tracing::warn!(channel = %kind, %detail, "notification channel failed");
                    NotificationAttempt::failed(kind, detail)
                })
            })
            .collect()
    }
}

fn record_outcome(
    kind: ChannelKind,
    outcome: Result<Delivery, ChannelDeliveryError>,
) -> NotificationAttempt {
    match outcome {
        Ok(Delivery::Sent) => {
            tracing::debug!(channel = %kind, "notification sent");
            NotificationAttempt::sent(kind)
        }
        Ok(Delivery::Skipped(reason)) => {
            tracing::debug!(channel = %kind, %reason, "notification skipped");
            NotificationAttempt::skipped(kind, reason)
        }
        Err(error) => {
            tracing::warn!(channel = %kind, %error, "notification channel failed");
            NotificationAttempt::failed(kind, error.to_string())
        }
    }
}

impl std::fmt::Debug for NotificationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRouter")
            .field("crm", &self.crm.is_some())
            .field("sms", &self.sms.is_some())
            .field("email", &self.email.is_some())
            .field("channel_timeout", &self.channel_timeout)
            .field("deadline", &self.deadline)
            .finish()
    }
}

fn deadline_after(budget: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(budget)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
