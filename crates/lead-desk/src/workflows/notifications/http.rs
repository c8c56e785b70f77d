use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::channel::{ChannelDeliveryError, Delivery, NotificationChannel};
use super::domain::{ChannelKind, NotificationMessage};

async fn ensure_success(response: reqwest::Response) -> Result<(), ChannelDeliveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(ChannelDeliveryError::Status {
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    })
}

fn authorized(request: reqwest::RequestBuilder, api_key: Option<&str>) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) => request.bearer_auth(key),
        None => request,
    }
}

/// Posts the whole message as JSON to the CRM intake hook.
#[derive(Debug, Clone)]
pub struct CrmWebhookChannel {
    client: Client,
    url: String,
}

impl CrmWebhookChannel {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotificationChannel for CrmWebhookChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::CrmWebhook
    }

    async fn deliver(
        &self,
        message: &NotificationMessage,
    ) -> Result<Delivery, ChannelDeliveryError> {
        let response = self.client.post(&self.url).json(message).send().await?;
        ensure_success(response).await?;
        Ok(Delivery::Sent)
    }
}

/// Texts the on-call staff phone so a tier A lead gets a call back fast.
#[derive(Debug, Clone)]
pub struct SmsGatewayChannel {
    client: Client,
    url: String,
    api_key: Option<String>,
    sender: Option<String>,
    staff_phone: Option<String>,
}

impl SmsGatewayChannel {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        api_key: Option<String>,
        sender: Option<String>,
        staff_phone: Option<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
            sender,
            staff_phone,
        }
    }
}

#[async_trait]
impl NotificationChannel for SmsGatewayChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn deliver(
        &self,
        message: &NotificationMessage,
    ) -> Result<Delivery, ChannelDeliveryError> {
        let Some(to) = self.staff_phone.as_deref() else {
            return Ok(Delivery::Skipped("no staff phone configured".to_string()));
        };

        let body = json!({
            "to": to,
            "from": self.sender,
            "body": message.headline(),
        });
        let request = authorized(self.client.post(&self.url), self.api_key.as_deref());
        let response = request.json(&body).send().await?;
        ensure_success(response).await?;
        Ok(Delivery::Sent)
    }
}

/// Transactional email to the customer that starts the drip sequence.
#[derive(Debug, Clone)]
pub struct EmailChannel {
    client: Client,
    url: String,
    api_key: Option<String>,
    sender: Option<String>,
}

impl EmailChannel {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        api_key: Option<String>,
        sender: Option<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
            sender,
        }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn deliver(
        &self,
        message: &NotificationMessage,
    ) -> Result<Delivery, ChannelDeliveryError> {
        let Some(to) = message
            .contact
            .email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
        else {
            return Ok(Delivery::Skipped("lead has no email address".to_string()));
        };

        let body = json!({
            "to": to,
            "from": self.sender,
            "subject": message.summary,
            "text": message.headline(),
            "event": message.event,
        });
        let request = authorized(self.client.post(&self.url), self.api_key.as_deref());
        let response = request.json(&body).send().await?;
        ensure_success(response).await?;
        Ok(Delivery::Sent)
    }
}
