//! HTTP notification channels against mock CRM, SMS, and email endpoints.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use lead_desk::workflows::leads::{ContactDetails, LeadRoute, LeadTier};
use lead_desk::workflows::notifications::{
    AttemptStatus, ChannelKind, NotificationPayload, NotificationRouter, NotificationSettings,
};

fn contact(email: Option<&str>) -> ContactDetails {
    ContactDetails {
        name: "Morgan Reyes".to_string(),
        phone: Some("+15125550123".to_string()),
        email: email.map(str::to_string),
        zip: Some("78704".to_string()),
    }
}

fn settings(server: &MockServer) -> NotificationSettings {
    NotificationSettings {
        crm_webhook_url: Some(server.url("/crm/leads")),
        sms_gateway_url: Some(server.url("/sms/send")),
        sms_api_key: Some("sms-key".to_string()),
        sms_sender: Some("+15125550000".to_string()),
        staff_phone: Some("+15125559999".to_string()),
        email_api_url: Some(server.url("/email/send")),
        email_api_key: Some("mail-key".to_string()),
        email_sender: Some("office@example.com".to_string()),
        channel_timeout: Duration::from_secs(2),
        deadline: Duration::from_secs(4),
    }
}

fn payload() -> NotificationPayload {
    NotificationPayload::new("lead_scored", "book inquiry for 'Panel upgrade' scored 94")
        .with_details(json!({ "score": 94 }))
}

#[tokio::test]
async fn phone_route_posts_to_crm_and_texts_staff() {
    let server = MockServer::start_async().await;
    let crm = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/crm/leads")
                .json_body_partial(r#"{"event":"lead_scored","tier":"A","route":"phone_sms"}"#);
            then.status(202);
        })
        .await;
    let sms = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/sms/send")
                .header("authorization", "Bearer sms-key")
                .json_body_partial(r#"{"to":"+15125559999","from":"+15125550000"}"#);
            then.status(200).json_body(json!({ "id": "msg-1" }));
        })
        .await;

    let router = NotificationRouter::from_settings(&settings(&server)).expect("router builds");
    let attempts = router
        .notify(
            LeadRoute::PhoneSms,
            LeadTier::A,
            &contact(Some("morgan@example.com")),
            payload(),
        )
        .await;

    crm.assert_async().await;
    sms.assert_async().await;
    assert_eq!(attempts.len(), 2);
    assert!(attempts
        .iter()
        .all(|attempt| attempt.status == AttemptStatus::Sent));
}

#[tokio::test]
async fn drip_route_emails_the_customer() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/crm/leads");
            then.status(200);
        })
        .await;
    let email = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/email/send")
                .header("authorization", "Bearer mail-key")
                .json_body_partial(
                    r#"{"to":"morgan@example.com","from":"office@example.com","event":"lead_scored"}"#,
                );
            then.status(200);
        })
        .await;

    let router = NotificationRouter::from_settings(&settings(&server)).expect("router builds");
    let attempts = router
        .notify(
            LeadRoute::EmailDrip,
            LeadTier::B,
            &contact(Some("morgan@example.com")),
            payload(),
        )
        .await;

    email.assert_async().await;
    assert_eq!(attempts[1].channel, ChannelKind::Email);
    assert_eq!(attempts[1].status, AttemptStatus::Sent);
}

#[tokio::test]
async fn crm_outage_is_recorded_without_blocking_sms() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/crm/leads");
            then.status(500).body("upstream unavailable");
        })
        .await;
    let sms = server
        .mock_async(|when, then| {
            when.method(POST).path("/sms/send");
            then.status(200);
        })
        .await;

    let router = NotificationRouter::from_settings(&settings(&server)).expect("router builds");
    let attempts = router
        .notify(LeadRoute::PhoneSms, LeadTier::A, &contact(None), payload())
        .await;

    sms.assert_async().await;
    assert_eq!(attempts[0].status, AttemptStatus::Failed);
    let detail = attempts[0].detail.as_deref().unwrap_or_default();
    assert!(detail.contains("500"));
    assert!(detail.contains("upstream unavailable"));
    assert_eq!(attempts[1].status, AttemptStatus::Sent);
}

#[tokio::test]
async fn email_without_address_is_skipped_not_sent() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/crm/leads");
            then.status(200);
        })
        .await;
    let email = server
        .mock_async(|when, then| {
            when.method(POST).path("/email/send");
            then.status(200);
        })
        .await;

    let router = NotificationRouter::from_settings(&settings(&server)).expect("router builds");
    let attempts = router
        .notify(LeadRoute::EmailDrip, LeadTier::B, &contact(None), payload())
        .await;

    assert_eq!(email.hits_async().await, 0);
    assert_eq!(attempts[1].status, AttemptStatus::Skipped);
    assert_eq!(
        attempts[1].detail.as_deref(),
        Some("lead has no email address")
    );
}

#[tokio::test]
async fn slow_gateway_fails_within_the_channel_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/crm/leads");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/sms/send");
            then.status(200).delay(Duration::from_secs(3));
        })
        .await;

    let mut settings = settings(&server);
    settings.channel_timeout = Duration::from_millis(200);
    settings.deadline = Duration::from_secs(2);
    let router = NotificationRouter::from_settings(&settings).expect("router builds");

    let started = std::time::Instant::now();
    let attempts = router
        .notify(LeadRoute::PhoneSms, LeadTier::A, &contact(None), payload())
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(attempts[0].status, AttemptStatus::Sent);
    assert_eq!(attempts[1].status, AttemptStatus::Failed);
}

#[tokio::test]
async fn missing_staff_phone_skips_sms() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/crm/leads");
            then.status(200);
        })
        .await;
    let sms = server
        .mock_async(|when, then| {
            when.method(POST).path("/sms/send");
            then.status(200);
        })
        .await;

    let mut settings = settings(&server);
    settings.staff_phone = None;
    let router = NotificationRouter::from_settings(&settings).expect("router builds");
    let attempts = router
        .notify(LeadRoute::PhoneSms, LeadTier::A, &contact(None), payload())
        .await;

    assert_eq!(sms.hits_async().await, 0);
    assert_eq!(attempts[1].status, AttemptStatus::Skipped);
}
