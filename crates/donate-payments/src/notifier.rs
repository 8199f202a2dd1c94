//! Side-channel notifications
//!
//! Every payment attempt, failure and success is announced on a side channel
//! (Slack in production). Notifications are fire-and-forget: delivery
//! problems are logged and never affect the donation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use donate_core::{DonationPayload, PaymentMode};

use crate::error::{PaymentError, Result};

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Notifier trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A payment has started (PayPal redirect about to happen)
    async fn notify_attempt(&self, mode: PaymentMode, payload: &DonationPayload);

    /// A payment was refused
    async fn notify_failure(&self, mode: PaymentMode, payload: &DonationPayload, error: &str);

    /// A payment went through
    async fn notify_success(&self, mode: PaymentMode, payload: &DonationPayload);
}

/// Message text for each event
fn attempt_text(mode: PaymentMode, payload: &DonationPayload) -> String {
    format!(":hourglass_flowing_sand: {mode} donation attempt: {}", payload.summary())
}

fn failure_text(mode: PaymentMode, payload: &DonationPayload, error: &str) -> String {
    format!(":x: {mode} donation failed: {} ({error})", payload.summary())
}

fn success_text(mode: PaymentMode, payload: &DonationPayload) -> String {
    let mut text = format!(":tada: {mode} donation received: {}", payload.summary());
    if let Some(comment) = &payload.comment {
        text.push_str(&format!("\n> {comment}"));
    }
    text
}

#[derive(Serialize)]
struct SlackMessage<'a> {
    text: &'a str,
}

/// Slack incoming-webhook notifier
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_NOTIFY_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("SLACK_WEBHOOK_URL")
            .map_err(|_| PaymentError::Config("SLACK_WEBHOOK_URL not set".into()))?;
        Self::new(url)
    }

    async fn post(&self, text: &str) {
        let result = self
            .client
            .post(&self.webhook_url)
            .json(&SlackMessage { text })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        if let Err(e) = result {
            tracing::warn!(error = %e, "Slack notification failed");
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify_attempt(&self, mode: PaymentMode, payload: &DonationPayload) {
        self.post(&attempt_text(mode, payload)).await;
    }

    async fn notify_failure(&self, mode: PaymentMode, payload: &DonationPayload, error: &str) {
        self.post(&failure_text(mode, payload, error)).await;
    }

    async fn notify_success(&self, mode: PaymentMode, payload: &DonationPayload) {
        self.post(&success_text(mode, payload)).await;
    }
}

/// Notifier that only logs, used when Slack is not configured
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_attempt(&self, mode: PaymentMode, payload: &DonationPayload) {
        tracing::info!(%mode, donation = %payload.donation, "{}", attempt_text(mode, payload));
    }

    async fn notify_failure(&self, mode: PaymentMode, payload: &DonationPayload, error: &str) {
        let text = failure_text(mode, payload, error);
        tracing::warn!(%mode, donation = %payload.donation, "{}", text);
    }

    async fn notify_success(&self, mode: PaymentMode, payload: &DonationPayload) {
        tracing::info!(%mode, donation = %payload.donation, "{}", success_text(mode, payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use donate_core::{Currency, GiftItem};
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn payload(comment: Option<&str>) -> DonationPayload {
        DonationPayload {
            amount: dec!(25),
            currency: Currency::Usd,
            gift_item: GiftItem::Gift25,
            gift_item_label: GiftItem::Gift25.label().into(),
            donation: "$25.00".into(),
            donor: "Jane Doe".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            wants_to_be_anonymous: false,
            comment: comment.map(String::from),
            postal_code: String::new(),
            payment_mode: PaymentMode::Stripe,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_text() {
        let text = success_text(PaymentMode::Stripe, &payload(Some("Go team")));
        assert_eq!(
            text,
            ":tada: Card donation received: $25.00 (Feed a volunteer) from Jane Doe\n> Go team"
        );

        let text = failure_text(PaymentMode::Stripe, &payload(None), "declined");
        assert!(text.ends_with("from Jane Doe (declined)"));
        assert!(!text.contains("jane@x.com"));
    }

    const OK_RESPONSE: &[u8] =
        b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok";

    /// Local webhook that answers one request and yields its body
    async fn webhook() -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return String::new();
                }
                raw.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&raw).into_owned();
                let Some((head, body)) = text.split_once("\r\n\r\n") else {
                    continue;
                };
                let length = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if body.len() >= length {
                    socket.write_all(OK_RESPONSE).await.unwrap();
                    return body.to_string();
                }
            }
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_slack_posts_text_payload() {
        let (url, request) = webhook().await;
        let notifier = SlackNotifier::new(url).unwrap();
        let payload = payload(Some("Go team"));

        notifier.notify_success(PaymentMode::Stripe, &payload).await;

        let body: serde_json::Value = serde_json::from_str(&request.await.unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "text": success_text(PaymentMode::Stripe, &payload) })
        );
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_swallowed() {
        let notifier = SlackNotifier::new("http://127.0.0.1:9/hook").unwrap();
        notifier.notify_attempt(PaymentMode::PayPal, &payload(None)).await;
    }
}
