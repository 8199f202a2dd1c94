//! PayPal Redirect Flow
//!
//! PayPal donations leave the page. Before redirecting, the payload is
//! persisted under a fresh token; PayPal sends the donor back to the return
//! URL carrying that token, which is how success is reported.
//!
//! ```text
//! ┌─────────────┐  persist  ┌──────────────┐  return?token=…  ┌─────────────┐
//! │  Payment    │──────────▶│    PayPal    │─────────────────▶│   Thanks    │
//! │  step       │  redirect │ donation page│                  │   view      │
//! └─────────────┘           └──────────────┘                  └─────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use donate_core::{DonationPayload, SessionId};

use crate::error::{PaymentError, Result};

pub const DEFAULT_PAYPAL_URL: &str = "https://www.paypal.com/cgi-bin/webscr";
pub const DEFAULT_PENDING_TTL_SECS: i64 = 3600;

/// Key for a donation awaiting PayPal's return
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingToken(String);

impl PendingToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PendingToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payload parked across the PayPal redirect
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingDonation {
    pub token: PendingToken,
    pub session_id: SessionId,
    pub payload: DonationPayload,
    pub expires_at: DateTime<Utc>,
}

impl PendingDonation {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Storage for pending donations
pub trait PendingStore: Send + Sync {
    fn save(&self, pending: &PendingDonation) -> Result<()>;

    /// Remove and return a pending donation
    fn take(&self, token: &PendingToken) -> Result<Option<PendingDonation>>;

    /// Drop expired entries, returning how many were removed
    fn purge_expired(&self) -> Result<usize>;
}

/// In-memory pending store (for development)
#[derive(Default)]
pub struct MemoryPendingStore {
    pending: RwLock<HashMap<PendingToken, PendingDonation>>,
}

impl MemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> PaymentError {
    PaymentError::Storage("pending store lock poisoned".into())
}

impl PendingStore for MemoryPendingStore {
    fn save(&self, pending: &PendingDonation) -> Result<()> {
        let mut map = self.pending.write().map_err(poisoned)?;
        map.insert(pending.token.clone(), pending.clone());
        Ok(())
    }

    fn take(&self, token: &PendingToken) -> Result<Option<PendingDonation>> {
        let mut map = self.pending.write().map_err(poisoned)?;
        Ok(map.remove(token))
    }

    fn purge_expired(&self) -> Result<usize> {
        let mut map = self.pending.write().map_err(poisoned)?;
        let before = map.len();
        map.retain(|_, p| !p.is_expired());
        Ok(before - map.len())
    }
}

/// PayPal settings
#[derive(Clone, Debug)]
pub struct PayPalConfig {
    /// Receiving account (email or merchant id)
    pub business: String,
    /// PayPal donation endpoint
    pub checkout_url: String,
    /// Base URL of this site, used to build return URLs
    pub public_url: String,
    pub pending_ttl: Duration,
}

impl PayPalConfig {
    pub fn new(business: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            business: business.into(),
            checkout_url: DEFAULT_PAYPAL_URL.to_string(),
            public_url: public_url.into(),
            pending_ttl: Duration::seconds(DEFAULT_PENDING_TTL_SECS),
        }
    }

    /// Create from environment variables
    pub fn from_env(public_url: &str) -> Result<Self> {
        let business = std::env::var("PAYPAL_BUSINESS")
            .map_err(|_| PaymentError::Config("PAYPAL_BUSINESS not set".into()))?;
        let mut config = Self::new(business, public_url);

        if let Ok(url) = std::env::var("PAYPAL_URL") {
            config.checkout_url = url;
        }
        if let Ok(ttl) = std::env::var("PAYPAL_PENDING_TTL_SECS") {
            let secs = ttl
                .parse::<i64>()
                .map_err(|_| {
                    PaymentError::Config(format!("invalid PAYPAL_PENDING_TTL_SECS: {ttl}"))
                })?;
            config.pending_ttl = Duration::seconds(secs);
        }
        Ok(config)
    }
}

/// PayPal adapter: persists payloads and builds redirect URLs
pub struct PayPalGateway {
    config: PayPalConfig,
    store: Arc<dyn PendingStore>,
}

impl PayPalGateway {
    pub fn new(config: PayPalConfig, store: Arc<dyn PendingStore>) -> Self {
        Self { config, store }
    }

    /// Park the payload until PayPal sends the donor back
    pub fn persist(
        &self,
        session_id: &SessionId,
        payload: &DonationPayload,
    ) -> Result<PendingToken> {
        let pending = PendingDonation {
            token: PendingToken::generate(),
            session_id: session_id.clone(),
            payload: payload.clone(),
            expires_at: Utc::now() + self.config.pending_ttl,
        };
        self.store.save(&pending)?;
        Ok(pending.token)
    }

    /// URL of PayPal's donation page for this payload
    pub fn redirect_url(&self, token: &PendingToken, payload: &DonationPayload) -> Result<Url> {
        let base = self.config.public_url.trim_end_matches('/');
        let return_url = format!("{base}/paypal/return?token={token}");
        let cancel_url = format!("{base}/");
        let item_name = if payload.gift_item_label.is_empty() {
            "Donation".to_string()
        } else {
            format!("Donation: {}", payload.gift_item_label)
        };
        let amount = format!("{:.2}", payload.amount.round_dp(2));

        Url::parse_with_params(
            &self.config.checkout_url,
            &[
                ("cmd", "_donations"),
                ("business", self.config.business.as_str()),
                ("item_name", item_name.as_str()),
                ("amount", amount.as_str()),
                ("currency_code", payload.currency.code()),
                ("no_shipping", "1"),
                ("return", return_url.as_str()),
                ("cancel_return", cancel_url.as_str()),
                ("custom", token.as_str()),
            ],
        )
        .map_err(|e| PaymentError::PayPal(format!("invalid PayPal URL: {e}")))
    }

    /// Claim the payload for a returning donor; unknown and expired tokens fail
    pub fn take(&self, token: &PendingToken) -> Result<PendingDonation> {
        let pending = self
            .store
            .take(token)?
            .ok_or_else(|| PaymentError::PayPal(format!("unknown return token {token}")))?;

        if pending.is_expired() {
            return Err(PaymentError::PayPal(format!("return token {token} expired")));
        }
        Ok(pending)
    }

    pub fn purge_expired(&self) -> Result<usize> {
        self.store.purge_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donate_core::{Currency, GiftItem, PaymentMode};
    use rust_decimal_macros::dec;

    fn payload() -> DonationPayload {
        DonationPayload {
            amount: dec!(50),
            currency: Currency::Cad,
            gift_item: GiftItem::Gift50,
            gift_item_label: GiftItem::Gift50.label().into(),
            donation: "CA$50.00".into(),
            donor: "Anonymous".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            wants_to_be_anonymous: true,
            comment: None,
            postal_code: String::new(),
            payment_mode: PaymentMode::PayPal,
            created_at: Utc::now(),
        }
    }

    fn gateway(ttl_secs: i64) -> PayPalGateway {
        let mut config = PayPalConfig::new("donations@example.org", "https://donate.example.org/");
        config.pending_ttl = Duration::seconds(ttl_secs);
        PayPalGateway::new(config, Arc::new(MemoryPendingStore::new()))
    }

    #[test]
    fn test_redirect_url() {
        let gateway = gateway(60);
        let token = PendingToken::from_string("abc123");
        let url = gateway.redirect_url(&token, &payload()).unwrap();

        assert_eq!(url.host_str(), Some("www.paypal.com"));
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["cmd"], "_donations");
        assert_eq!(params["amount"], "50.00");
        assert_eq!(params["currency_code"], "CAD");
        assert_eq!(
            params["return"],
            "https://donate.example.org/paypal/return?token=abc123"
        );
        assert_eq!(params["cancel_return"], "https://donate.example.org/");
    }

    #[test]
    fn test_persist_and_take_once() {
        let gateway = gateway(60);
        let session = SessionId::new();
        let token = gateway.persist(&session, &payload()).unwrap();

        let pending = gateway.take(&token).unwrap();
        assert_eq!(pending.session_id, session);
        assert_eq!(pending.payload.donation, "CA$50.00");

        assert!(matches!(gateway.take(&token), Err(PaymentError::PayPal(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let gateway = gateway(-1);
        let token = gateway.persist(&SessionId::new(), &payload()).unwrap();
        assert!(gateway.take(&token).is_err());

        gateway.persist(&SessionId::new(), &payload()).unwrap();
        assert_eq!(gateway.purge_expired().unwrap(), 1);
    }
}
