//! Server configuration from the environment

use std::sync::Arc;

use donate_payments::{
    CardGateway, LogNotifier, MemoryPendingStore, MockCardGateway, Notifier, PayPalConfig,
    PayPalGateway, SlackNotifier, StripeCardGateway,
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Process-level settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Externally visible base URL, used for PayPal return links
    pub public_url: String,
    /// Directory holding the built frontend
    pub static_dir: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            public_url: env_or("PUBLIC_URL", DEFAULT_PUBLIC_URL),
            static_dir: env_or("STATIC_DIR", DEFAULT_STATIC_DIR),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Card gateway selected by `CARD_GATEWAY` (`mock`) or `STRIPE_SECRET_KEY`
pub fn card_gateway() -> Option<Arc<dyn CardGateway>> {
    if std::env::var("CARD_GATEWAY").is_ok_and(|v| v.eq_ignore_ascii_case("mock")) {
        tracing::warn!("⚠ Using mock card gateway - no real charges");
        return Some(Arc::new(MockCardGateway::new()));
    }

    match StripeCardGateway::from_env() {
        Ok(stripe) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(stripe))
        }
        Err(e) => {
            tracing::warn!("⚠ Card payments disabled: {}", e);
            tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
            None
        }
    }
}

pub fn paypal_gateway(public_url: &str) -> Option<Arc<PayPalGateway>> {
    match PayPalConfig::from_env(public_url) {
        Ok(config) => {
            tracing::info!(business = %config.business, "✓ PayPal configured");
            Some(Arc::new(PayPalGateway::new(
                config,
                Arc::new(MemoryPendingStore::new()),
            )))
        }
        Err(e) => {
            tracing::warn!("⚠ PayPal disabled: {}", e);
            tracing::warn!("  Set PAYPAL_BUSINESS in .env");
            None
        }
    }
}

/// Slack notifier, or a logging one when Slack is not configured
pub fn notifier() -> (Arc<dyn Notifier>, bool) {
    match SlackNotifier::from_env() {
        Ok(slack) => {
            tracing::info!("✓ Slack notifications enabled");
            (Arc::new(slack), true)
        }
        Err(e) => {
            tracing::warn!("⚠ Slack disabled ({}), notifications will only be logged", e);
            (Arc::new(LogNotifier), false)
        }
    }
}
