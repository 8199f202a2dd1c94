//! Application State

use std::sync::Arc;

use donate_core::SessionStore;
use donate_payments::DonationCheckout;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Wizard sessions
    pub sessions: Arc<dyn SessionStore>,

    /// Submission handler with its payment adapters
    pub checkout: Arc<DonationCheckout>,

    /// Whether notifications go to Slack (otherwise they are only logged)
    pub slack_configured: bool,
}
