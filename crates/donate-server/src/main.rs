//! donate-rs HTTP Server
//!
//! Axum-based server hosting the donation wizard: one server-side session per
//! donor, JSON endpoints for each step, and the PayPal return callback.

mod config;
mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use donate_core::MemorySessionStore;
use donate_payments::DonationCheckout;

use crate::config::ServerConfig;
use crate::handlers::{
    advance_step, catalog, create_session, get_session, go_to_step, health_check, paypal_return,
    reset_session, submit_donation,
};
use crate::state::AppState;

const PENDING_PURGE_INTERVAL: Duration = Duration::from_secs(600);

/// API routes (without static files)
pub(crate) fn build_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/catalog", get(catalog))

        // Wizard
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/steps", post(advance_step))
        .route("/api/sessions/{id}/goto", post(go_to_step))
        .route("/api/sessions/{id}/reset", post(reset_session))
        .route("/api/sessions/{id}/submit", post(submit_donation))

        // Payments
        .route("/paypal/return", get(paypal_return))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Initialize payments
    let card = config::card_gateway();
    let paypal = config::paypal_gateway(&config.public_url);
    let (notifier, slack_configured) = config::notifier();

    if card.is_none() && paypal.is_none() {
        tracing::warn!("⚠ No payment method configured - donations cannot be completed");
    }

    let checkout = Arc::new(DonationCheckout::new(card, paypal, notifier));

    // Drop PayPal payloads whose donors never came back
    let purge = checkout.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PENDING_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match purge.purge_expired_pending() {
                Ok(0) => {}
                Ok(n) => tracing::info!("Purged {} expired PayPal donations", n),
                Err(e) => tracing::warn!("PayPal purge failed: {}", e),
            }
        }
    });

    // Build application state
    let state = AppState {
        sessions: Arc::new(MemorySessionStore::new()),
        checkout,
        slack_configured,
    };

    // Static files (WASM frontend) for everything else
    let app = build_router(state).fallback_service(ServeDir::new(&config.static_dir));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("💝 donate-rs server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                      - Health check");
    tracing::info!("  GET  /api/catalog                 - Gift items, currencies, payment modes");
    tracing::info!("  POST /api/sessions                - Start a donation");
    tracing::info!("  GET  /api/sessions/{{id}}           - Current step and form values");
    tracing::info!("  POST /api/sessions/{{id}}/steps     - Submit the current step");
    tracing::info!("  POST /api/sessions/{{id}}/goto      - Jump to a step");
    tracing::info!("  POST /api/sessions/{{id}}/reset     - Start over");
    tracing::info!("  POST /api/sessions/{{id}}/submit    - Pay");
    tracing::info!("  GET  /paypal/return               - PayPal return URL");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
