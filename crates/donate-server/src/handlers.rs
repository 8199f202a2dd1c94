//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use donate_core::{
    Currency, DonationSession, FieldErrors, GiftItem, PaymentMode, PaymentSelection, SessionId,
    Step, StepValues, WizardError,
};
use donate_payments::{CardHandle, PaymentError, PendingToken, SubmitOutcome, SubmitRequest};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub card_enabled: bool,
    pub paypal_enabled: bool,
    pub slack_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftOption {
    pub value: &'static str,
    pub label: &'static str,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyOption {
    pub code: &'static str,
    pub symbol: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub gift_items: Vec<GiftOption>,
    pub currencies: Vec<CurrencyOption>,
    pub payment_modes: Vec<PaymentMode>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountView {
    pub amount: Decimal,
    pub currency: Currency,
    pub donation: String,
}

/// Everything the page needs to render the current step
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub current_step: Step,
    /// Steps submitted at least once
    pub completed: Vec<Step>,
    /// Pre-filled form for every step
    pub forms: Vec<StepValues>,
    pub amount: Option<AmountView>,
    pub pending: bool,
}

impl From<&DonationSession> for SessionView {
    fn from(session: &DonationSession) -> Self {
        let wizard = &session.wizard;
        Self {
            session_id: session.id.to_string(),
            current_step: wizard.current_step(),
            completed: Step::ALL
                .into_iter()
                .filter(|s| wizard.has_values(*s))
                .collect(),
            forms: Step::ALL.into_iter().map(|s| wizard.form_values(s)).collect(),
            amount: wizard.amount().map(|(amount, currency)| AmountView {
                amount,
                currency,
                donation: currency.format(amount),
            }),
            pending: session.pending,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GoToRequest {
    pub step: Step,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
    #[serde(default)]
    pub payment: PaymentSelection,
    #[serde(default)]
    pub card_handle: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SubmitResponse {
    Redirect { url: String },
    Donated {
        donation: String,
        donor: String,
        reference: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct PayPalReturn {
    pub token: String,
}

// ============================================================================
// Error mapping
// ============================================================================

fn api_error(
    status: StatusCode,
    code: &str,
    error: String,
    fields: Option<FieldErrors>,
) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.into(),
            fields,
        }),
    )
}

fn wizard_error(e: &WizardError) -> ApiError {
    let (status, code) = match e {
        WizardError::Validation(_)
        | WizardError::MissingStep(_)
        | WizardError::InvalidAmount(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        WizardError::StepMismatch { .. } | WizardError::FinalStep(_) => {
            (StatusCode::CONFLICT, "WRONG_STEP")
        }
        WizardError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
        WizardError::SubmissionInFlight => (StatusCode::CONFLICT, "SUBMISSION_PENDING"),
        WizardError::Session(_) => {
            tracing::error!("Session store error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR")
        }
    };
    api_error(status, code, e.user_message(), e.field_errors().cloned())
}

fn payment_error(e: &PaymentError) -> ApiError {
    let (status, code) = match e {
        PaymentError::Wizard(inner) => return wizard_error(inner),
        PaymentError::Declined(_) | PaymentError::MissingCard => {
            (StatusCode::PAYMENT_REQUIRED, "PAYMENT_DECLINED")
        }
        PaymentError::CardUnavailable | PaymentError::Config(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "PAYMENTS_DISABLED")
        }
        PaymentError::Stripe(_) | PaymentError::PayPal(_) => {
            tracing::error!("Payment provider error: {}", e);
            (StatusCode::BAD_GATEWAY, "PAYMENT_ERROR")
        }
        PaymentError::Storage(_) => {
            tracing::error!("Payment storage error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "PAYMENT_ERROR")
        }
    };
    api_error(status, code, e.user_message(), e.field_errors())
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        card_enabled: state.checkout.card_enabled(),
        paypal_enabled: state.checkout.paypal_enabled(),
        slack_configured: state.slack_configured,
    })
}

/// Gift items, currencies and available payment modes
pub async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        gift_items: GiftItem::PRESETS
            .into_iter()
            .filter_map(|g| {
                g.amount().map(|amount| GiftOption {
                    value: g.code(),
                    label: g.label(),
                    amount,
                })
            })
            .collect(),
        currencies: Currency::ALL
            .into_iter()
            .map(|c| CurrencyOption {
                code: c.code(),
                symbol: c.symbol(),
            })
            .collect(),
        payment_modes: state.checkout.payment_modes(),
    })
}

/// Start a fresh wizard
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let session = DonationSession::new();
    state.sessions.save(&session).map_err(|e| wizard_error(&e))?;

    tracing::debug!(session_id = %session.id, "Created donation session");
    Ok((StatusCode::CREATED, Json(SessionView::from(&session))))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .sessions
        .require(&SessionId::from_string(id))
        .map_err(|e| wizard_error(&e))?;
    Ok(Json(SessionView::from(&session)))
}

/// Submit the current step's form
pub async fn advance_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(values): Json<StepValues>,
) -> Result<Json<SessionView>, ApiError> {
    let id = SessionId::from_string(id);
    let step = values.step();
    let session = state
        .sessions
        .update(&id, Box::new(move |wizard| wizard.advance(values)))
        .map_err(|e| {
            tracing::debug!(session_id = %id, %step, error = %e, "Step rejected");
            wizard_error(&e)
        })?;

    Ok(Json(SessionView::from(&session)))
}

/// Breadcrumb navigation, no validation
pub async fn go_to_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<GoToRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .sessions
        .update(
            &SessionId::from_string(id),
            Box::new(move |wizard| Ok(wizard.go_to(body.step))),
        )
        .map_err(|e| wizard_error(&e))?;

    Ok(Json(SessionView::from(&session)))
}

pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .sessions
        .update(&SessionId::from_string(id), Box::new(|wizard| Ok(wizard.reset())))
        .map_err(|e| wizard_error(&e))?;

    Ok(Json(SessionView::from(&session)))
}

/// Submit the payment step
pub async fn submit_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SubmitBody>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let id = SessionId::from_string(id);
    let session = state
        .sessions
        .begin_submission(&id)
        .map_err(|e| wizard_error(&e))?;

    let request = SubmitRequest {
        payment: body.payment.clone(),
        card: body.card_handle.and_then(|h| CardHandle::new(h).ok()),
    };

    match state.checkout.submit(&id, &session.wizard, request).await {
        Ok(submission) => {
            state
                .sessions
                .finish_submission(&id, submission.wizard)
                .map_err(|e| wizard_error(&e))?;

            let response = match submission.outcome {
                SubmitOutcome::Redirect { url, .. } => SubmitResponse::Redirect { url },
                SubmitOutcome::Donated { payload, receipt } => SubmitResponse::Donated {
                    donation: payload.donation,
                    donor: payload.donor,
                    reference: receipt.reference,
                },
            };
            Ok(Json(response))
        }
        Err(e) => {
            // Keep the donor's progress (plus what they just typed) for a resubmit
            let kept = session.wizard.store(StepValues::Payment(body.payment));
            state
                .sessions
                .finish_submission(&id, kept)
                .map_err(|e| wizard_error(&e))?;

            if !e.is_recoverable() {
                tracing::error!(session_id = %id, error = %e, "Donation submission failed");
            }
            Err(payment_error(&e))
        }
    }
}

/// PayPal sends donors back here after the donation
pub async fn paypal_return(
    State(state): State<AppState>,
    Query(query): Query<PayPalReturn>,
) -> Redirect {
    let token = PendingToken::from_string(query.token);
    match state.checkout.confirm_paypal_return(&token).await {
        Ok(_) => Redirect::to("/?donated=true"),
        Err(e) => {
            tracing::warn!(token = %token, error = %e, "PayPal return not confirmed");
            Redirect::to("/?donated=false")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use donate_core::{MemorySessionStore, SessionStore};
    use donate_payments::{
        DonationCheckout, LogNotifier, MemoryPendingStore, MockCardGateway, PayPalConfig,
        PayPalGateway,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::build_router;

    fn app() -> Router {
        app_with_sessions().0
    }

    fn app_with_sessions() -> (Router, Arc<MemorySessionStore>) {
        let sessions = Arc::new(MemorySessionStore::new());
        let paypal = PayPalGateway::new(
            PayPalConfig::new("donations@example.org", "http://localhost:3000"),
            Arc::new(MemoryPendingStore::new()),
        );
        let checkout = DonationCheckout::new(
            Some(Arc::new(MockCardGateway::new())),
            Some(Arc::new(paypal)),
            Arc::new(LogNotifier),
        );
        let router = build_router(AppState {
            sessions: sessions.clone(),
            checkout: Arc::new(checkout),
            slack_configured: false,
        });
        (router, sessions)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn session_at_payment(app: &Router) -> String {
        let (status, view) = send(app, "POST", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = view["sessionId"].as_str().unwrap().to_string();

        let (status, view) = send(
            app,
            "POST",
            &format!("/api/sessions/{id}/steps"),
            Some(json!({"step": "amount", "giftItem": "GIFT_25", "currency": "USD"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["currentStep"], "donor");
        assert_eq!(view["amount"]["donation"], "$25.00");

        let (status, view) = send(
            app,
            "POST",
            &format!("/api/sessions/{id}/steps"),
            Some(json!({
                "step": "donor",
                "firstName": "Jane",
                "lastName": "Doe",
                "email": "jane@x.com"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["currentStep"], "payment");
        id
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cardEnabled"], true);
        assert_eq!(body["slackConfigured"], false);
    }

    #[tokio::test]
    async fn test_catalog() {
        let (status, body) = send(&app(), "GET", "/api/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["giftItems"].as_array().unwrap().len(), 5);
        assert_eq!(body["paymentModes"], json!(["PAYPAL", "STRIPE"]));
    }

    #[tokio::test]
    async fn test_invalid_step_returns_field_errors() {
        let app = app();
        let (_, view) = send(&app, "POST", "/api/sessions", None).await;
        let id = view["sessionId"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/steps"),
            Some(json!({"step": "amount", "giftItem": "CUSTOM", "customAmount": "-4"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["giftItem"], "Please select or enter an amount");

        let (_, view) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(view["currentStep"], "amount");
        assert_eq!(view["completed"], json!([]));
    }

    #[tokio::test]
    async fn test_card_donation_resets_session() {
        let app = app();
        let id = session_at_payment(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/submit"),
            Some(json!({
                "payment": {"postalCode": "10001", "paymentMode": "STRIPE"},
                "cardHandle": "pm_card_visa"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "donated");
        assert_eq!(body["donation"], "$25.00");
        assert_eq!(body["donor"], "Jane Doe");

        let (_, view) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(view["currentStep"], "amount");
        assert_eq!(view["completed"], json!([]));
        assert_eq!(view["pending"], false);
    }

    #[tokio::test]
    async fn test_declined_card_keeps_progress() {
        let app = app();
        let id = session_at_payment(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/submit"),
            Some(json!({
                "payment": {"postalCode": "10001", "paymentMode": "STRIPE"},
                "cardHandle": "pm_card_decline"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["fields"]["stripeError"], "Your card was declined.");

        let (_, view) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(view["currentStep"], "payment");
        assert_eq!(view["completed"], json!(["amount", "donor", "payment"]));
        assert_eq!(view["pending"], false);
    }

    #[tokio::test]
    async fn test_paypal_redirect_and_return() {
        let app = app();
        let id = session_at_payment(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/submit"),
            Some(json!({"payment": {"paymentMode": "PAYPAL"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "redirect");

        let url = body["url"].as_str().unwrap();
        let token = url
            .split('&')
            .find_map(|kv| kv.strip_prefix("custom="))
            .unwrap()
            .to_string();

        let request = Request::builder()
            .uri(format!("/paypal/return?token={token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/?donated=true");

        let request = Request::builder()
            .uri(format!("/paypal/return?token={token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/?donated=false");
    }

    #[tokio::test]
    async fn test_go_to_and_unknown_session() {
        let app = app();
        let id = session_at_payment(&app).await;

        let (status, view) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/goto"),
            Some(json!({"step": "amount"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["currentStep"], "amount");

        let (status, body) = send(&app, "GET", "/api/sessions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_wizard_frozen_while_submission_pending() {
        let (app, sessions) = app_with_sessions();
        let id = session_at_payment(&app).await;
        sessions
            .begin_submission(&SessionId::from_string(id.clone()))
            .unwrap();

        let attempts = [
            (
                format!("/api/sessions/{id}/steps"),
                Some(json!({"step": "payment", "paymentMode": "PAYPAL"})),
            ),
            (format!("/api/sessions/{id}/goto"), Some(json!({"step": "amount"}))),
            (format!("/api/sessions/{id}/reset"), None),
            (
                format!("/api/sessions/{id}/submit"),
                Some(json!({"payment": {"paymentMode": "PAYPAL"}})),
            ),
        ];
        for (uri, body) in attempts {
            let (status, body) = send(&app, "POST", &uri, body).await;
            assert_eq!(status, StatusCode::CONFLICT, "{uri}");
            assert_eq!(body["code"], "SUBMISSION_PENDING", "{uri}");
        }

        let (_, view) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(view["pending"], true);
        assert_eq!(view["currentStep"], "payment");
        assert_eq!(view["completed"], json!(["amount", "donor"]));
    }

    #[tokio::test]
    async fn test_unchargeable_custom_amounts_rejected() {
        let app = app();
        let (_, view) = send(&app, "POST", "/api/sessions", None).await;
        let id = view["sessionId"].as_str().unwrap();

        for raw in ["0.001", "1000000000000000000000000000"] {
            let (status, body) = send(
                &app,
                "POST",
                &format!("/api/sessions/{id}/steps"),
                Some(json!({"step": "amount", "giftItem": "CUSTOM", "customAmount": raw})),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{raw}");
            assert_eq!(body["fields"]["giftItem"], "Please select or enter an amount");
        }

        let (_, view) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(view["currentStep"], "amount");
        assert_eq!(view["pending"], false);
    }
}
