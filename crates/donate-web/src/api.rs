//! API Client

use serde::{Deserialize, Serialize};

use donate_core::{AmountSelection, DonorInfo, FieldErrors, PaymentSelection, Step, StepValues};

/// Server view of the donor's wizard
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub current_step: Step,
    pub completed: Vec<Step>,
    pub forms: Vec<StepValues>,
    pub amount: Option<AmountView>,
    pub pending: bool,
}

impl SessionView {
    /// Pre-filled form for a step
    pub fn form(&self, step: Step) -> StepValues {
        self.forms
            .iter()
            .find(|f| f.step() == step)
            .cloned()
            .unwrap_or_else(|| StepValues::initial(step))
    }

    pub fn amount_form(&self) -> AmountSelection {
        match self.form(Step::Amount) {
            StepValues::Amount(values) => values,
            _ => AmountSelection::initial(),
        }
    }

    pub fn donor_form(&self) -> DonorInfo {
        match self.form(Step::Donor) {
            StepValues::Donor(values) => values,
            _ => DonorInfo::default(),
        }
    }

    pub fn payment_form(&self) -> PaymentSelection {
        match self.form(Step::Payment) {
            StepValues::Payment(values) => values,
            _ => PaymentSelection::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AmountView {
    pub donation: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SubmitResponse {
    Redirect { url: String },
    Donated { donation: String, donor: String },
}

/// A failed request: a banner message plus any per-field errors
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiFailure {
    pub error: String,
    #[serde(default)]
    pub fields: Option<FieldErrors>,
}

impl ApiFailure {
    fn network(e: &reqwest::Error) -> Self {
        Self {
            error: format!("Network error: {e}"),
            fields: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    payment: &'a PaymentSelection,
    card_handle: Option<&'a str>,
}

fn endpoint(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{origin}{path}")
}

async fn read<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T, ApiFailure> {
    if response.status().is_success() {
        response.json().await.map_err(|e| ApiFailure::network(&e))
    } else {
        Err(response.json().await.unwrap_or_else(|_| ApiFailure {
            error: "Request failed".into(),
            fields: None,
        }))
    }
}

async fn post<B: Serialize + ?Sized, T: for<'de> Deserialize<'de>>(
    path: &str,
    body: Option<&B>,
) -> Result<T, ApiFailure> {
    let client = reqwest::Client::new();
    let mut request = client.post(endpoint(path));
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send().await.map_err(|e| ApiFailure::network(&e))?;
    read(response).await
}

/// Start a new donation
pub async fn create_session() -> Result<SessionView, ApiFailure> {
    post::<(), _>("/api/sessions", None).await
}

/// Current state of a session
pub async fn get_session(session_id: &str) -> Result<SessionView, ApiFailure> {
    let response = reqwest::Client::new()
        .get(endpoint(&format!("/api/sessions/{session_id}")))
        .send()
        .await
        .map_err(|e| ApiFailure::network(&e))?;
    read(response).await
}

/// Submit the current step
pub async fn submit_step(session_id: &str, values: &StepValues) -> Result<SessionView, ApiFailure> {
    post(&format!("/api/sessions/{session_id}/steps"), Some(values)).await
}

/// Breadcrumb navigation
pub async fn go_to(session_id: &str, step: Step) -> Result<SessionView, ApiFailure> {
    let body = serde_json::json!({ "step": step });
    post(&format!("/api/sessions/{session_id}/goto"), Some(&body)).await
}

/// Pay
pub async fn submit_donation(
    session_id: &str,
    payment: &PaymentSelection,
    card_handle: Option<&str>,
) -> Result<SubmitResponse, ApiFailure> {
    let body = SubmitBody {
        payment,
        card_handle,
    };
    post(&format!("/api/sessions/{session_id}/submit"), Some(&body)).await
}
