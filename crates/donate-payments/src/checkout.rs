//! Donation Submission
//!
//! Runs the final wizard step: builds the payload, dispatches it to the
//! chosen payment adapter and, on success, hands back a reset wizard.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use donate_core::{DonationPayload, PaymentMode, PaymentSelection, SessionId, WizardState};

use crate::card::{CardGateway, CardHandle, ChargeReceipt};
use crate::error::{PaymentError, Result};
use crate::notifier::Notifier;
use crate::paypal::{PayPalGateway, PendingDonation, PendingToken};

/// What the page should do after a successful submission
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SubmitOutcome {
    /// Navigate to PayPal
    Redirect { url: String, token: PendingToken },
    /// Card charged; show the thanks view
    Donated {
        payload: DonationPayload,
        receipt: ChargeReceipt,
    },
}

/// Successful submission: the outcome plus the reset wizard
#[derive(Clone, Debug)]
pub struct Submission {
    pub outcome: SubmitOutcome,
    pub wizard: WizardState,
}

/// Final-step request
#[derive(Clone, Debug, Default)]
pub struct SubmitRequest {
    pub payment: PaymentSelection,
    /// Required for card payments
    pub card: Option<CardHandle>,
}

/// Submission handler
pub struct DonationCheckout {
    card: Option<Arc<dyn CardGateway>>,
    paypal: Option<Arc<PayPalGateway>>,
    notifier: Arc<dyn Notifier>,
}

impl DonationCheckout {
    pub fn new(
        card: Option<Arc<dyn CardGateway>>,
        paypal: Option<Arc<PayPalGateway>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            card,
            paypal,
            notifier,
        }
    }

    pub fn card_enabled(&self) -> bool {
        self.card.is_some()
    }

    pub fn paypal_enabled(&self) -> bool {
        self.paypal.is_some()
    }

    /// Payment modes this server can take
    pub fn payment_modes(&self) -> Vec<PaymentMode> {
        PaymentMode::ALL
            .into_iter()
            .filter(|mode| match mode {
                PaymentMode::PayPal => self.paypal_enabled(),
                PaymentMode::Stripe => self.card_enabled(),
            })
            .collect()
    }

    /// Submit the final step.
    ///
    /// On error the caller keeps its current wizard state; only a successful
    /// payment resets it. A declined card is reported as
    /// [`PaymentError::Declined`] and never retried here.
    pub async fn submit(
        &self,
        session_id: &SessionId,
        wizard: &WizardState,
        request: SubmitRequest,
    ) -> Result<Submission> {
        let payload = DonationPayload::build(wizard, &request.payment)?;
        let mode = request.payment.payment_mode;

        tracing::info!(
            session_id = %session_id,
            %mode,
            donation = %payload.donation,
            "Submitting donation"
        );

        let outcome = match mode {
            PaymentMode::PayPal => self.submit_paypal(session_id, &payload).await?,
            PaymentMode::Stripe => self.submit_card(request.card.as_ref(), payload).await?,
        };

        Ok(Submission {
            outcome,
            wizard: wizard.reset(),
        })
    }

    async fn submit_paypal(
        &self,
        session_id: &SessionId,
        payload: &DonationPayload,
    ) -> Result<SubmitOutcome> {
        let paypal = self
            .paypal
            .as_ref()
            .ok_or_else(|| PaymentError::Config("PayPal is not configured".into()))?;

        let token = paypal.persist(session_id, payload)?;
        let url = paypal.redirect_url(&token, payload).inspect_err(|_| {
            // drop the parked payload
            let _ = paypal.take(&token);
        })?;
        self.notifier.notify_attempt(PaymentMode::PayPal, payload).await;

        tracing::info!(session_id = %session_id, token = %token, "Redirecting to PayPal");
        Ok(SubmitOutcome::Redirect {
            url: url.to_string(),
            token,
        })
    }

    async fn submit_card(
        &self,
        card: Option<&CardHandle>,
        payload: DonationPayload,
    ) -> Result<SubmitOutcome> {
        let gateway = self.card.as_ref().ok_or(PaymentError::CardUnavailable)?;
        let card = card.ok_or(PaymentError::MissingCard)?;

        match gateway.charge(card, &payload).await {
            Ok(receipt) => {
                self.notifier.notify_success(PaymentMode::Stripe, &payload).await;
                Ok(SubmitOutcome::Donated { payload, receipt })
            }
            Err(e) => {
                if let PaymentError::Declined(message) = &e {
                    tracing::info!(gateway = gateway.name(), reason = %message, "Card declined");
                    self.notifier
                        .notify_failure(PaymentMode::Stripe, &payload, message)
                        .await;
                }
                Err(e)
            }
        }
    }

    /// Drop PayPal payloads whose donors never came back
    pub fn purge_expired_pending(&self) -> Result<usize> {
        match &self.paypal {
            Some(paypal) => paypal.purge_expired(),
            None => Ok(0),
        }
    }

    /// Complete a PayPal donation when the donor comes back from PayPal
    pub async fn confirm_paypal_return(&self, token: &PendingToken) -> Result<PendingDonation> {
        let paypal = self
            .paypal
            .as_ref()
            .ok_or_else(|| PaymentError::Config("PayPal is not configured".into()))?;

        let pending = paypal.take(token)?;
        self.notifier
            .notify_success(PaymentMode::PayPal, &pending.payload)
            .await;

        tracing::info!(
            session_id = %pending.session_id,
            donation = %pending.payload.donation,
            "PayPal donation returned"
        );
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use donate_core::{AmountSelection, Currency, DonorInfo, GiftItem, StepValues};

    use crate::card::MockCardGateway;
    use crate::paypal::{MemoryPendingStore, PayPalConfig};

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify_attempt(&self, mode: PaymentMode, payload: &DonationPayload) {
            self.events
                .lock()
                .unwrap()
                .push(format!("attempt {mode} {}", payload.donation));
        }

        async fn notify_failure(&self, mode: PaymentMode, payload: &DonationPayload, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("failure {mode} {} {error}", payload.donation));
        }

        async fn notify_success(&self, mode: PaymentMode, payload: &DonationPayload) {
            self.events
                .lock()
                .unwrap()
                .push(format!("success {mode} {}", payload.donation));
        }
    }

    fn setup() -> (DonationCheckout, Arc<MockCardGateway>, Arc<RecordingNotifier>) {
        let card = Arc::new(MockCardGateway::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let paypal = PayPalGateway::new(
            PayPalConfig::new("donations@example.org", "http://localhost:3000"),
            Arc::new(MemoryPendingStore::new()),
        );
        let checkout = DonationCheckout::new(
            Some(card.clone()),
            Some(Arc::new(paypal)),
            notifier.clone(),
        );
        (checkout, card, notifier)
    }

    fn ready_wizard() -> WizardState {
        WizardState::new()
            .advance(StepValues::Amount(AmountSelection {
                gift_item: Some(GiftItem::Gift25),
                currency: Some(Currency::Usd),
                ..AmountSelection::default()
            }))
            .and_then(|s| {
                s.advance(StepValues::Donor(DonorInfo {
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                    email: "jane@x.com".into(),
                    wants_to_be_anonymous: false,
                }))
            })
            .unwrap()
    }

    fn card_request(handle: &str) -> SubmitRequest {
        SubmitRequest {
            payment: PaymentSelection {
                postal_code: "10001".into(),
                payment_mode: PaymentMode::Stripe,
            },
            card: Some(CardHandle::new(handle).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_card_donation_end_to_end() {
        let (checkout, card, notifier) = setup();
        let wizard = ready_wizard();

        let submission = checkout
            .submit(&SessionId::new(), &wizard, card_request("pm_card_visa"))
            .await
            .unwrap();

        let SubmitOutcome::Donated { payload, receipt } = submission.outcome else {
            panic!("expected a card donation");
        };
        assert_eq!(payload.donation, "$25.00");
        assert_eq!(payload.donor, "Jane Doe");
        assert_eq!(receipt.amount_minor, 2500);
        assert_eq!(card.charge_count(), 1);
        assert_eq!(submission.wizard, WizardState::new());
        assert_eq!(notifier.events(), vec!["success Card $25.00"]);
    }

    #[tokio::test]
    async fn test_declined_card_does_not_reset() {
        let (checkout, card, notifier) = setup();
        let wizard = ready_wizard();

        let err = checkout
            .submit(&SessionId::new(), &wizard, card_request("pm_card_decline_funds"))
            .await
            .unwrap_err();

        assert!(err.is_recoverable());
        assert!(err.field_errors().unwrap().get("stripeError").is_some());
        assert_eq!(card.charge_count(), 0);
        assert_eq!(wizard.current_step(), donate_core::Step::Payment);
        assert_eq!(
            notifier.events(),
            vec!["failure Card $25.00 Your card was declined."]
        );
    }

    #[tokio::test]
    async fn test_card_requires_handle() {
        let (checkout, _, _) = setup();
        let mut request = card_request("pm_card_visa");
        request.card = None;

        let err = checkout
            .submit(&SessionId::new(), &ready_wizard(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::MissingCard));
    }

    #[tokio::test]
    async fn test_paypal_redirect_and_return() {
        let (checkout, card, notifier) = setup();
        let session = SessionId::new();
        let request = SubmitRequest {
            payment: PaymentSelection::default(),
            card: None,
        };

        let submission = checkout
            .submit(&session, &ready_wizard(), request)
            .await
            .unwrap();
        let SubmitOutcome::Redirect { url, token } = submission.outcome else {
            panic!("expected a PayPal redirect");
        };
        assert!(url.starts_with("https://www.paypal.com/cgi-bin/webscr?cmd=_donations"));
        assert_eq!(submission.wizard, WizardState::new());
        assert_eq!(card.charge_count(), 0);

        let pending = checkout.confirm_paypal_return(&token).await.unwrap();
        assert_eq!(pending.session_id, session);
        assert_eq!(
            notifier.events(),
            vec!["attempt PayPal $25.00", "success PayPal $25.00"]
        );
        assert!(checkout.confirm_paypal_return(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_bad_paypal_url_is_not_announced() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut config = PayPalConfig::new("donations@example.org", "http://localhost:3000");
        config.checkout_url = "not a url".into();
        let paypal = PayPalGateway::new(config, Arc::new(MemoryPendingStore::new()));
        let checkout = DonationCheckout::new(None, Some(Arc::new(paypal)), notifier.clone());

        let err = checkout
            .submit(&SessionId::new(), &ready_wizard(), SubmitRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::PayPal(_)));
        assert!(!err.is_recoverable());
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_wizard_rejected() {
        let (checkout, _, notifier) = setup();
        let err = checkout
            .submit(&SessionId::new(), &WizardState::new(), card_request("pm_card_visa"))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Wizard(_)));
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_card_unavailable_without_gateway() {
        let checkout = DonationCheckout::new(None, None, Arc::new(RecordingNotifier::default()));
        assert!(checkout.payment_modes().is_empty());

        let err = checkout
            .submit(&SessionId::new(), &ready_wizard(), card_request("pm_card_visa"))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::CardUnavailable));
    }
}
