//! Main App Component

use leptos::prelude::*;
use leptos::task::spawn_local;

use donate_core::theme;
use donate_core::{
    AmountSelection, DonorInfo, FieldErrors, PaymentMode, PaymentSelection, Step, StepValues,
};

use crate::api::{self, ApiFailure, SessionView, SubmitResponse};
use crate::components::Header;
use crate::pages::{AmountPage, DonorPage, PaymentPage, ThanksNote};
use crate::stripe;

const PAYPAL_THANKS: &str = "Your PayPal donation went through. We really appreciate it.";
const CARD_ERROR_FIELD: &str = "stripeError";

/// Read and strip `?donated=...` left by the PayPal return redirect
fn take_donated_flag() -> Option<bool> {
    let window = web_sys::window()?;
    let search = window.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    let flag = params.get("donated")?;
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some("/"));
    }
    Some(flag == "true")
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let session = RwSignal::new(None::<SessionView>);
    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(None::<String>);
    let pending = RwSignal::new(false);
    let thanks = RwSignal::new(None::<String>);

    match take_donated_flag() {
        Some(true) => thanks.set(Some(PAYPAL_THANKS.into())),
        Some(false) => banner.set(Some("The PayPal donation was not completed.".into())),
        None => {}
    }

    let fail = move |failure: ApiFailure| {
        errors.set(failure.fields.unwrap_or_default());
        banner.set(Some(failure.error));
    };

    let start = move || {
        spawn_local(async move {
            match api::create_session().await {
                Ok(view) => session.set(Some(view)),
                Err(failure) => fail(failure),
            }
        });
    };
    start();

    let session_id = move || session.with_untracked(|s| s.as_ref().map(|s| s.session_id.clone()));

    // Validate locally, then let the server advance
    let submit_step = move |values: StepValues| {
        if pending.get_untracked() {
            return;
        }
        if let Err(field_errors) = values.validate() {
            errors.set(field_errors);
            return;
        }
        let Some(id) = session_id() else { return };
        pending.set(true);
        spawn_local(async move {
            match api::submit_step(&id, &values).await {
                Ok(view) => {
                    errors.set(FieldErrors::new());
                    banner.set(None);
                    session.set(Some(view));
                }
                Err(failure) => fail(failure),
            }
            pending.set(false);
        });
    };

    let go_to = Callback::new(move |step: Step| {
        let Some(id) = session_id() else { return };
        spawn_local(async move {
            match api::go_to(&id, step).await {
                Ok(view) => {
                    errors.set(FieldErrors::new());
                    session.set(Some(view));
                }
                Err(failure) => fail(failure),
            }
        });
    });

    let back = Callback::new(move |()| {
        let previous =
            session.with_untracked(|s| s.as_ref().and_then(|s| s.current_step.previous()));
        if let Some(step) = previous {
            go_to.run(step);
        }
    });

    let pay = Callback::new(move |payment: PaymentSelection| {
        if pending.get_untracked() {
            return;
        }
        let Some(id) = session_id() else { return };
        pending.set(true);
        errors.set(FieldErrors::new());
        spawn_local(async move {
            let card_handle = if payment.payment_mode == PaymentMode::Stripe {
                match stripe::create_payment_method(&payment.postal_code).await {
                    Ok(handle) => Some(handle),
                    Err(message) => {
                        errors.set(FieldErrors::single(CARD_ERROR_FIELD, message));
                        pending.set(false);
                        return;
                    }
                }
            } else {
                None
            };

            match api::submit_donation(&id, &payment, card_handle.as_deref()).await {
                Ok(SubmitResponse::Redirect { url }) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href(&url);
                    }
                    // keep the button disabled while the browser leaves
                    return;
                }
                Ok(SubmitResponse::Donated { donation, donor }) => {
                    thanks.set(Some(format!("{donor}, thank you for your gift of {donation}.")));
                    banner.set(None);
                    if let Ok(view) = api::get_session(&id).await {
                        session.set(Some(view));
                    }
                }
                Err(failure) => fail(failure),
            }
            pending.set(false);
        });
    });

    let current = Signal::derive(move || {
        session.with(|s| s.as_ref().map_or(Step::Amount, |s| s.current_step))
    });
    let completed = Signal::derive(move || {
        session.with(|s| s.as_ref().map(|s| s.completed.clone()).unwrap_or_default())
    });

    let step_view = move || {
        let Some(current_session) = session.get() else {
            return view! { <p class="loading">"Loading..."</p> }.into_any();
        };
        match current_session.current_step {
            Step::Amount => view! {
                <AmountPage
                    initial=current_session.amount_form()
                    errors=errors
                    pending=pending
                    on_submit=Callback::new(move |values: AmountSelection| submit_step(StepValues::Amount(values)))
                />
            }
            .into_any(),
            Step::Donor => view! {
                <DonorPage
                    initial=current_session.donor_form()
                    errors=errors
                    pending=pending
                    on_submit=Callback::new(move |values: DonorInfo| submit_step(StepValues::Donor(values)))
                    on_back=back
                />
            }
            .into_any(),
            Step::Payment => view! {
                <PaymentPage
                    initial=current_session.payment_form()
                    donation=current_session.amount.as_ref().map(|a| a.donation.clone())
                    errors=errors
                    pending=pending
                    on_submit=pay
                    on_back=back
                />
            }
            .into_any(),
        }
    };

    view! {
        <style>{theme::stylesheet()}</style>
        <main class="app donate">
            <Header current=current completed=completed on_step_change=go_to />
            {move || banner.get().map(|message| view! { <p class="banner">{message}</p> })}
            {step_view}
            {move || {
                thanks
                    .get()
                    .map(|message| {
                        view! {
                            <ThanksNote
                                message=message
                                on_close=Callback::new(move |()| thanks.set(None))
                            />
                        }
                    })
            }}
        </main>
    }
}
