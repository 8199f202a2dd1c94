//! Payment Step

use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use donate_core::theme::ButtonVariant;
use donate_core::{FieldErrors, PaymentMode, PaymentSelection};

use crate::components::{Button, FieldError, TextInput};
use crate::stripe;

const CARD_ELEMENT: &str = "#card-element";

#[component]
pub fn PaymentPage(
    initial: PaymentSelection,
    /// Formatted amount, e.g. "$25.00"
    donation: Option<String>,
    #[prop(into)] errors: Signal<FieldErrors>,
    #[prop(into)] pending: Signal<bool>,
    on_submit: Callback<PaymentSelection>,
    on_back: Callback<()>,
) -> impl IntoView {
    let form = RwSignal::new(initial);
    let card_mode = move || form.with(|f| f.payment_mode == PaymentMode::Stripe);
    let card_error = RwSignal::new(None::<String>);

    // Stripe Elements needs the container in the DOM before mounting
    Effect::new(move |_| {
        if card_mode() {
            request_animation_frame(move || {
                card_error.set(stripe::mount_card(CARD_ELEMENT).err());
            });
        }
    });

    let submit_label = donation.map_or_else(|| "Donate".to_string(), |d| format!("Donate {d}"));

    view! {
        <form
            class="step-form"
            on:submit=move |ev: SubmitEvent| {
                ev.prevent_default();
                on_submit.run(form.get());
            }
        >
            <h2>"Payment"</h2>
            <div class="payment-modes">
                {PaymentMode::ALL
                    .into_iter()
                    .map(move |mode| {
                        view! {
                            <Button
                                variant=ButtonVariant::Secondary
                                is_active=Signal::derive(move || form.with(|f| f.payment_mode == mode))
                                on_click=Callback::new(move |()| form.update(|f| f.payment_mode = mode))
                            >
                                {mode.label()}
                            </Button>
                        }
                    })
                    .collect_view()}
            </div>

            <Show
                when=card_mode
                fallback=|| view! { <p class="hint">"You will be redirected to PayPal to complete your donation."</p> }
            >
                <TextInput
                    label="Postal code"
                    field="postalCode"
                    value=Signal::derive(move || form.with(|f| f.postal_code.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.postal_code = v))
                    errors=errors
                />
                <div id="card-element" class="input"></div>
                {move || card_error.get().map(|e| view! { <p class="field-error">{e}</p> })}
            </Show>
            <FieldError errors=errors field="stripeError" />

            <div class="actions">
                <Button variant=ButtonVariant::Secondary on_click=on_back>"Back"</Button>
                <Button variant=ButtonVariant::Success disabled=pending>
                    {move || if pending.get() { "Processing...".to_string() } else { submit_label.clone() }}
                </Button>
            </div>
        </form>
    }
}
