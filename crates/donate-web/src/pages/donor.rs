//! Donor Step

use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use donate_core::theme::ButtonVariant;
use donate_core::{DonorInfo, FieldErrors};

use crate::components::{Button, TextInput};

#[component]
pub fn DonorPage(
    initial: DonorInfo,
    #[prop(into)] errors: Signal<FieldErrors>,
    #[prop(into)] pending: Signal<bool>,
    on_submit: Callback<DonorInfo>,
    on_back: Callback<()>,
) -> impl IntoView {
    let form = RwSignal::new(initial);

    view! {
        <form
            class="step-form"
            on:submit=move |ev: SubmitEvent| {
                ev.prevent_default();
                on_submit.run(form.get());
            }
        >
            <h2>"About you"</h2>
            <TextInput
                label="First name"
                field="firstName"
                value=Signal::derive(move || form.with(|f| f.first_name.clone()))
                on_input=Callback::new(move |v: String| form.update(|f| f.first_name = v))
                errors=errors
            />
            <TextInput
                label="Last name"
                field="lastName"
                value=Signal::derive(move || form.with(|f| f.last_name.clone()))
                on_input=Callback::new(move |v: String| form.update(|f| f.last_name = v))
                errors=errors
            />
            <TextInput
                label="Email"
                field="email"
                input_type="email"
                value=Signal::derive(move || form.with(|f| f.email.clone()))
                on_input=Callback::new(move |v: String| form.update(|f| f.email = v))
                errors=errors
            />
            <label class="checkbox">
                <input
                    type="checkbox"
                    prop:checked=move || form.with(|f| f.wants_to_be_anonymous)
                    on:change=move |ev| form.update(|f| f.wants_to_be_anonymous = event_target_checked(&ev))
                />
                "Keep my donation anonymous"
            </label>

            <div class="actions">
                <Button variant=ButtonVariant::Secondary on_click=on_back>"Back"</Button>
                <Button variant=ButtonVariant::Primary disabled=pending>"Next"</Button>
            </div>
        </form>
    }
}
