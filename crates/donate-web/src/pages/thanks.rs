//! Thank-you overlay

use leptos::prelude::*;

use donate_core::theme::ButtonVariant;

use crate::components::Button;

#[component]
pub fn ThanksNote(message: String, on_close: Callback<()>) -> impl IntoView {
    view! {
        <div class="overlay">
            <div class="thanks">
                <h2>"Thank you!"</h2>
                <p>{message}</p>
                <Button variant=ButtonVariant::Primary on_click=on_close>"Close"</Button>
            </div>
        </div>
    }
}
