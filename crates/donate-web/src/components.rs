//! UI Components

use leptos::prelude::*;

use donate_core::theme::ButtonVariant;
use donate_core::{FieldErrors, Step};

/// Themed button; `type="submit"` unless `on_click` is given
#[component]
pub fn Button(
    #[prop(optional)] variant: ButtonVariant,
    #[prop(into, default = Signal::stored(false))] is_active: Signal<bool>,
    #[prop(into, default = Signal::stored(false))] disabled: Signal<bool>,
    #[prop(optional)] on_click: Option<Callback<()>>,
    children: Children,
) -> impl IntoView {
    let kind = if on_click.is_some() { "button" } else { "submit" };
    view! {
        <button
            type=kind
            class=move || variant.class(is_active.get())
            disabled=move || disabled.get()
            on:click=move |_| {
                if let Some(cb) = on_click {
                    cb.run(());
                }
            }
        >
            {children()}
        </button>
    }
}

/// Inline error under a field
#[component]
pub fn FieldError(#[prop(into)] errors: Signal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors
            .get()
            .get(field)
            .map(|message| view! { <p class="field-error">{message.to_string()}</p> })
    }
}

/// Single-line input bound to a string
#[component]
pub fn TextInput(
    label: &'static str,
    field: &'static str,
    #[prop(optional)] input_type: Option<&'static str>,
    #[prop(into)] value: Signal<String>,
    on_input: Callback<String>,
    #[prop(into)] errors: Signal<FieldErrors>,
) -> impl IntoView {
    let invalid = move || errors.get().get(field).is_some();
    view! {
        <div class="input" class:invalid=invalid>
            <label for=field>{label}</label>
            <input
                id=field
                name=field
                type=input_type.unwrap_or("text")
                prop:value=move || value.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
            />
            <FieldError errors=errors field=field />
        </div>
    }
}

/// Multi-line text bound to a string
#[component]
pub fn Textarea(
    field: &'static str,
    #[prop(optional)] placeholder: &'static str,
    #[prop(into)] value: Signal<String>,
    on_input: Callback<String>,
    #[prop(into)] errors: Signal<FieldErrors>,
) -> impl IntoView {
    let invalid = move || errors.get().get(field).is_some();
    view! {
        <div class="textarea" class:invalid=invalid>
            <textarea
                name=field
                rows="3"
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
            />
            <FieldError errors=errors field=field />
        </div>
    }
}

/// Breadcrumb of wizard steps; completed steps and the current one are links
#[component]
pub fn Header(
    #[prop(into)] current: Signal<Step>,
    #[prop(into)] completed: Signal<Vec<Step>>,
    on_step_change: Callback<Step>,
) -> impl IntoView {
    view! {
        <nav class="steps">
            {Step::ALL
                .into_iter()
                .map(move |step| {
                    let reachable = move || {
                        let completed = completed.get();
                        step <= current.get()
                            || completed.contains(&step)
                            || step.previous().is_some_and(|p| completed.contains(&p))
                    };
                    view! {
                        <button
                            type="button"
                            class="step"
                            class:current=move || current.get() == step
                            disabled=move || !reachable()
                            on:click=move |_| on_step_change.run(step)
                        >
                            {format!("{}. {}", step.index() + 1, step.title())}
                        </button>
                    }
                })
                .collect_view()}
        </nav>
    }
}
