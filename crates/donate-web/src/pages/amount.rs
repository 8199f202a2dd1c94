//! Amount Step

use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use donate_core::theme::ButtonVariant;
use donate_core::{AmountSelection, Currency, FieldErrors, GiftItem};

use crate::components::{Button, FieldError, TextInput, Textarea};

#[component]
pub fn AmountPage(
    initial: AmountSelection,
    #[prop(into)] errors: Signal<FieldErrors>,
    #[prop(into)] pending: Signal<bool>,
    on_submit: Callback<AmountSelection>,
) -> impl IntoView {
    let form = RwSignal::new(initial);
    let currency = move || form.with(|f| f.currency.unwrap_or_default());
    let is_custom = move || form.with(|f| f.gift_item == Some(GiftItem::Custom));

    view! {
        <form
            class="step-form"
            on:submit=move |ev: SubmitEvent| {
                ev.prevent_default();
                on_submit.run(form.get());
            }
        >
            <h2>"Choose your gift"</h2>

            <div class="currencies">
                {Currency::ALL
                    .into_iter()
                    .map(move |c| {
                        view! {
                            <Button
                                variant=ButtonVariant::Secondary
                                is_active=Signal::derive(move || form.with(|f| f.currency == Some(c)))
                                on_click=Callback::new(move |()| form.update(|f| f.currency = Some(c)))
                            >
                                {c.code()}
                            </Button>
                        }
                    })
                    .collect_view()}
            </div>
            <FieldError errors=errors field="currency" />

            <div class="gift-items">
                {GiftItem::PRESETS
                    .into_iter()
                    .map(move |item| {
                        let price = move || {
                            item.amount().map(|a| currency().format(a)).unwrap_or_default()
                        };
                        view! {
                            <Button
                                variant=ButtonVariant::Empty
                                is_active=Signal::derive(move || form.with(|f| f.gift_item == Some(item)))
                                on_click=Callback::new(move |()| form.update(|f| f.gift_item = Some(item)))
                            >
                                <strong>{price}</strong>
                                <span>{item.label()}</span>
                            </Button>
                        }
                    })
                    .collect_view()}
                <Button
                    variant=ButtonVariant::Empty
                    is_active=Signal::derive(is_custom)
                    on_click=Callback::new(move |()| form.update(|f| f.gift_item = Some(GiftItem::Custom)))
                >
                    "Other amount"
                </Button>
            </div>
            <FieldError errors=errors field="giftItem" />

            <Show when=is_custom>
                <TextInput
                    label="Amount"
                    field="customAmount"
                    input_type="number"
                    value=Signal::derive(move || form.with(|f| f.custom_amount.clone().unwrap_or_default()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.custom_amount = Some(v)))
                    errors=errors
                />
            </Show>

            <label class="checkbox">
                <input
                    type="checkbox"
                    prop:checked=move || form.with(|f| f.wants_to_comment)
                    on:change=move |ev| form.update(|f| f.wants_to_comment = event_target_checked(&ev))
                />
                "Leave us a comment"
            </label>
            <Show when=move || form.with(|f| f.wants_to_comment)>
                <Textarea
                    field="comment"
                    placeholder="Your message"
                    value=Signal::derive(move || form.with(|f| f.comment.clone()))
                    on_input=Callback::new(move |v: String| form.update(|f| f.comment = v))
                    errors=errors
                />
            </Show>

            <div class="actions">
                <Button variant=ButtonVariant::Primary disabled=pending>"Next"</Button>
            </div>
        </form>
    }
}
