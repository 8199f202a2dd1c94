//! Bridge to Stripe Elements
//!
//! The host page loads Stripe.js and exposes `window.donateStripe` with
//! `mountCard(selector)` and `createPaymentMethod(postalCode) -> Promise<id>`.
//! Card details never reach this crate; only the PaymentMethod id does.

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

const BRIDGE: &str = "donateStripe";

fn js_error(e: &JsValue) -> String {
    e.as_string()
        .or_else(|| {
            Reflect::get(e, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| "Card error".into())
}

fn bridge_fn(name: &str) -> Result<(JsValue, Function), String> {
    let window = web_sys::window().ok_or("No window")?;
    let bridge = Reflect::get(&window, &JsValue::from_str(BRIDGE)).map_err(|e| js_error(&e))?;
    if bridge.is_undefined() {
        return Err("Card payments are not available on this page.".into());
    }
    let func = Reflect::get(&bridge, &JsValue::from_str(name))
        .map_err(|e| js_error(&e))?
        .dyn_into::<Function>()
        .map_err(|_| format!("{BRIDGE}.{name} is not a function"))?;
    Ok((bridge, func))
}

/// Mount the card element into `selector`
pub fn mount_card(selector: &str) -> Result<(), String> {
    let (bridge, func) = bridge_fn("mountCard")?;
    func.call1(&bridge, &JsValue::from_str(selector))
        .map(|_| ())
        .map_err(|e| js_error(&e))
}

/// Tokenize the mounted card; resolves to a PaymentMethod id
pub async fn create_payment_method(postal_code: &str) -> Result<String, String> {
    let (bridge, func) = bridge_fn("createPaymentMethod")?;
    let promise = func
        .call1(&bridge, &JsValue::from_str(postal_code))
        .map_err(|e| js_error(&e))?
        .dyn_into::<Promise>()
        .map_err(|_| "Card element did not return a promise".to_string())?;

    let id = JsFuture::from(promise).await.map_err(|e| js_error(&e))?;
    id.as_string()
        .ok_or_else(|| "Card details could not be processed".into())
}
