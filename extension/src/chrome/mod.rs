// Chrome extension API bindings
// wasm32 implementations of the host traits

mod module;
mod scripting;
mod windows;

pub use module::JsModuleFactory;
pub use scripting::ChromeScripting;
pub use windows::ChromeWindows;

use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::prelude::*;

/// Best-effort text of a thrown JS value (`Error.message` when present)
pub(crate) fn js_error_message(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        return message;
    }
    if let Ok(message) = js_sys::Reflect::get(err, &"message".into()) {
        if let Some(message) = message.as_string() {
            return message;
        }
    }
    format!("{:?}", err)
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))?;
    js_sys::JSON::parse(&json)
}

pub(crate) fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, JsValue> {
    let json = json_of(value)?;
    serde_json::from_str(&json).map_err(|e| JsValue::from_str(&format!("Parse error: {}", e)))
}

/// JSON text of a JS value; `undefined` is read as `null`
pub(crate) fn json_of(value: &JsValue) -> Result<String, JsValue> {
    if value.is_undefined() {
        return Ok("null".to_string());
    }
    js_sys::JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("Value is not JSON serializable"))
}
