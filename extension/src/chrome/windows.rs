// chrome.windows / chrome.action adapter

use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::{from_js, js_error_message, to_js};
use crate::host::{HostError, WindowBounds, WindowingHost};
use crate::popup::CreateWindow;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "windows"], js_name = getCurrent, catch)]
    fn get_current() -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "windows"], js_name = create, catch)]
    fn create(data: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

pub struct ChromeWindows;

impl ChromeWindows {
    /// `chrome.action` and its `openPopup`, when this browser has them
    fn action_popup() -> Option<(JsValue, js_sys::Function)> {
        let chrome = js_sys::Reflect::get(&js_sys::global(), &"chrome".into()).ok()?;
        if chrome.is_undefined() || chrome.is_null() {
            return None;
        }
        let action = js_sys::Reflect::get(&chrome, &"action".into()).ok()?;
        if action.is_undefined() || action.is_null() {
            return None;
        }
        let open_popup = js_sys::Reflect::get(&action, &"openPopup".into())
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()?;
        Some((action, open_popup))
    }
}

fn rejected(err: JsValue) -> HostError {
    HostError::Rejected(js_error_message(&err))
}

#[async_trait(?Send)]
impl WindowingHost for ChromeWindows {
    fn has_action_popup(&self) -> bool {
        Self::action_popup().is_some()
    }

    fn open_action_popup(&self) -> Result<(), HostError> {
        let (action, open_popup) = Self::action_popup()
            .ok_or_else(|| HostError::Unavailable("chrome.action.openPopup".into()))?;
        let result = open_popup.call0(&action).map_err(rejected)?;

        // Resolution is not waited for; a late rejection is only logged
        if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("chrome.action.openPopup rejected: {}", js_error_message(&e));
                }
            });
        }
        Ok(())
    }

    async fn current_window(&self) -> Result<WindowBounds, HostError> {
        let window = JsFuture::from(get_current().map_err(rejected)?)
            .await
            .map_err(rejected)?;
        from_js(&window).map_err(rejected)
    }

    async fn create_window(&self, request: &CreateWindow) -> Result<(), HostError> {
        let data = to_js(request).map_err(rejected)?;
        JsFuture::from(create(&data).map_err(rejected)?)
            .await
            .map_err(rejected)?;
        Ok(())
    }
}
