// Hosted dashboard module
// The JS glue hands over the wasm-bindgen `init` function of the dashboard
// package; calling it with the binary path yields the module exports

use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::js_error_message;
use crate::config::ExtensionConfig;
use crate::host::{HostError, HostedModule, ModuleFactory};

/// Await `value` if it is a promise, otherwise pass it through
async fn settle(value: JsValue) -> Result<JsValue, JsValue> {
    match value.dyn_into::<js_sys::Promise>() {
        Ok(promise) => JsFuture::from(promise).await,
        Err(value) => Ok(value),
    }
}

pub struct JsModuleFactory {
    init: js_sys::Function,
    background_entry: String,
    ui_entry: String,
}

impl JsModuleFactory {
    pub fn new(init: js_sys::Function, config: &ExtensionConfig) -> Self {
        Self {
            init,
            background_entry: config.background_entry.clone(),
            ui_entry: config.ui_entry.clone(),
        }
    }
}

#[async_trait(?Send)]
impl ModuleFactory for JsModuleFactory {
    type Module = JsHostedModule;

    async fn instantiate(&self, module_path: &str) -> Result<JsHostedModule, HostError> {
        let pending = self
            .init
            .call1(&JsValue::NULL, &JsValue::from_str(module_path))
            .map_err(|e| HostError::Rejected(js_error_message(&e)))?;
        let exports = settle(pending)
            .await
            .map_err(|e| HostError::Rejected(js_error_message(&e)))?;

        Ok(JsHostedModule {
            exports,
            background_entry: self.background_entry.clone(),
            ui_entry: self.ui_entry.clone(),
        })
    }
}

pub struct JsHostedModule {
    exports: JsValue,
    background_entry: String,
    ui_entry: String,
}

impl JsHostedModule {
    async fn call_entry(&self, name: &str) -> Result<(), HostError> {
        let entry = js_sys::Reflect::get(&self.exports, &JsValue::from_str(name))
            .map_err(|e| HostError::Rejected(js_error_message(&e)))?
            .dyn_into::<js_sys::Function>()
            .map_err(|_| HostError::Unavailable(format!("hosted module has no export {}", name)))?;

        let result = entry
            .call0(&self.exports)
            .map_err(|e| HostError::Rejected(js_error_message(&e)))?;
        settle(result)
            .await
            .map_err(|e| HostError::Rejected(js_error_message(&e)))?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl HostedModule for JsHostedModule {
    async fn background_entry(&self) -> Result<(), HostError> {
        self.call_entry(&self.background_entry).await
    }

    async fn ui_entry(&self) -> Result<(), HostError> {
        self.call_entry(&self.ui_entry).await
    }
}
