// chrome.scripting adapter

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::{js_error_message, to_js};
use crate::config::ExecutionWorld;
use crate::host::{ContextId, HostError, ScriptingHost};
use crate::injector::classify_script_error;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "scripting"], js_name = executeScript, catch)]
    fn execute_script(injection: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InjectionTarget {
    tab_id: i32,
}

#[derive(Serialize)]
struct ScriptInjection<'a> {
    target: InjectionTarget,
    world: &'static str,
    args: &'a [Value],
}

/// Injects `page_api` (the page API builder handed over by the JS glue)
pub struct ChromeScripting {
    page_api: js_sys::Function,
}

impl ChromeScripting {
    pub fn new(page_api: js_sys::Function) -> Self {
        Self { page_api }
    }

    fn injection(
        &self,
        target: ContextId,
        world: ExecutionWorld,
        args: &[Value],
    ) -> Result<JsValue, JsValue> {
        let injection = to_js(&ScriptInjection {
            target: InjectionTarget { tab_id: target.0 },
            world: world.as_str(),
            args,
        })?;
        js_sys::Reflect::set(&injection, &"func".into(), &self.page_api)?;
        Ok(injection)
    }
}

#[async_trait(?Send)]
impl ScriptingHost for ChromeScripting {
    async fn execute_script(
        &self,
        target: ContextId,
        world: ExecutionWorld,
        args: &[Value],
    ) -> Result<(), HostError> {
        let injection = self
            .injection(target, world, args)
            .map_err(|e| HostError::Rejected(js_error_message(&e)))?;

        let promise =
            execute_script(&injection).map_err(|e| classify_script_error(&js_error_message(&e)))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| classify_script_error(&js_error_message(&e)))?;

        Ok(())
    }
}
