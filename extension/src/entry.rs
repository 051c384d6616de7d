// wasm exports called by the extension's JavaScript glue
//
//   background.js: await start_background(dashboardInit, apiBuilder, config)
//   popup.js:      await start_popup(dashboardInit, config)

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use futures::StreamExt;
use serde_json::Value;
use std::cell::OnceCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::background::BackgroundProcess;
use crate::chrome::{self, ChromeScripting, ChromeWindows, JsModuleFactory};
use crate::components;
use crate::config::ExtensionConfig;
use crate::error::ExtensionError;
use crate::injector::InjectionRequest;
use crate::popup::LaunchOutcome;
use crate::popup_process::PopupProcess;
use crate::registry::{EntryPoint, EntryPointRegistry};

thread_local! {
    static BACKGROUND: OnceCell<Rc<BackgroundProcess<JsModuleFactory>>> = OnceCell::new();
    static POPUP: OnceCell<Rc<PopupProcess<JsModuleFactory>>> = OnceCell::new();
}

/// Spawns onto the browser's microtask queue
struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

fn to_js_error(err: &ExtensionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn load_config(config: &JsValue) -> Result<ExtensionConfig, JsValue> {
    let json = chrome::json_of(config)?;
    ExtensionConfig::from_json(&json).map_err(|e| to_js_error(&e))
}

fn init_logging(config: &ExtensionConfig) {
    let level = config.log_level().unwrap_or(log::Level::Info);
    wasm_logger::init(wasm_logger::Config::new(level));
}

#[wasm_bindgen(start)]
pub fn run() {
    console_error_panic_hook::set_once();
}

/// Start the background process. Resolves once the dashboard's background
/// entry is running; rejects if the dashboard cannot be loaded.
#[wasm_bindgen]
pub async fn start_background(
    dashboard_init: js_sys::Function,
    page_api: js_sys::Function,
    config: JsValue,
) -> Result<(), JsValue> {
    let config = load_config(&config)?;
    init_logging(&config);
    log::info!("Tondi Dashboard background starting...");

    let module_path = config.module_path.clone();
    let factory = JsModuleFactory::new(dashboard_init, &config);
    let (process, mut fatal) = BackgroundProcess::new(
        config,
        factory,
        Rc::new(ChromeScripting::new(page_api)),
        Rc::new(ChromeWindows),
    );
    let process = Rc::new(process);

    let installed = BACKGROUND.with(|cell| match cell.set(process.clone()) {
        Ok(()) => Ok(()),
        Err(_) => Err(cell.get().map(|existing| existing.loader_status())),
    });
    if let Err(status) = installed {
        let err = ExtensionError::AlreadyLoaded {
            path: module_path,
            status: status.unwrap_or(crate::loader::LoaderStatus::Loading),
        };
        log::error!("{}", err);
        return Err(to_js_error(&err));
    }

    wasm_bindgen_futures::spawn_local(async move {
        while let Some(err) = fatal.next().await {
            log::error!("Background process fatal error: {}", err);
        }
    });

    process.start(&BrowserSpawner).await.map_err(|e| to_js_error(&e))?;

    let registry = process
        .entry_points()
        .ok_or_else(|| to_js_error(&ExtensionError::NotReady("start_background")))?;
    publish_entry_points(registry)
}

/// Expose the registry on `globalThis` for the rest of the extension
fn publish_entry_points(registry: Rc<EntryPointRegistry>) -> Result<(), JsValue> {
    let global = js_sys::global();

    let injector = registry.clone();
    let init_page_script =
        Closure::<dyn Fn(JsValue, JsValue)>::new(move |tab_id: JsValue, args: JsValue| {
            let registry = injector.clone();
            wasm_bindgen_futures::spawn_local(async move {
                // failures are logged and stay local to this call
                if let Err(e) = inject_from_js(&registry, tab_id, args).await {
                    log::debug!("initPageScript: {}", e);
                }
            });
        });
    js_sys::Reflect::set(
        &global,
        &EntryPoint::InitPageScript.name().into(),
        &init_page_script.into_js_value(),
    )?;

    let launcher = registry;
    let open_popup = Closure::<dyn Fn() -> js_sys::Promise>::new(move || {
        let registry = launcher.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            match registry.open_popup().await {
                Ok(LaunchOutcome::ActionPopup) => Ok(JsValue::from_str("action")),
                Ok(LaunchOutcome::PanelWindow(_)) => Ok(JsValue::from_str("panel")),
                Err(e) => Err(to_js_error(&e)),
            }
        })
    });
    js_sys::Reflect::set(
        &global,
        &EntryPoint::OpenPopup.name().into(),
        &open_popup.into_js_value(),
    )?;

    log::info!("Entry points published on globalThis");
    Ok(())
}

async fn inject_from_js(
    registry: &EntryPointRegistry,
    tab_id: JsValue,
    args: JsValue,
) -> Result<(), ExtensionError> {
    let args: Option<Vec<Value>> = chrome::from_js(&args)
        .map_err(|e| ExtensionError::InvalidArguments(chrome::js_error_message(&e)));
    let request = args.and_then(|args| InjectionRequest::from_js_parts(tab_id.as_f64(), args));
    let request = match request {
        Ok(request) => request,
        Err(err) => {
            log::error!("{}", err);
            return Err(err);
        }
    };

    registry.init_page_script(request).await
}

/// Start the popup process. On failure the popup shows an error view and the
/// returned promise rejects.
#[wasm_bindgen]
pub async fn start_popup(dashboard_init: js_sys::Function, config: JsValue) -> Result<(), JsValue> {
    let config = match load_config(&config) {
        Ok(config) => config,
        Err(e) => {
            components::show_startup_error(chrome::js_error_message(&e));
            return Err(e);
        }
    };
    init_logging(&config);
    log::info!("Tondi Dashboard popup starting...");

    let factory = JsModuleFactory::new(dashboard_init, &config);
    // a repeated call reuses the existing process, whose loader rejects it
    let process = POPUP.with(|cell| {
        cell.get_or_init(|| Rc::new(PopupProcess::new(config, factory)))
            .clone()
    });

    if let Err(e) = process.run().await {
        if !matches!(e, ExtensionError::AlreadyLoaded { .. }) {
            components::show_startup_error(e.to_string());
        }
        return Err(to_js_error(&e));
    }
    Ok(())
}
