//! Orchestration layer of the Tondi Dashboard browser extension.
//!
//! The background process loads the dashboard module once, publishes the
//! `initPageScript` and `openPopup` entry points and leaves the dashboard's
//! background entry running. Each popup loads its own copy of the dashboard
//! and runs the UI entry.
//!
//! Chrome and the dashboard module are reached through the traits in [`host`];
//! the wasm32 build supplies the browser implementations.

pub mod background;
pub mod config;
pub mod error;
pub mod host;
pub mod injector;
pub mod loader;
pub mod popup;
pub mod popup_process;
pub mod registry;

#[cfg(target_arch = "wasm32")]
mod chrome;
#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
mod entry;

#[cfg(test)]
mod testing;

pub use background::{BackgroundProcess, BackgroundState, FatalErrors};
pub use config::{ExecutionWorld, ExtensionConfig};
pub use error::ExtensionError;
pub use host::{ContextId, HostError, HostedModule, ModuleFactory, ScriptingHost, WindowingHost};
pub use injector::{CapabilityInjector, InjectionRequest};
pub use loader::{LoaderStatus, ModuleHandle, ModuleLoader};
pub use popup::{LaunchOutcome, PopupLauncher, WindowGeometry};
pub use popup_process::{PopupProcess, PopupState};
pub use registry::{EntryPoint, EntryPointRegistry};
