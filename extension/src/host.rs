// Host platform seams
// Everything the orchestration layer needs from Chrome or from the hosted
// dashboard module goes through these traits. The wasm32 build implements
// them in `chrome`, tests implement them with recording fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::config::ExecutionWorld;
use crate::popup::CreateWindow;

/// Identifier of a page context (a Chrome tab id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub i32);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab {}", self.0)
    }
}

/// Position and width of an existing browser window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WindowBounds {
    pub left: i32,
    pub width: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The tab or frame the call addressed is gone
    #[error("{0}")]
    TargetGone(String),
    #[error("{0}")]
    Rejected(String),
    #[error("host API unavailable: {0}")]
    Unavailable(String),
}

#[async_trait(?Send)]
pub trait ScriptingHost {
    /// Run the page API builder in `target` with `args` as its arguments
    async fn execute_script(
        &self,
        target: ContextId,
        world: ExecutionWorld,
        args: &[Value],
    ) -> Result<(), HostError>;
}

#[async_trait(?Send)]
pub trait WindowingHost {
    /// Whether the native action popup can be opened programmatically
    fn has_action_popup(&self) -> bool;

    fn open_action_popup(&self) -> Result<(), HostError>;

    async fn current_window(&self) -> Result<WindowBounds, HostError>;

    async fn create_window(&self, request: &CreateWindow) -> Result<(), HostError>;
}

/// An instantiated dashboard module and its two entry exports
#[async_trait(?Send)]
pub trait HostedModule {
    /// Runs for the lifetime of the background process
    async fn background_entry(&self) -> Result<(), HostError>;

    async fn ui_entry(&self) -> Result<(), HostError>;
}

#[async_trait(?Send)]
pub trait ModuleFactory {
    type Module: HostedModule + 'static;

    /// Fetch, compile and instantiate the binary at `module_path`
    async fn instantiate(&self, module_path: &str) -> Result<Self::Module, HostError>;
}
