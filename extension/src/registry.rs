// Entry points the background process offers to the rest of the extension

use crate::error::ExtensionError;
use crate::injector::{CapabilityInjector, InjectionRequest};
use crate::popup::{LaunchOutcome, PopupLauncher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    InitPageScript,
    OpenPopup,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 2] = [EntryPoint::InitPageScript, EntryPoint::OpenPopup];

    /// Name the entry point is published under
    pub fn name(&self) -> &'static str {
        match self {
            EntryPoint::InitPageScript => "initPageScript",
            EntryPoint::OpenPopup => "openPopup",
        }
    }
}

/// Built by the background process once the hosted module is loaded.
/// Holding one means the entry points are callable.
pub struct EntryPointRegistry {
    injector: CapabilityInjector,
    launcher: PopupLauncher,
}

impl EntryPointRegistry {
    pub fn new(injector: CapabilityInjector, launcher: PopupLauncher) -> Self {
        Self { injector, launcher }
    }

    pub fn entry_points(&self) -> &'static [EntryPoint] {
        &EntryPoint::ALL
    }

    /// `initPageScript(tabId, args)`
    pub async fn init_page_script(&self, request: InjectionRequest) -> Result<(), ExtensionError> {
        self.injector.inject(request).await
    }

    /// `openPopup()`
    pub async fn open_popup(&self) -> Result<LaunchOutcome, ExtensionError> {
        self.launcher.open_popup().await
    }
}
