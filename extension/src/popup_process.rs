// Popup process
// Each popup surface loads its own copy of the dashboard and starts the UI

use std::cell::Cell;

use crate::config::ExtensionConfig;
use crate::error::ExtensionError;
use crate::host::ModuleFactory;
use crate::loader::ModuleLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Loading,
    Running,
    Failed,
}

pub struct PopupProcess<F: ModuleFactory> {
    config: ExtensionConfig,
    loader: ModuleLoader<F>,
    state: Cell<PopupState>,
}

impl<F: ModuleFactory> PopupProcess<F> {
    pub fn new(config: ExtensionConfig, factory: F) -> Self {
        Self {
            config,
            loader: ModuleLoader::new(factory),
            state: Cell::new(PopupState::Loading),
        }
    }

    pub fn state(&self) -> PopupState {
        self.state.get()
    }

    /// Load the dashboard and run its UI entry. Errors are logged and returned
    /// so the caller can put an error view on the popup surface.
    pub async fn run(&self) -> Result<(), ExtensionError> {
        let handle = match self.loader.load(&self.config.module_path).await {
            Ok(handle) => handle,
            Err(e @ ExtensionError::AlreadyLoaded { .. }) => return Err(e),
            Err(e) => {
                log::error!("Popup could not start: {}", e);
                self.state.set(PopupState::Failed);
                return Err(e);
            }
        };

        self.state.set(PopupState::Running);
        handle.ui_entry().await.map_err(|e| {
            let err = ExtensionError::UiEntryFailed {
                path: handle.path().to_string(),
                cause: e.to_string(),
            };
            log::error!("{}", err);
            self.state.set(PopupState::Failed);
            err
        })
    }
}
