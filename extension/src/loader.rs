// Hosted module loader
// One instantiation per process: a second load is reported as a programming
// error instead of instantiating the dashboard twice

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ExtensionError;
use crate::host::{HostError, HostedModule, ModuleFactory};

/// Shared reference to the instantiated dashboard module.
///
/// Cloning is cheap and stays inside the owning process; handles never cross
/// into another process.
pub struct ModuleHandle<M> {
    module: Rc<M>,
    path: Rc<str>,
}

impl<M> Clone for ModuleHandle<M> {
    fn clone(&self) -> Self {
        Self {
            module: self.module.clone(),
            path: self.path.clone(),
        }
    }
}

impl<M: HostedModule> ModuleHandle<M> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn background_entry(&self) -> Result<(), HostError> {
        self.module.background_entry().await
    }

    pub async fn ui_entry(&self) -> Result<(), HostError> {
        self.module.ui_entry().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    Uninit,
    Loading,
    Ready,
    Failed,
}

enum LoaderState<M> {
    Uninit,
    Loading,
    Ready(ModuleHandle<M>),
    Failed(ExtensionError),
}

impl<M> LoaderState<M> {
    fn status(&self) -> LoaderStatus {
        match self {
            LoaderState::Uninit => LoaderStatus::Uninit,
            LoaderState::Loading => LoaderStatus::Loading,
            LoaderState::Ready(_) => LoaderStatus::Ready,
            LoaderState::Failed(_) => LoaderStatus::Failed,
        }
    }
}

pub struct ModuleLoader<F: ModuleFactory> {
    factory: F,
    state: RefCell<LoaderState<F::Module>>,
}

impl<F: ModuleFactory> ModuleLoader<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            state: RefCell::new(LoaderState::Uninit),
        }
    }

    pub fn status(&self) -> LoaderStatus {
        self.state.borrow().status()
    }

    /// Fetch and instantiate the hosted module.
    ///
    /// Only the first call reaches the factory. Any later call, whether the
    /// first one is still in flight, succeeded or failed, returns
    /// `AlreadyLoaded`. A failed load is not retried.
    pub async fn load(&self, module_path: &str) -> Result<ModuleHandle<F::Module>, ExtensionError> {
        {
            let mut state = self.state.borrow_mut();
            match &*state {
                LoaderState::Uninit => {}
                LoaderState::Loading => log::warn!("Hosted module load already in flight"),
                LoaderState::Ready(handle) => {
                    log::warn!("Hosted module already loaded from {}", handle.path())
                }
                LoaderState::Failed(prior) => {
                    log::warn!("Hosted module load refused, earlier attempt failed: {}", prior)
                }
            }
            if !matches!(*state, LoaderState::Uninit) {
                return Err(ExtensionError::AlreadyLoaded {
                    path: module_path.to_string(),
                    status: state.status(),
                });
            }
            *state = LoaderState::Loading;
        }

        log::info!("Loading hosted module from {}", module_path);

        match self.factory.instantiate(module_path).await {
            Ok(module) => {
                let handle = ModuleHandle {
                    module: Rc::new(module),
                    path: Rc::from(module_path),
                };
                *self.state.borrow_mut() = LoaderState::Ready(handle.clone());
                log::info!("Hosted module ready: {}", module_path);
                Ok(handle)
            }
            Err(e) => {
                let err = ExtensionError::LoadFailure {
                    path: module_path.to_string(),
                    cause: e.to_string(),
                };
                *self.state.borrow_mut() = LoaderState::Failed(err.clone());
                Err(err)
            }
        }
    }
}
