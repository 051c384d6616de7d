// Background process controller
// Loads the dashboard once, builds the entry point registry, then leaves the
// dashboard's background entry running as a detached task

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::task::{LocalSpawn, LocalSpawnExt};
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use crate::config::ExtensionConfig;
use crate::error::ExtensionError;
use crate::host::{ModuleFactory, ScriptingHost, WindowingHost};
use crate::injector::CapabilityInjector;
use crate::loader::{LoaderStatus, ModuleLoader};
use crate::popup::PopupLauncher;
use crate::registry::EntryPointRegistry;

/// Lifecycle of the background process.
///
/// `Running` only ends when the browser kills the process. `Failed` is
/// permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundState {
    Starting,
    Ready,
    Running,
    Failed(ExtensionError),
}

/// Startup failures and errors from the detached background entry
pub type FatalErrors = UnboundedReceiver<ExtensionError>;

pub struct BackgroundProcess<F: ModuleFactory> {
    config: ExtensionConfig,
    loader: ModuleLoader<F>,
    scripting: Rc<dyn ScriptingHost>,
    windowing: Rc<dyn WindowingHost>,
    state: RefCell<BackgroundState>,
    entry_points: OnceCell<Rc<EntryPointRegistry>>,
    fatal_tx: UnboundedSender<ExtensionError>,
    observer: Option<Box<dyn Fn(&BackgroundState)>>,
}

impl<F: ModuleFactory> BackgroundProcess<F> {
    pub fn new(
        config: ExtensionConfig,
        factory: F,
        scripting: Rc<dyn ScriptingHost>,
        windowing: Rc<dyn WindowingHost>,
    ) -> (Self, FatalErrors) {
        let (fatal_tx, fatal_rx) = mpsc::unbounded();
        let process = Self {
            config,
            loader: ModuleLoader::new(factory),
            scripting,
            windowing,
            state: RefCell::new(BackgroundState::Starting),
            entry_points: OnceCell::new(),
            fatal_tx,
            observer: None,
        };
        (process, fatal_rx)
    }

    /// Called on every state transition
    pub fn with_observer(mut self, observer: impl Fn(&BackgroundState) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> BackgroundState {
        self.state.borrow().clone()
    }

    pub fn loader_status(&self) -> LoaderStatus {
        self.loader.status()
    }

    /// The registry, available from `Ready` on and never before
    pub fn entry_points(&self) -> Option<Rc<EntryPointRegistry>> {
        self.entry_points.get().cloned()
    }

    /// Run the startup sequence `Starting -> Ready -> Running`.
    ///
    /// Returns once the background entry has been spawned on `spawner`; that
    /// task is never awaited and reports failure on the fatal error channel.
    /// A load failure leaves the process in `Failed` for good and is also sent
    /// on the fatal error channel.
    pub async fn start<S>(&self, spawner: &S) -> Result<(), ExtensionError>
    where
        S: LocalSpawn + ?Sized,
    {
        let module_path = self.config.module_path.clone();
        let status = self.loader.status();
        if status != LoaderStatus::Uninit {
            return Err(ExtensionError::AlreadyLoaded {
                path: module_path,
                status,
            });
        }

        self.transition(BackgroundState::Starting);

        let handle = match self.loader.load(&module_path).await {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(e.clone());
                return Err(e);
            }
        };

        let registry = EntryPointRegistry::new(
            CapabilityInjector::new(self.scripting.clone(), self.config.injection_world),
            PopupLauncher::new(self.windowing.clone(), &self.config),
        );
        let names: Vec<&str> = registry.entry_points().iter().map(|e| e.name()).collect();
        let _ = self.entry_points.set(Rc::new(registry));
        log::info!("Entry points registered: {}", names.join(", "));
        self.transition(BackgroundState::Ready);

        let fatal_tx = self.fatal_tx.clone();
        let task = async move {
            let path = handle.path().to_string();
            match handle.background_entry().await {
                Ok(()) => log::warn!("Background entry of {} returned", path),
                Err(e) => {
                    let _ = fatal_tx.unbounded_send(ExtensionError::BackgroundEntryFailed {
                        path,
                        cause: e.to_string(),
                    });
                }
            }
        };

        if let Err(e) = spawner.spawn_local(task) {
            let err = ExtensionError::BackgroundEntryFailed {
                path: module_path,
                cause: format!("could not spawn background entry: {}", e),
            };
            self.fail(err.clone());
            return Err(err);
        }

        self.transition(BackgroundState::Running);
        Ok(())
    }

    fn fail(&self, err: ExtensionError) {
        log::error!("Background startup failed: {}", err);
        let _ = self.fatal_tx.unbounded_send(err.clone());
        self.transition(BackgroundState::Failed(err));
    }

    fn transition(&self, next: BackgroundState) {
        log::info!("Background process: {:?}", next);
        *self.state.borrow_mut() = next.clone();
        if let Some(observer) = &self.observer {
            observer(&next);
        }
    }
}
