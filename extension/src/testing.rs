// Recording fakes for the host seams, shared by the unit tests

use async_trait::async_trait;
use futures::channel::oneshot;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::config::ExecutionWorld;
use crate::host::{
    ContextId, HostError, HostedModule, ModuleFactory, ScriptingHost, WindowBounds, WindowingHost,
};
use crate::popup::CreateWindow;

#[derive(Debug, Clone, PartialEq)]
pub struct Injection {
    pub target: ContextId,
    pub world: ExecutionWorld,
    pub args: Vec<Value>,
}

/// Scripting host with a fixed set of open tabs
#[derive(Default)]
pub struct FakeScripting {
    pub open_tabs: RefCell<HashSet<i32>>,
    pub injections: RefCell<Vec<Injection>>,
    pub reject_with: RefCell<Option<String>>,
}

impl FakeScripting {
    pub fn with_tabs(tabs: &[i32]) -> Self {
        let fake = Self::default();
        fake.open_tabs.borrow_mut().extend(tabs.iter().copied());
        fake
    }
}

#[async_trait(?Send)]
impl ScriptingHost for FakeScripting {
    async fn execute_script(
        &self,
        target: ContextId,
        world: ExecutionWorld,
        args: &[Value],
    ) -> Result<(), HostError> {
        if let Some(message) = self.reject_with.borrow().clone() {
            return Err(HostError::Rejected(message));
        }
        if !self.open_tabs.borrow().contains(&target.0) {
            return Err(HostError::TargetGone(format!("No tab with id: {}", target.0)));
        }
        self.injections.borrow_mut().push(Injection {
            target,
            world,
            args: args.to_vec(),
        });
        Ok(())
    }
}

/// Windowing host whose current window can be moved between calls
pub struct FakeWindows {
    pub action_popup: bool,
    pub current: Cell<WindowBounds>,
    pub action_popups_opened: Cell<usize>,
    pub window_queries: Cell<usize>,
    pub created: RefCell<Vec<CreateWindow>>,
    pub fail_action: Cell<bool>,
    pub fail_query: Cell<bool>,
    pub fail_create: Cell<bool>,
}

impl FakeWindows {
    pub fn new(action_popup: bool, left: i32, width: i32) -> Self {
        Self {
            action_popup,
            current: Cell::new(WindowBounds { left, width }),
            action_popups_opened: Cell::new(0),
            window_queries: Cell::new(0),
            created: RefCell::new(Vec::new()),
            fail_action: Cell::new(false),
            fail_query: Cell::new(false),
            fail_create: Cell::new(false),
        }
    }
}

#[async_trait(?Send)]
impl WindowingHost for FakeWindows {
    fn has_action_popup(&self) -> bool {
        self.action_popup
    }

    fn open_action_popup(&self) -> Result<(), HostError> {
        if self.fail_action.get() {
            return Err(HostError::Rejected("Could not find an active browser window.".into()));
        }
        self.action_popups_opened.set(self.action_popups_opened.get() + 1);
        Ok(())
    }

    async fn current_window(&self) -> Result<WindowBounds, HostError> {
        self.window_queries.set(self.window_queries.get() + 1);
        if self.fail_query.get() {
            return Err(HostError::Rejected("No current window".into()));
        }
        Ok(self.current.get())
    }

    async fn create_window(&self, request: &CreateWindow) -> Result<(), HostError> {
        if self.fail_create.get() {
            return Err(HostError::Rejected("Invalid value for bounds".into()));
        }
        self.created.borrow_mut().push(request.clone());
        Ok(())
    }
}

/// Module whose entries record their calls; the background entry stays
/// pending until `finish_background` fires (or forever if it never does)
pub struct FakeModule {
    pub background_calls: Rc<Cell<usize>>,
    pub ui_calls: Rc<Cell<usize>>,
    background_exit: RefCell<Option<oneshot::Receiver<Result<(), HostError>>>>,
    ui_result: Result<(), HostError>,
}

#[async_trait(?Send)]
impl HostedModule for FakeModule {
    async fn background_entry(&self) -> Result<(), HostError> {
        self.background_calls.set(self.background_calls.get() + 1);
        let exit = self.background_exit.borrow_mut().take();
        match exit {
            Some(rx) => match rx.await {
                Ok(result) => result,
                Err(_) => futures::future::pending().await,
            },
            None => futures::future::pending().await,
        }
    }

    async fn ui_entry(&self) -> Result<(), HostError> {
        self.ui_calls.set(self.ui_calls.get() + 1);
        self.ui_result.clone()
    }
}

pub struct FakeFactory {
    pub instantiations: Rc<Cell<usize>>,
    pub requested_paths: Rc<RefCell<Vec<String>>>,
    pub background_calls: Rc<Cell<usize>>,
    pub ui_calls: Rc<Cell<usize>>,
    fail_with: Option<String>,
    ui_result: Result<(), HostError>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    background_exit: RefCell<Option<oneshot::Receiver<Result<(), HostError>>>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            instantiations: Rc::new(Cell::new(0)),
            requested_paths: Rc::new(RefCell::new(Vec::new())),
            background_calls: Rc::new(Cell::new(0)),
            ui_calls: Rc::new(Cell::new(0)),
            fail_with: None,
            ui_result: Ok(()),
            gate: RefCell::new(None),
            background_exit: RefCell::new(None),
        }
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            fail_with: Some(cause.to_string()),
            ..Self::new()
        }
    }

    pub fn with_ui_result(mut self, result: Result<(), HostError>) -> Self {
        self.ui_result = result;
        self
    }

    /// Hold instantiation until the returned sender fires
    pub fn gated(self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        (self, tx)
    }

    /// Let the test decide when (and how) the background entry returns
    pub fn with_background_exit(self) -> (Self, oneshot::Sender<Result<(), HostError>>) {
        let (tx, rx) = oneshot::channel();
        *self.background_exit.borrow_mut() = Some(rx);
        (self, tx)
    }
}

#[async_trait(?Send)]
impl ModuleFactory for FakeFactory {
    type Module = FakeModule;

    async fn instantiate(&self, module_path: &str) -> Result<FakeModule, HostError> {
        self.instantiations.set(self.instantiations.get() + 1);
        self.requested_paths.borrow_mut().push(module_path.to_string());

        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(cause) = &self.fail_with {
            return Err(HostError::Rejected(cause.clone()));
        }

        Ok(FakeModule {
            background_calls: self.background_calls.clone(),
            ui_calls: self.ui_calls.clone(),
            background_exit: RefCell::new(self.background_exit.borrow_mut().take()),
            ui_result: self.ui_result.clone(),
        })
    }
}
