// Capability injection
// Installs the page API builder into a tab so the page can call back into the
// extension

use serde_json::Value;
use std::rc::Rc;

use crate::config::ExecutionWorld;
use crate::error::ExtensionError;
use crate::host::{ContextId, HostError, ScriptingHost};

/// A single injection call. Not retained after the call completes.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionRequest {
    pub target: ContextId,
    pub args: Vec<Value>,
}

impl InjectionRequest {
    pub fn new(target: ContextId, args: Vec<Value>) -> Self {
        Self { target, args }
    }

    /// Build a request from what `initPageScript(tabId, args)` was called with.
    ///
    /// `tab_id` must be a non-negative integer that fits a Chrome tab id. A
    /// missing argument list means no arguments.
    pub fn from_js_parts(
        tab_id: Option<f64>,
        args: Option<Vec<Value>>,
    ) -> Result<Self, ExtensionError> {
        let target = tab_id
            .filter(|id| id.fract() == 0.0 && *id >= 0.0 && *id <= i32::MAX as f64)
            .map(|id| ContextId(id as i32))
            .ok_or_else(|| {
                ExtensionError::InvalidArguments(format!("invalid tab id {:?}", tab_id))
            })?;
        Ok(Self::new(target, args.unwrap_or_default()))
    }
}

pub struct CapabilityInjector {
    scripting: Rc<dyn ScriptingHost>,
    world: ExecutionWorld,
}

impl CapabilityInjector {
    pub fn new(scripting: Rc<dyn ScriptingHost>, world: ExecutionWorld) -> Self {
        Self { scripting, world }
    }

    /// Inject the page API into `request.target`.
    ///
    /// A vanished tab is reported as `TargetGone` and logged as a warning; the
    /// caller decides whether to care. Nothing is retried.
    pub async fn inject(&self, request: InjectionRequest) -> Result<(), ExtensionError> {
        let InjectionRequest { target, args } = request;
        log::debug!(
            "Injecting page API into {} ({} world, {} args)",
            target,
            self.world.as_str(),
            args.len()
        );

        match self.scripting.execute_script(target, self.world, &args).await {
            Ok(()) => Ok(()),
            Err(HostError::TargetGone(cause)) => {
                log::warn!("Injection target {} is gone: {}", target, cause);
                Err(ExtensionError::TargetGone { target, cause })
            }
            Err(e) => {
                log::error!("Injection into {} failed: {}", target, e);
                Err(ExtensionError::InjectionFailed {
                    target,
                    cause: e.to_string(),
                })
            }
        }
    }
}

const TARGET_GONE_MARKERS: &[&str] = &["No tab with id", "tab was closed", "No frame with id"];

/// Map a `chrome.scripting` error message onto a host error
pub fn classify_script_error(message: &str) -> HostError {
    let frame_removed = message.contains("Frame with ID") && message.contains("was removed");
    if frame_removed || TARGET_GONE_MARKERS.iter().any(|marker| message.contains(marker)) {
        HostError::TargetGone(message.to_string())
    } else {
        HostError::Rejected(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeScripting, Injection};
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn test_args_arrive_unchanged_and_in_order() {
        let scripting = Rc::new(FakeScripting::with_tabs(&[7]));
        let injector = CapabilityInjector::new(scripting.clone(), ExecutionWorld::Main);
        let args = vec![
            json!("tondi:mainnet"),
            json!(42),
            json!({"origin": "https://example.org", "flags": [true, false]}),
            json!(null),
        ];

        block_on(injector.inject(InjectionRequest::new(ContextId(7), args.clone()))).unwrap();

        assert_eq!(
            scripting.injections.borrow().as_slice(),
            &[Injection {
                target: ContextId(7),
                world: ExecutionWorld::Main,
                args,
            }]
        );
    }

    #[test]
    fn test_missing_target_is_target_gone() {
        let scripting = Rc::new(FakeScripting::with_tabs(&[1]));
        let injector = CapabilityInjector::new(scripting.clone(), ExecutionWorld::Main);

        let result = block_on(injector.inject(InjectionRequest::new(ContextId(99), vec![])));

        assert!(matches!(
            result,
            Err(ExtensionError::TargetGone {
                target: ContextId(99),
                ..
            })
        ));
        assert!(scripting.injections.borrow().is_empty());
    }

    #[test]
    fn test_other_host_errors_are_injection_failures() {
        let scripting = Rc::new(FakeScripting::with_tabs(&[1]));
        *scripting.reject_with.borrow_mut() = Some("Cannot access a chrome:// URL".into());
        let injector = CapabilityInjector::new(scripting, ExecutionWorld::Main);

        let result = block_on(injector.inject(InjectionRequest::new(ContextId(1), vec![])));

        assert_eq!(
            result,
            Err(ExtensionError::InjectionFailed {
                target: ContextId(1),
                cause: "Cannot access a chrome:// URL".into(),
            })
        );
    }

    #[test]
    fn test_configured_world_is_used() {
        let scripting = Rc::new(FakeScripting::with_tabs(&[3]));
        let injector = CapabilityInjector::new(scripting.clone(), ExecutionWorld::Isolated);

        block_on(injector.inject(InjectionRequest::new(ContextId(3), vec![json!(1)]))).unwrap();

        assert_eq!(scripting.injections.borrow()[0].world, ExecutionWorld::Isolated);
    }

    #[test]
    fn test_request_from_js_parts() {
        let request = InjectionRequest::from_js_parts(Some(5.0), None).unwrap();
        assert_eq!(request.target, ContextId(5));
        assert!(request.args.is_empty());

        let request =
            InjectionRequest::from_js_parts(Some(0.0), Some(vec![json!("a"), json!(2)])).unwrap();
        assert_eq!(request.target, ContextId(0));
        assert_eq!(request.args, vec![json!("a"), json!(2)]);

        let request = InjectionRequest::from_js_parts(Some(i32::MAX as f64), None).unwrap();
        assert_eq!(request.target, ContextId(i32::MAX));
    }

    #[test]
    fn test_invalid_tab_ids_rejected() {
        for tab_id in [
            Some(-1.0),
            Some(2.5),
            Some(i32::MAX as f64 + 1.0),
            Some(f64::NAN),
            None,
        ] {
            assert!(
                matches!(
                    InjectionRequest::from_js_parts(tab_id, Some(vec![json!(1)])),
                    Err(ExtensionError::InvalidArguments(_))
                ),
                "tab id {:?} accepted",
                tab_id
            );
        }
    }

    #[test]
    fn test_classify_script_error() {
        assert!(matches!(
            classify_script_error("No tab with id: 12."),
            HostError::TargetGone(_)
        ));
        assert!(matches!(
            classify_script_error("Frame with ID 0 was removed."),
            HostError::TargetGone(_)
        ));
        assert!(matches!(
            classify_script_error("Extension manifest entry was removed."),
            HostError::Rejected(_)
        ));
        assert!(matches!(
            classify_script_error("Cannot access contents of url \"chrome://newtab/\"."),
            HostError::Rejected(_)
        ));
    }
}
