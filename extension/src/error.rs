use thiserror::Error;

use crate::host::ContextId;
use crate::loader::LoaderStatus;

/// Errors raised by the orchestration layer.
///
/// Startup failures (`LoadFailure`) are fatal to the owning process. Per-call
/// failures (`TargetGone`, `InjectionFailed`, `PopupLaunchFailure`) stay local to
/// the call that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    #[error("failed to load hosted module from {path}: {cause}")]
    LoadFailure { path: String, cause: String },

    #[error("hosted module load already requested (loader is {status:?}), refusing to load {path}")]
    AlreadyLoaded { path: String, status: LoaderStatus },

    #[error("injection target {target} no longer exists: {cause}")]
    TargetGone { target: ContextId, cause: String },

    #[error("injection into {target} failed: {cause}")]
    InjectionFailed { target: ContextId, cause: String },

    #[error("injection arguments are not serializable: {0}")]
    InvalidArguments(String),

    #[error("failed to open popup: {0}")]
    PopupLaunchFailure(String),

    #[error("{0} called before the hosted module is ready")]
    NotReady(&'static str),

    #[error("background entry of {path} failed: {cause}")]
    BackgroundEntryFailed { path: String, cause: String },

    #[error("UI entry of {path} failed: {cause}")]
    UiEntryFailed { path: String, cause: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
