// Extension configuration
// Passed in as JSON by the JavaScript glue; every field has a default

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ExtensionError;

/// Execution world a capability script is injected into.
///
/// `Main` shares the page's own global scope, so the page can see and call the
/// injected API. `Isolated` keeps it in the extension's content-script sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionWorld {
    Isolated,
    #[default]
    Main,
}

impl ExecutionWorld {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionWorld::Isolated => "ISOLATED",
            ExecutionWorld::Main => "MAIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Path of the hosted dashboard binary, relative to the extension root
    pub module_path: String,
    /// Export invoked by the background process
    pub background_entry: String,
    /// Export invoked by the popup process
    pub ui_entry: String,
    pub popup_url: String,
    pub popup_width: i32,
    pub popup_height: i32,
    pub injection_world: ExecutionWorld,
    pub log_level: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            module_path: "/tondi-dashboard_bg.wasm".to_string(),
            background_entry: "tondi_dashboard_background".to_string(),
            ui_entry: "tondi_dashboard_main".to_string(),
            popup_url: "popup.html".to_string(),
            popup_width: 400,
            popup_height: 600,
            injection_world: ExecutionWorld::Main,
            log_level: "info".to_string(),
        }
    }
}

impl ExtensionConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// `null` yields the defaults, which is what the glue sends when it has
    /// nothing to override.
    pub fn from_json(json: &str) -> Result<Self, ExtensionError> {
        let config: Option<Self> =
            serde_json::from_str(json).map_err(|e| ExtensionError::Config(e.to_string()))?;
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExtensionError> {
        if self.module_path.trim().is_empty() {
            return Err(ExtensionError::Config("module_path must not be empty".into()));
        }
        if self.popup_url.trim().is_empty() {
            return Err(ExtensionError::Config("popup_url must not be empty".into()));
        }
        if self.background_entry.trim().is_empty() || self.ui_entry.trim().is_empty() {
            return Err(ExtensionError::Config("entry export names must not be empty".into()));
        }
        if self.popup_width <= 0 || self.popup_height <= 0 {
            return Err(ExtensionError::Config(format!(
                "popup size must be positive, got {}x{}",
                self.popup_width, self.popup_height
            )));
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<log::Level, ExtensionError> {
        log::Level::from_str(&self.log_level)
            .map_err(|_| ExtensionError::Config(format!("unknown log level: {}", self.log_level)))
    }
}
