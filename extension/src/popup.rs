// Popup launcher
// Prefers the native action popup; otherwise opens a panel window flush with
// the right edge of the current window

use serde::Serialize;
use std::rc::Rc;

use crate::config::ExtensionConfig;
use crate::error::ExtensionError;
use crate::host::{WindowBounds, WindowingHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowGeometry {
    /// Right-align a `width` x `height` window with `anchor`.
    ///
    /// `left` is clamped at 0, so an anchor narrower than the popup leaves the
    /// popup sticking out past its right edge.
    pub fn anchored_to(anchor: WindowBounds, width: i32, height: i32) -> Self {
        let left = anchor
            .left
            .saturating_add(anchor.width)
            .saturating_sub(width)
            .max(0);
        Self { left, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Panel,
}

/// Arguments of `chrome.windows.create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateWindow {
    pub url: String,
    pub left: i32,
    pub width: i32,
    pub height: i32,
    pub focused: bool,
    #[serde(rename = "type")]
    pub window_type: WindowType,
}

impl CreateWindow {
    pub fn panel(url: &str, geometry: WindowGeometry) -> Self {
        Self {
            url: url.to_string(),
            left: geometry.left,
            width: geometry.width,
            height: geometry.height,
            focused: true,
            window_type: WindowType::Panel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    ActionPopup,
    PanelWindow(WindowGeometry),
}

pub struct PopupLauncher {
    windowing: Rc<dyn WindowingHost>,
    url: String,
    width: i32,
    height: i32,
}

impl PopupLauncher {
    pub fn new(windowing: Rc<dyn WindowingHost>, config: &ExtensionConfig) -> Self {
        Self {
            windowing,
            url: config.popup_url.clone(),
            width: config.popup_width,
            height: config.popup_height,
        }
    }

    /// Open the popup surface. Geometry is computed from the current window on
    /// every call.
    pub async fn open_popup(&self) -> Result<LaunchOutcome, ExtensionError> {
        let outcome = self.launch().await;
        if let Err(e) = &outcome {
            log::error!("{}", e);
        }
        outcome
    }

    async fn launch(&self) -> Result<LaunchOutcome, ExtensionError> {
        if self.windowing.has_action_popup() {
            self.windowing
                .open_action_popup()
                .map_err(|e| ExtensionError::PopupLaunchFailure(e.to_string()))?;
            return Ok(LaunchOutcome::ActionPopup);
        }

        let anchor = self.windowing.current_window().await.map_err(|e| {
            ExtensionError::PopupLaunchFailure(format!("current window query failed: {}", e))
        })?;
        let geometry = WindowGeometry::anchored_to(anchor, self.width, self.height);
        log::debug!("Opening popup panel at {:?} (anchor {:?})", geometry, anchor);

        self.windowing
            .create_window(&CreateWindow::panel(&self.url, geometry))
            .await
            .map_err(|e| {
                ExtensionError::PopupLaunchFailure(format!("window creation failed: {}", e))
            })?;

        Ok(LaunchOutcome::PanelWindow(geometry))
    }
}
