//! Colours used by the scene exporter.

use serde::{Deserialize, Serialize};

/// Colours of exported scene elements, as CSS colour strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Rays that hit the next surface
    pub valid: String,
    /// Rays blocked by a surface
    pub blocked: String,
    /// Chain joints; `None` leaves the viewer default
    pub joint: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            valid: "#ffa724".into(),
            blocked: "red".into(),
            joint: None,
        }
    }
}
