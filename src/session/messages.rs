//! Message types for a capture session
//!
//! This module contains:
//! - CaptureAction, the single action channel between capture windows and
//!   the orchestrator
//! - TakeScreen, the per-window startup payload
//! - ToolbarAction for the toolbar buttons

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{Display, Tool};

// ============================================================================
// Action channel
// ============================================================================

/// Actions exchanged on the capture channel, as `{"type": ..., ...}` JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CaptureAction {
    /// Begin a capture session
    Start,
    /// A display committed a selection; every other display must stop
    Select {
        #[serde(rename = "screenId")]
        screen_id: String,
    },
    /// The final image is ready
    Complete {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    Cancel,
    /// Close the capture windows without ending the session
    Hide,
    /// A display has its frame and wants its window shown full screen
    Full {
        #[serde(rename = "screenId")]
        screen_id: String,
    },
    Error { error: String },
}

impl CaptureAction {
    pub fn select(screen_id: impl Into<String>) -> Self {
        Self::Select {
            screen_id: screen_id.into(),
        }
    }

    pub fn full(screen_id: impl Into<String>) -> Self {
        Self::Full {
            screen_id: screen_id.into(),
        }
    }

    pub fn complete(url: String, path: Option<PathBuf>) -> Self {
        Self::Complete { url, path }
    }

    /// Error action carrying the full cause chain
    pub fn error(err: &anyhow::Error) -> Self {
        Self::Error {
            error: format!("{err:#}"),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ============================================================================
// Window startup
// ============================================================================

/// Sent to each capture window once it is ready
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeScreen {
    pub display: Display,
    /// Largest physical display width across the session
    pub max_width: u32,
    /// Largest physical display height across the session
    pub max_height: u32,
    /// Display id as used on the action channel
    pub id: String,
    /// Position of the display in enumeration order
    pub index: usize,
}

// ============================================================================
// Toolbar
// ============================================================================

/// Toolbar buttons shown under a committed selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolbarAction {
    Close,
    Ok,
    Save,
    Reset,
    Rect,
    Line,
    Ellipse,
    Arrow,
}

impl ToolbarAction {
    /// Annotation tool armed by this button, if any
    pub fn tool(self) -> Option<Tool> {
        match self {
            ToolbarAction::Rect => Some(Tool::Rect),
            ToolbarAction::Line => Some(Tool::Line),
            ToolbarAction::Ellipse => Some(Tool::Ellipse),
            ToolbarAction::Arrow => Some(Tool::Arrow),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bounds;

    #[test]
    fn actions_use_the_wire_field_names() {
        let json = CaptureAction::select("42").to_json().unwrap();
        assert_eq!(json, r#"{"type":"select","screenId":"42"}"#);

        let json = CaptureAction::complete("data:x".into(), None).to_json().unwrap();
        assert_eq!(json, r#"{"type":"complete","url":"data:x"}"#);

        assert_eq!(
            CaptureAction::from_json(r#"{"type":"cancel"}"#).unwrap(),
            CaptureAction::Cancel
        );
        assert_eq!(
            CaptureAction::from_json(r#"{"type":"complete","url":"u","path":"/tmp/a.png"}"#)
                .unwrap(),
            CaptureAction::complete("u".into(), Some(PathBuf::from("/tmp/a.png")))
        );
    }

    #[test]
    fn unknown_action_types_are_rejected() {
        assert!(CaptureAction::from_json(r#"{"type":"explode"}"#).is_err());
    }

    #[test]
    fn error_action_keeps_the_context_chain() {
        let err = anyhow::anyhow!("no frame").context("grabbing display 2");
        assert_eq!(
            CaptureAction::error(&err),
            CaptureAction::Error {
                error: "grabbing display 2: no frame".into()
            }
        );
    }

    #[test]
    fn take_screen_serializes_camel_case() {
        let screen = TakeScreen {
            display: Display {
                id: 2,
                scale_factor: 2.0,
                bounds: Bounds {
                    x: 0,
                    y: 0,
                    width: 10,
                    height: 10,
                },
            },
            max_width: 20,
            max_height: 20,
            id: "2".into(),
            index: 0,
        };
        let value = serde_json::to_value(&screen).unwrap();
        assert_eq!(value["maxWidth"], 20);
        assert_eq!(value["display"]["scaleFactor"], 2.0);
    }

    #[test]
    fn only_drawing_buttons_map_to_tools() {
        assert_eq!(ToolbarAction::Ellipse.tool(), Some(Tool::Ellipse));
        assert_eq!(ToolbarAction::Save.tool(), None);
    }
}
