//! Annotation tool kinds for drawing on a frozen selection

use serde::{Deserialize, Serialize};

/// Annotation tool armed on the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Selection editing; no stroke drawing
    #[default]
    None,
    /// Freehand polyline
    Line,
    /// Axis-aligned rectangle outline
    Rect,
    /// Bezier-approximated ellipse outline
    Ellipse,
    /// Filled arrow polygon
    Arrow,
}

impl Tool {
    /// Whether this tool draws strokes (everything except `None`)
    pub fn is_drawing(self) -> bool {
        !matches!(self, Tool::None)
    }

    /// Whether each move restores the pre-stroke pixels before redrawing
    pub fn restores_snapshot(self) -> bool {
        matches!(self, Tool::Rect | Tool::Ellipse | Tool::Arrow)
    }
}
