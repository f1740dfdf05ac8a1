//! Resize anchors and hover cursors for the selection rectangle

use super::geometry::{Point, Rect};

/// Horizontal edge an anchor drags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalEdge {
    /// `x`
    Left,
    /// `r`
    Right,
}

/// Vertical edge an anchor drags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalEdge {
    /// `y`
    Top,
    /// `b`
    Bottom,
}

/// Cursor hint the host should show for the current hover target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Auto,
    Move,
    NwseResize,
    NsResize,
    NeswResize,
    EwResize,
}

impl CursorHint {
    /// CSS cursor name
    pub fn as_str(self) -> &'static str {
        match self {
            CursorHint::Auto => "auto",
            CursorHint::Move => "move",
            CursorHint::NwseResize => "nwse-resize",
            CursorHint::NsResize => "ns-resize",
            CursorHint::NeswResize => "nesw-resize",
            CursorHint::EwResize => "ew-resize",
        }
    }
}

/// Which edges an anchor moves, plus its cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorEdges {
    pub row: Option<HorizontalEdge>,
    pub col: Option<VerticalEdge>,
    pub cursor: CursorHint,
}

/// One of the 8 resize handles, in hit-test order (corners of the top row,
/// the two side edges, then the bottom row)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// North-West corner
    NW,
    /// North edge
    N,
    /// North-East corner
    NE,
    /// West edge
    W,
    /// East edge
    E,
    /// South-West corner
    SW,
    /// South edge
    S,
    /// South-East corner
    SE,
}

/// All anchors in definition order
pub const ANCHORS: [Anchor; 8] = [
    Anchor::NW,
    Anchor::N,
    Anchor::NE,
    Anchor::W,
    Anchor::E,
    Anchor::SW,
    Anchor::S,
    Anchor::SE,
];

impl Anchor {
    pub fn edges(self) -> AnchorEdges {
        use HorizontalEdge::{Left, Right};
        use VerticalEdge::{Bottom, Top};

        let (row, col, cursor) = match self {
            Anchor::NW => (Some(Left), Some(Top), CursorHint::NwseResize),
            Anchor::N => (None, Some(Top), CursorHint::NsResize),
            Anchor::NE => (Some(Right), Some(Top), CursorHint::NeswResize),
            Anchor::W => (Some(Left), None, CursorHint::EwResize),
            Anchor::E => (Some(Right), None, CursorHint::EwResize),
            Anchor::SW => (Some(Left), Some(Bottom), CursorHint::NeswResize),
            Anchor::S => (None, Some(Bottom), CursorHint::NsResize),
            Anchor::SE => (Some(Right), Some(Bottom), CursorHint::NwseResize),
        };
        AnchorEdges { row, col, cursor }
    }

    /// Position in [`ANCHORS`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Handle center on the given rectangle, in logical coordinates
    pub fn center(self, rect: &Rect) -> Point {
        let mid_x = rect.x() + rect.w() / 2;
        let mid_y = rect.y() + rect.h() / 2;
        match self {
            Anchor::NW => Point::new(rect.x(), rect.y()),
            Anchor::N => Point::new(mid_x, rect.y()),
            Anchor::NE => Point::new(rect.r(), rect.y()),
            Anchor::W => Point::new(rect.x(), mid_y),
            Anchor::E => Point::new(rect.r(), mid_y),
            Anchor::SW => Point::new(rect.x(), rect.b()),
            Anchor::S => Point::new(mid_x, rect.b()),
            Anchor::SE => Point::new(rect.r(), rect.b()),
        }
    }
}

impl TryFrom<u8> for Anchor {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        ANCHORS.get(index as usize).copied().ok_or(index)
    }
}

/// Centers of all 8 handles in definition order
pub fn anchor_centers(rect: &Rect) -> [Point; 8] {
    ANCHORS.map(|anchor| anchor.center(rect))
}

/// Find the handle within `tolerance` pixels (per axis) of `pointer`.
///
/// Overlapping handles on small selections resolve to the last match in
/// definition order.
pub fn hit_test(centers: &[Point; 8], pointer: Point, tolerance: i32) -> Option<Anchor> {
    let mut hit = None;
    for (anchor, center) in ANCHORS.iter().zip(centers) {
        let dx = pointer.x.saturating_sub(center.x).saturating_abs();
        let dy = pointer.y.saturating_sub(center.y).saturating_abs();
        if dx <= tolerance && dy <= tolerance {
            hit = Some(*anchor);
        }
    }
    hit
}
