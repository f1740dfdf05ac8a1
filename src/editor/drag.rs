//! Per-gesture drag bookkeeping for create / move / resize

use crate::domain::{Anchor, HorizontalEdge, Point, Rect, VerticalEdge};

/// What a pointer-down started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Rubber-banding a new selection from the press point
    Creating,
    /// Translating the existing selection
    Moving,
    /// Dragging one handle; the anchor stays fixed for the whole gesture
    Resizing(Anchor),
}

/// Unsorted edges mutated while resizing. May be inverted mid-gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEdges {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl From<Rect> for RawEdges {
    fn from(rect: Rect) -> Self {
        Self {
            left: rect.x(),
            top: rect.y(),
            right: rect.r(),
            bottom: rect.b(),
        }
    }
}

/// State of one press-drag-release gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub origin: Point,
    pub moved: bool,
    pub gesture: Gesture,
    /// Selection at pointer-down
    pub snapshot: Rect,
    /// Working copy of the edges
    pub raw: RawEdges,
}

impl DragState {
    pub fn begin(gesture: Gesture, origin: Point, selection: Option<Rect>) -> Self {
        let snapshot = selection.unwrap_or_default();
        Self {
            origin,
            moved: false,
            gesture,
            snapshot,
            raw: snapshot.into(),
        }
    }

    /// Arm the drag once the pointer leaves the dead zone.
    ///
    /// Returns `true` only on the move that crosses the threshold.
    pub fn track(&mut self, pointer: Point, threshold: i32) -> bool {
        if self.moved {
            return false;
        }
        let (dx, dy) = pointer.delta(self.origin);
        if dx.saturating_abs() > threshold || dy.saturating_abs() > threshold {
            self.moved = true;
            return true;
        }
        false
    }

    /// Selection for the current pointer position, kept inside `width x height`
    pub fn apply(&mut self, pointer: Point, width: i32, height: i32) -> Rect {
        let (dx, dy) = pointer.delta(self.origin);
        match self.gesture {
            Gesture::Creating => Rect::from_points(
                self.origin.clamp_to(width, height),
                pointer.clamp_to(width, height),
            ),
            Gesture::Moving => self.snapshot.translate(dx, dy).clamp_within(width, height),
            Gesture::Resizing(anchor) => {
                let edges = anchor.edges();
                let mut rect = self.snapshot;
                if let Some(edge) = edges.row {
                    match edge {
                        HorizontalEdge::Left => {
                            self.raw.left = self.snapshot.x().saturating_add(dx).clamp(0, width)
                        }
                        HorizontalEdge::Right => {
                            self.raw.right = self.snapshot.r().saturating_add(dx).clamp(0, width)
                        }
                    }
                    rect.set_horizontal(self.raw.left, self.raw.right);
                }
                if let Some(edge) = edges.col {
                    match edge {
                        VerticalEdge::Top => {
                            self.raw.top = self.snapshot.y().saturating_add(dy).clamp(0, height)
                        }
                        VerticalEdge::Bottom => {
                            self.raw.bottom = self.snapshot.b().saturating_add(dy).clamp(0, height)
                        }
                    }
                    rect.set_vertical(self.raw.top, self.raw.bottom);
                }
                rect
            }
        }
    }
}
