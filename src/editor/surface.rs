use crate::domain::CursorHint;

/// Where the overlay pixmap sits on the capture surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPlacement {
    /// Logical position, `(x - margin, y - margin)` of the selection
    pub left: i32,
    pub top: i32,
    /// Logical size including the margin on both sides
    pub width: i32,
    pub height: i32,
    /// Size of the overlay pixmap
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// Host side of a capture surface.
///
/// The editor draws into its own pixmaps and only tells the host what to
/// show and where.
pub trait Surface {
    /// Show the frozen screenshot stretched over the whole display
    fn show_background(&mut self, _width: i32, _height: i32) {}

    /// Place the overlay, or hide it with `None`
    fn place_overlay(&mut self, placement: Option<OverlayPlacement>);

    fn set_cursor(&mut self, _cursor: CursorHint) {}
}

/// Surface that discards everything, for headless editing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn place_overlay(&mut self, _placement: Option<OverlayPlacement>) {}
}
