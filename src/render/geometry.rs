//! Shared geometry calculations for overlay chrome and annotation strokes
//!
//! Everything here works in physical pixel coordinates of the overlay
//! pixmap; callers scale logical points before asking.

/// Arrow geometry constants
pub mod arrow {
    /// Distance from the tip to each barb point, in physical pixels
    pub const HEAD_LENGTH: f32 = 20.0;
    /// Distance from the tip to each shoulder where the barbs meet the shaft
    pub const SHOULDER_LENGTH: f32 = 12.0;
    /// Barb offsets from the stroke angle, in degrees
    pub const HEAD_ANGLES: (f32, f32) = (225.0, 135.0);
    /// Shoulder offsets from the stroke angle, in degrees
    pub const SHOULDER_ANGLES: (f32, f32) = (200.0, 160.0);

    /// Point at `length` from `tip`, rotated `offset_deg` from `angle`
    fn polar(tip: (f32, f32), angle: f32, offset_deg: f32, length: f32) -> (f32, f32) {
        let a = angle + offset_deg.to_radians();
        (tip.0 + length * a.cos(), tip.1 + length * a.sin())
    }

    /// Outline of a filled arrow: shaft plus a fixed-size head
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ArrowPolygon {
        pub start: (f32, f32),
        pub shoulder_a: (f32, f32),
        pub head_a: (f32, f32),
        pub tip: (f32, f32),
        pub head_b: (f32, f32),
        pub shoulder_b: (f32, f32),
    }

    impl ArrowPolygon {
        pub fn new(start: (f32, f32), tip: (f32, f32)) -> Self {
            let angle = (tip.1 - start.1).atan2(tip.0 - start.0);
            Self {
                start,
                shoulder_a: polar(tip, angle, SHOULDER_ANGLES.0, SHOULDER_LENGTH),
                head_a: polar(tip, angle, HEAD_ANGLES.0, HEAD_LENGTH),
                tip,
                head_b: polar(tip, angle, HEAD_ANGLES.1, HEAD_LENGTH),
                shoulder_b: polar(tip, angle, SHOULDER_ANGLES.1, SHOULDER_LENGTH),
            }
        }

        /// Vertices in drawing order; the path closes back to `start`
        pub fn points(&self) -> [(f32, f32); 6] {
            [
                self.start,
                self.shoulder_a,
                self.head_a,
                self.tip,
                self.head_b,
                self.shoulder_b,
            ]
        }
    }
}

/// Ellipse geometry (two cubic Bezier arcs)
pub mod ellipse {
    /// Ratio used to derive the horizontal control offset from the box width
    pub const CONTROL_RATIO: f32 = 0.75;

    /// Two arcs from the top of the ellipse to the bottom and back
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct EllipseArcs {
        pub top: (f32, f32),
        pub bottom: (f32, f32),
        /// Controls for the right arc, top to bottom
        pub right: [(f32, f32); 2],
        /// Controls for the left arc, bottom to top
        pub left: [(f32, f32); 2],
    }

    impl EllipseArcs {
        /// Fit the ellipse to the box spanned by two corners
        pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
            let width = a.0 - b.0;
            let height = a.1 - b.1;
            let cx = a.0 - width / 2.0;
            let cy = a.1 - height / 2.0;
            let k = width / CONTROL_RATIO / 2.0;
            let h = height / 2.0;
            Self {
                top: (cx, cy - h),
                bottom: (cx, cy + h),
                right: [(cx + k, cy - h), (cx + k, cy + h)],
                left: [(cx - k, cy + h), (cx - k, cy - h)],
            }
        }
    }
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}
