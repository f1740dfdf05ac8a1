//! Geometric types for selection regions and pointer coordinates

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Pointer position in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset from another point, saturating at the `i32` range
    pub fn delta(self, origin: Point) -> (i32, i32) {
        (self.x.saturating_sub(origin.x), self.y.saturating_sub(origin.y))
    }

    /// Clamp into `[0, width] x [0, height]`
    pub fn clamp_to(self, width: i32, height: i32) -> Point {
        Point {
            x: self.x.clamp(0, width.max(0)),
            y: self.y.clamp(0, height.max(0)),
        }
    }
}

/// Logical selection rectangle.
///
/// Keeps both size (`w`, `h`) and far edges (`r`, `b`); `r == x + w` and
/// `b == y + h` hold after every constructor and mutator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    r: i32,
    b: i32,
}

impl Rect {
    /// Create a rectangle from origin and size. Negative sizes are normalized.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::from_edges(x, y, x + w, y + h)
    }

    /// Create a rectangle from two arbitrary corners, sorting each axis
    pub fn from_edges(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (x, r) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        let (y, b) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
        Self {
            x,
            y,
            w: r - x,
            h: b - y,
            r,
            b,
        }
    }

    /// Bounding box of two points
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::from_edges(a.x, a.y, b.x, b.y)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn w(&self) -> i32 {
        self.w
    }

    pub fn h(&self) -> i32 {
        self.h
    }

    /// Right edge (`x + w`)
    pub fn r(&self) -> i32 {
        self.r
    }

    /// Bottom edge (`y + h`)
    pub fn b(&self) -> i32 {
        self.b
    }

    /// Replace the horizontal span, re-sorting if the edges crossed
    pub fn set_horizontal(&mut self, left: i32, right: i32) {
        let (x, r) = if left > right {
            (right, left)
        } else {
            (left, right)
        };
        self.x = x;
        self.r = r;
        self.w = r - x;
    }

    /// Replace the vertical span, re-sorting if the edges crossed
    pub fn set_vertical(&mut self, top: i32, bottom: i32) {
        let (y, b) = if top > bottom {
            (bottom, top)
        } else {
            (top, bottom)
        };
        self.y = y;
        self.b = b;
        self.h = b - y;
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        let x = self.x.saturating_add(dx).min(i32::MAX - self.w);
        let y = self.y.saturating_add(dy).min(i32::MAX - self.h);
        Rect::new(x, y, self.w, self.h)
    }

    /// Shift the rectangle back inside `[0, width] x [0, height]` without
    /// changing its size. Left/top win when the rectangle is larger than the
    /// bounds.
    pub fn clamp_within(&self, width: i32, height: i32) -> Rect {
        let mut x = self.x;
        let mut y = self.y;
        if x < 0 {
            x = 0;
        } else if x + self.w > width {
            x = width - self.w;
        }
        if y < 0 {
            y = 0;
        } else if y + self.h > height {
            y = height - self.h;
        }
        Rect::new(x, y, self.w, self.h)
    }

    /// Strict containment: points on an edge are outside
    pub fn contains_point(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.r && p.y > self.y && p.y < self.b
    }

    /// Whether the rectangle lies within `[0, width] x [0, height]`
    pub fn is_within(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.r <= width && self.b <= height
    }

    /// Convert to dimensions (NonZeroU32 width and height)
    pub fn dimensions(self) -> Option<RectDimension> {
        let width = NonZeroU32::new(self.w.unsigned_abs())?;
        let height = NonZeroU32::new(self.h.unsigned_abs())?;
        Some(RectDimension { width, height })
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    /// Get the width as u32
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    /// Get the height as u32
    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(rect: Rect) {
        assert_eq!(rect.r(), rect.x() + rect.w());
        assert_eq!(rect.b(), rect.y() + rect.h());
        assert!(rect.w() >= 0 && rect.h() >= 0);
    }

    #[test]
    fn from_edges_sorts_each_axis() {
        let rect = Rect::from_edges(150, 20, 50, 120);
        assert_eq!(rect, Rect::new(50, 20, 100, 100));
        assert_consistent(rect);
    }

    #[test]
    fn set_horizontal_flips_crossed_edges() {
        let mut rect = Rect::new(50, 50, 100, 70);
        rect.set_horizontal(50, 40);
        assert_eq!((rect.x(), rect.r(), rect.w()), (40, 50, 10));
        assert_eq!((rect.y(), rect.b()), (50, 120));
        assert_consistent(rect);
    }

    #[test]
    fn contains_point_excludes_edges() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains_point(Point::new(11, 11)));
        assert!(!rect.contains_point(Point::new(10, 15)));
        assert!(!rect.contains_point(Point::new(30, 15)));
        assert!(!rect.contains_point(Point::new(15, 30)));
    }

    #[test]
    fn clamp_within_keeps_size() {
        let rect = Rect::new(-20, 590, 100, 50).clamp_within(800, 600);
        assert_eq!(rect, Rect::new(0, 550, 100, 50));
        assert_consistent(rect);

        let rect = Rect::new(750, -5, 100, 50).clamp_within(800, 600);
        assert_eq!(rect, Rect::new(700, 0, 100, 50));
    }

    #[test]
    fn dimensions_reject_zero_area() {
        assert!(Rect::new(5, 5, 0, 10).dimensions().is_none());
        assert!(Rect::new(5, 5, 10, 0).dimensions().is_none());
        let dim = Rect::new(5, 5, 10, 4).dimensions().unwrap();
        assert_eq!((dim.width(), dim.height()), (10, 4));
    }

    #[test]
    fn extreme_offsets_saturate() {
        let far = Point::new(i32::MAX, i32::MIN);
        assert_eq!(far.delta(Point::new(-10, 10)), (i32::MAX, i32::MIN));

        let moved = Rect::new(10, 10, 30, 20).translate(i32::MAX, i32::MIN);
        assert_eq!((moved.w(), moved.h()), (30, 20));
        assert_eq!(moved.r(), i32::MAX);
        assert_eq!(moved.clamp_within(200, 150), Rect::new(170, 0, 30, 20));
    }
}
