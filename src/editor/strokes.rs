//! Annotation stroke state on top of the frozen overlay

use tiny_skia::Pixmap;

use crate::config::ShapeColor;
use crate::domain::{Point, Tool};
use crate::render::image::{fill_arrow, stroke_box, stroke_ellipse, stroke_polyline};

/// Paint for the armed tool, already scaled to physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePaint {
    pub color: ShapeColor,
    pub width: f32,
    pub scale_factor: f32,
}

impl StrokePaint {
    fn physical(&self, p: Point) -> (f32, f32) {
        (p.x as f32 * self.scale_factor, p.y as f32 * self.scale_factor)
    }
}

/// In-progress stroke plus the pixels it draws over.
///
/// Points are logical and relative to the overlay origin.
#[derive(Debug, Default)]
pub struct StrokeState {
    snapshot: Option<Pixmap>,
    start: Option<Point>,
    last: Option<Point>,
}

impl StrokeState {
    /// Remember the overlay as the base for the next strokes
    pub fn arm(&mut self, overlay: &Pixmap) {
        self.snapshot = Some(overlay.clone());
        self.start = None;
        self.last = None;
    }

    pub fn disarm(&mut self) {
        *self = Self::default();
    }

    pub fn is_drawing(&self) -> bool {
        self.start.is_some()
    }

    pub fn begin(&mut self, at: Point) {
        self.start = Some(at);
        self.last = Some(at);
    }

    /// Draw the stroke up to `at` onto the overlay
    pub fn extend(&mut self, tool: Tool, at: Point, overlay: &mut Pixmap, paint: &StrokePaint) {
        let Some(start) = self.start else {
            return;
        };
        if tool.restores_snapshot() {
            self.restore(overlay);
        }
        let from = paint.physical(start);
        let to = paint.physical(at);
        match tool {
            Tool::None => {}
            Tool::Line => {
                let prev = paint.physical(self.last.unwrap_or(start));
                stroke_polyline(overlay, &[prev, to], paint.color, paint.width);
            }
            Tool::Rect => stroke_box(overlay, from, to, paint.color, paint.width),
            Tool::Ellipse => stroke_ellipse(overlay, from, to, paint.color, paint.width),
            Tool::Arrow => fill_arrow(overlay, from, to, paint.color),
        }
        self.last = Some(at);
    }

    /// Finish the stroke and keep it in the snapshot
    pub fn commit(&mut self, overlay: &Pixmap) {
        if self.start.take().is_some() {
            self.snapshot = Some(overlay.clone());
        }
        self.last = None;
    }

    /// Finish the stroke without touching the snapshot
    pub fn abort(&mut self) {
        self.start = None;
        self.last = None;
    }

    fn restore(&self, overlay: &mut Pixmap) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        if snapshot.width() == overlay.width() && snapshot.height() == overlay.height() {
            overlay.data_mut().copy_from_slice(snapshot.data());
        } else {
            *overlay = snapshot.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAINT: StrokePaint = StrokePaint {
        color: ShapeColor::RED,
        width: 4.0,
        scale_factor: 1.0,
    };

    fn painted(pixmap: &Pixmap) -> usize {
        pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
    }

    #[test]
    fn rect_redraw_replaces_previous_shape() {
        let mut overlay = Pixmap::new(100, 100).unwrap();
        let mut strokes = StrokeState::default();
        strokes.arm(&overlay);
        strokes.begin(Point::new(10, 10));

        strokes.extend(Tool::Rect, Point::new(90, 90), &mut overlay, &PAINT);
        assert!(overlay.pixel(90, 50).unwrap().alpha() > 0);

        strokes.extend(Tool::Rect, Point::new(30, 30), &mut overlay, &PAINT);
        assert_eq!(overlay.pixel(90, 50).unwrap().alpha(), 0);
        assert!(overlay.pixel(30, 20).unwrap().alpha() > 0);
    }

    #[test]
    fn line_accumulates_segments() {
        let mut overlay = Pixmap::new(100, 100).unwrap();
        let mut strokes = StrokeState::default();
        strokes.arm(&overlay);
        strokes.begin(Point::new(10, 10));
        strokes.extend(Tool::Line, Point::new(50, 10), &mut overlay, &PAINT);
        strokes.extend(Tool::Line, Point::new(50, 50), &mut overlay, &PAINT);

        assert!(overlay.pixel(30, 10).unwrap().alpha() > 0);
        assert!(overlay.pixel(50, 30).unwrap().alpha() > 0);
    }

    #[test]
    fn committed_strokes_survive_the_next_shape() {
        let mut overlay = Pixmap::new(100, 100).unwrap();
        let mut strokes = StrokeState::default();
        strokes.arm(&overlay);

        strokes.begin(Point::new(10, 10));
        strokes.extend(Tool::Rect, Point::new(40, 40), &mut overlay, &PAINT);
        strokes.commit(&overlay);
        let baked = painted(&overlay);

        strokes.begin(Point::new(60, 60));
        strokes.extend(Tool::Rect, Point::new(90, 90), &mut overlay, &PAINT);
        assert!(overlay.pixel(40, 25).unwrap().alpha() > 0);
        assert!(painted(&overlay) > baked);
    }

    #[test]
    fn aborted_strokes_are_dropped_by_the_next_restore() {
        let mut overlay = Pixmap::new(100, 100).unwrap();
        let mut strokes = StrokeState::default();
        strokes.arm(&overlay);

        strokes.begin(Point::new(10, 10));
        strokes.extend(Tool::Ellipse, Point::new(60, 60), &mut overlay, &PAINT);
        strokes.abort();
        assert!(!strokes.is_drawing());

        strokes.begin(Point::new(80, 80));
        strokes.extend(Tool::Rect, Point::new(90, 90), &mut overlay, &PAINT);
        assert_eq!(overlay.pixel(35, 10).unwrap().alpha(), 0);
    }

    #[test]
    fn moves_without_a_press_draw_nothing() {
        let mut overlay = Pixmap::new(20, 20).unwrap();
        let mut strokes = StrokeState::default();
        strokes.arm(&overlay);
        strokes.extend(Tool::Arrow, Point::new(15, 15), &mut overlay, &PAINT);
        assert_eq!(painted(&overlay), 0);
    }
}
