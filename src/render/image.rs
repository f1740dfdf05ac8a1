//! Pixmap drawing for the selection overlay using tiny-skia
//!
//! These functions draw onto the overlay pixmap in physical pixels.

use tiny_skia::{
    BlendMode, FillRule, IntRect, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

use super::geometry::arrow::ArrowPolygon;
use super::geometry::ellipse::EllipseArcs;
use super::geometry::normalize_rect;
use crate::config::ShapeColor;

fn paint(color: ShapeColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.into());
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Default::default()
    }
}

/// Replace the pixels of `dst` at `(x, y)` with `region` of `src`.
///
/// The region is clipped to `src`; whatever falls outside `dst` is dropped.
pub fn blit_region(src: &Pixmap, region: IntRect, dst: &mut Pixmap, x: i32, y: i32) {
    let Some(clipped) = IntRect::from_xywh(0, 0, src.width(), src.height())
        .and_then(|bounds| bounds.intersect(&region))
    else {
        return;
    };
    let Some(block) = src.clone_rect(clipped) else {
        return;
    };
    let paint = PixmapPaint {
        blend_mode: BlendMode::Source,
        ..PixmapPaint::default()
    };
    dst.draw_pixmap(
        x + (clipped.x() - region.x()),
        y + (clipped.y() - region.y()),
        block.as_ref(),
        &paint,
        Transform::identity(),
        None,
    );
}

/// Stroke the selection border
pub fn stroke_border(
    pixmap: &mut Pixmap,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    width: f32,
    color: ShapeColor,
) {
    let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w.max(0.0), h.max(0.0)) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    pixmap.stroke_path(
        &path,
        &paint(color),
        &stroke(width),
        Transform::identity(),
        None,
    );
}

/// Draw the round resize handles, filled then outlined
pub fn draw_handles(
    pixmap: &mut Pixmap,
    centers: &[(f32, f32)],
    radius: f32,
    fill: ShapeColor,
    outline: ShapeColor,
    outline_width: f32,
) {
    let mut pb = PathBuilder::new();
    for &(cx, cy) in centers {
        pb.push_circle(cx, cy, radius);
    }
    let Some(path) = pb.finish() else {
        return;
    };
    pixmap.fill_path(
        &path,
        &paint(fill),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
    pixmap.stroke_path(
        &path,
        &paint(outline),
        &stroke(outline_width),
        Transform::identity(),
        None,
    );
}

/// Stroke a freehand path through the given points
pub fn stroke_polyline(pixmap: &mut Pixmap, points: &[(f32, f32)], color: ShapeColor, width: f32) {
    let Some((&(x0, y0), rest)) = points.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
}

/// Stroke the axis-aligned box spanned by two corners
pub fn stroke_box(
    pixmap: &mut Pixmap,
    a: (f32, f32),
    b: (f32, f32),
    color: ShapeColor,
    width: f32,
) {
    let (min_x, min_y, max_x, max_y) = normalize_rect(a.0, a.1, b.0, b.1);
    stroke_border(pixmap, min_x, min_y, max_x - min_x, max_y - min_y, width, color);
}

/// Stroke an ellipse fitted to the box spanned by two corners
pub fn stroke_ellipse(
    pixmap: &mut Pixmap,
    a: (f32, f32),
    b: (f32, f32),
    color: ShapeColor,
    width: f32,
) {
    let arcs = EllipseArcs::from_corners(a, b);
    let mut pb = PathBuilder::new();
    pb.move_to(arcs.top.0, arcs.top.1);
    pb.cubic_to(
        arcs.right[0].0,
        arcs.right[0].1,
        arcs.right[1].0,
        arcs.right[1].1,
        arcs.bottom.0,
        arcs.bottom.1,
    );
    pb.cubic_to(
        arcs.left[0].0,
        arcs.left[0].1,
        arcs.left[1].0,
        arcs.left[1].1,
        arcs.top.0,
        arcs.top.1,
    );
    pb.close();
    let Some(path) = pb.finish() else {
        return;
    };
    pixmap.stroke_path(&path, &paint(color), &stroke(width), Transform::identity(), None);
}

/// Fill an arrow from `start` to `tip`
pub fn fill_arrow(pixmap: &mut Pixmap, start: (f32, f32), tip: (f32, f32), color: ShapeColor) {
    let polygon = ArrowPolygon::new(start, tip);
    let points = polygon.points();
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].0, points[0].1);
    for &(x, y) in &points[1..] {
        pb.line_to(x, y);
    }
    pb.close();
    let Some(path) = pb.finish() else {
        return;
    };
    pixmap.fill_path(
        &path,
        &paint(color),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
}
