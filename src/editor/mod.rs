//! Interactive region selection and annotation over a frozen screenshot
//!
//! One [`CaptureEditor`] runs per display. The host forwards raw pointer
//! events; the editor hit-tests them, updates the selection, redraws the
//! overlay pixmap and tells the host through its [`Surface`] where to show
//! it. Coordinates are logical pixels until drawing, where they are
//! multiplied by the display scale factor.

pub mod drag;
pub mod error;
pub mod events;
pub mod strokes;
pub mod surface;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tiny_skia::{IntRect, Pixmap};

use crate::capture::image::{
    ImageSource, encode_png, fit_to, pixmap_to_rgba, rgba_to_pixmap, to_data_url,
};
use crate::config::EditorStyle;
use crate::domain::{
    Anchor, CursorHint, Display, Point, Rect, Tool, anchor_centers, hit_test, scaled,
};
use crate::render::image::{blit_region, draw_handles, stroke_border};

pub use drag::{DragState, Gesture};
pub use error::EditorError;
pub use events::{EditorEvent, EventBus, SubscriptionId};
pub use strokes::{StrokePaint, StrokeState};
pub use surface::{NullSurface, OverlayPlacement, Surface};

/// Extra inset applied when cropping the overlay, so the border stays out
const EXTRACT_INSET: i32 = 2;

/// Raw pointer input in logical display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// Pointer left the overlay
    Leave,
}

/// Final cropped capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl ExtractedImage {
    pub fn to_data_url(&self) -> String {
        to_data_url(&self.png)
    }
}

/// Selection and annotation state for one display
pub struct CaptureEditor<S: Surface> {
    surface: S,
    style: EditorStyle,
    scale_factor: f32,
    screen_width: i32,
    screen_height: i32,
    background: Pixmap,
    overlay: Pixmap,
    placement: Option<OverlayPlacement>,
    selection: Option<Rect>,
    drag: Option<DragState>,
    hovered: Option<Anchor>,
    anchors: Option<[Point; 8]>,
    tool: Tool,
    strokes: StrokeState,
    disabled: bool,
    events: EventBus,
}

impl<S: Surface> std::fmt::Debug for CaptureEditor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureEditor")
            .field("selection", &self.selection)
            .field("drag", &self.drag)
            .field("tool", &self.tool)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl<S: Surface> CaptureEditor<S> {
    /// Build an editor over already decoded pixels.
    ///
    /// The background is scaled to the display's physical size if needed.
    pub fn new(
        mut surface: S,
        background: RgbaImage,
        display: &Display,
        style: EditorStyle,
    ) -> Result<Self, EditorError> {
        let (width, height) = display.physical_size();
        let background = fit_to(background, width, height);
        let background =
            rgba_to_pixmap(&background).ok_or(EditorError::Surface { width, height })?;
        let overlay = Pixmap::new(width, height).ok_or(EditorError::Surface { width, height })?;

        surface.show_background(display.bounds.width, display.bounds.height);
        log::debug!(
            "CaptureEditor for display {}: {}x{} @ {}",
            display.id,
            display.bounds.width,
            display.bounds.height,
            display.scale_factor
        );

        Ok(Self {
            surface,
            style,
            scale_factor: display.scale_factor,
            screen_width: display.bounds.width,
            screen_height: display.bounds.height,
            background,
            overlay,
            placement: None,
            selection: None,
            drag: None,
            hovered: None,
            anchors: None,
            tool: Tool::None,
            strokes: StrokeState::default(),
            disabled: false,
            events: EventBus::default(),
        })
    }

    /// Decode the background off the calling task, then build the editor
    pub async fn load(
        surface: S,
        source: ImageSource,
        display: &Display,
        style: EditorStyle,
    ) -> Result<Self, EditorError> {
        let rgba = tokio::task::spawn_blocking(move || source.decode()).await??;
        Self::new(surface, rgba, display, style)
    }

    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn hovered_anchor(&self) -> Option<Anchor> {
        self.hovered
    }

    pub fn active_tool(&self) -> Tool {
        self.tool
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Overlay pixmap, when one is placed
    pub fn overlay(&self) -> Option<&Pixmap> {
        self.placement.map(|_| &self.overlay)
    }

    pub fn placement(&self) -> Option<OverlayPlacement> {
        self.placement
    }

    /// Handle centers published by the last render
    pub fn anchors(&self) -> Option<&[Point; 8]> {
        self.anchors.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn event_channel(&mut self) -> crossbeam_channel::Receiver<EditorEvent> {
        self.events.channel()
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if self.tool.is_drawing() {
            self.handle_stroke(event);
            return;
        }
        match event {
            PointerEvent::Down(p) => self.pointer_down(p),
            PointerEvent::Move(p) => self.pointer_move(p),
            PointerEvent::Up(_) => self.pointer_up(),
            PointerEvent::Leave => {}
        }
    }

    fn pointer_down(&mut self, p: Point) {
        if self.disabled {
            return;
        }
        self.hovered = self.anchor_at(p);
        let gesture = match (self.selection, self.hovered) {
            (None, _) => Gesture::Creating,
            (Some(_), Some(anchor)) => Gesture::Resizing(anchor),
            (Some(rect), None) if rect.contains_point(p) => Gesture::Moving,
            (Some(_), None) => Gesture::Creating,
        };
        log::debug!("pointer down at {:?}: {:?}", p, gesture);
        self.drag = Some(DragState::begin(gesture, p, self.selection));
    }

    fn pointer_move(&mut self, p: Point) {
        if self.disabled {
            return;
        }
        if self.drag.is_some() {
            self.drag_to(p);
        } else {
            self.hover(p);
        }
    }

    fn drag_to(&mut self, p: Point) {
        let threshold = self.style.drag_threshold;
        let (width, height) = (self.screen_width, self.screen_height);
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let started = drag.track(p, threshold);
        if !drag.moved {
            return;
        }
        if started && drag.gesture == Gesture::Creating {
            self.anchors = None;
        }
        let rect = drag.apply(p, width, height);
        self.selection = Some(rect);
        if started {
            self.events.emit(EditorEvent::StartDragging(rect));
        }
        self.events.emit(EditorEvent::Dragging(rect));
        self.render();
    }

    fn hover(&mut self, p: Point) {
        let Some(rect) = self.selection else {
            self.hovered = None;
            return;
        };
        self.hovered = self.anchor_at(p);
        let cursor = match self.hovered {
            Some(anchor) => anchor.edges().cursor,
            None if rect.contains_point(p) => CursorHint::Move,
            None => CursorHint::Auto,
        };
        self.surface.set_cursor(cursor);
        self.events.emit(EditorEvent::Moving);
    }

    fn pointer_up(&mut self) {
        if self.disabled {
            return;
        }
        let Some(drag) = self.drag.take() else {
            return;
        };
        self.events.emit(EditorEvent::PointerReleased);
        if !drag.moved {
            self.events.emit(EditorEvent::EndMoving);
            return;
        }
        log::debug!("selection settled at {:?}", self.selection);
        self.events.emit(EditorEvent::EndDragging);
        self.render();
    }

    fn anchor_at(&self, p: Point) -> Option<Anchor> {
        self.anchors
            .as_ref()
            .and_then(|centers| hit_test(centers, p, self.style.anchor_tolerance))
    }

    fn physical(&self, length: i32) -> f32 {
        length as f32 * self.scale_factor
    }

    /// Redraw the overlay for the current selection
    pub fn render(&mut self) {
        if self.disabled {
            return;
        }
        let Some(rect) = self.selection else {
            self.hide_overlay();
            return;
        };
        let margin = self.style.margin;
        let s = self.scale_factor;
        let placement = OverlayPlacement {
            left: rect.x() - margin,
            top: rect.y() - margin,
            width: rect.w() + 2 * margin,
            height: rect.h() + 2 * margin,
            pixel_width: scaled(rect.w() + 2 * margin, s),
            pixel_height: scaled(rect.h() + 2 * margin, s),
        };
        let Some(mut overlay) = Pixmap::new(placement.pixel_width, placement.pixel_height) else {
            log::error!(
                "Could not allocate {}x{} overlay",
                placement.pixel_width,
                placement.pixel_height
            );
            self.anchors = None;
            self.hide_overlay();
            return;
        };

        let inset = self.physical(margin);
        if let Some(region) = IntRect::from_xywh(
            self.physical(rect.x()).round() as i32,
            self.physical(rect.y()).round() as i32,
            scaled(rect.w(), s),
            scaled(rect.h(), s),
        ) {
            let at = inset.round() as i32;
            blit_region(&self.background, region, &mut overlay, at, at);
        }
        stroke_border(
            &mut overlay,
            inset,
            inset,
            self.physical(rect.w()),
            self.physical(rect.h()),
            self.style.border_width * s,
            self.style.border_color,
        );

        let creating = matches!(self.drag, Some(d) if d.gesture == Gesture::Creating);
        if creating {
            self.anchors = None;
        } else if !self.tool.is_drawing() {
            let centers = anchor_centers(&rect);
            let physical: Vec<(f32, f32)> = centers
                .iter()
                .map(|c| {
                    (
                        self.physical(c.x - rect.x() + margin),
                        self.physical(c.y - rect.y() + margin),
                    )
                })
                .collect();
            draw_handles(
                &mut overlay,
                &physical,
                self.style.handle_radius * s,
                self.style.handle_fill,
                self.style.border_color,
                self.style.border_width * s,
            );
            self.anchors = Some(centers);
        }

        self.overlay = overlay;
        self.placement = Some(placement);
        self.surface.place_overlay(Some(placement));
    }

    fn hide_overlay(&mut self) {
        self.placement = None;
        self.surface.place_overlay(None);
    }

    /// Arm an annotation tool. Freezes the selection for good.
    pub fn enable_tool(&mut self, tool: Tool) {
        if !tool.is_drawing() {
            log::debug!("ignoring request to arm {:?}", tool);
            return;
        }
        log::debug!("arming {:?}", tool);
        self.tool = tool;
        self.render();
        self.disabled = true;
        self.drag = None;
        self.strokes.arm(&self.overlay);
    }

    /// Stop reacting to selection input, e.g. when another display owns it
    pub fn disable(&mut self) {
        self.disabled = true;
        self.drag = None;
    }

    /// Re-allow selection input. Has no effect once a tool is armed.
    pub fn enable(&mut self) {
        if self.tool.is_drawing() {
            log::debug!("selection stays frozen while {:?} is armed", self.tool);
            return;
        }
        self.disabled = false;
    }

    /// Drop the selection and any armed tool
    pub fn reset(&mut self) {
        if self.tool.is_drawing() {
            self.disabled = false;
        }
        self.tool = Tool::None;
        self.strokes.disarm();
        self.anchors = None;
        self.drag = None;
        self.hovered = None;
        self.selection = None;
        self.hide_overlay();
        self.surface.set_cursor(CursorHint::Auto);
        self.events.emit(EditorEvent::Reset);
    }

    fn handle_stroke(&mut self, event: PointerEvent) {
        let Some(placement) = self.placement else {
            return;
        };
        let local = |p: Point| {
            Point::new(
                p.x.saturating_sub(placement.left),
                p.y.saturating_sub(placement.top),
            )
        };
        let inside = |p: Point| {
            (0..placement.width).contains(&p.x) && (0..placement.height).contains(&p.y)
        };
        match event {
            PointerEvent::Down(p) => {
                let at = local(p);
                if inside(at) {
                    self.strokes.begin(at);
                }
            }
            PointerEvent::Move(p) => {
                if !self.strokes.is_drawing() {
                    return;
                }
                let at = local(p);
                if !inside(at) {
                    self.strokes.abort();
                    return;
                }
                let paint = StrokePaint {
                    color: self.style.annotation_color,
                    width: self.style.annotation_width * self.scale_factor,
                    scale_factor: self.scale_factor,
                };
                self.strokes.extend(self.tool, at, &mut self.overlay, &paint);
                self.surface.place_overlay(Some(placement));
            }
            PointerEvent::Up(_) => self.strokes.commit(&self.overlay),
            PointerEvent::Leave => self.strokes.abort(),
        }
    }

    /// Crop the overlay to the selection and encode it as PNG
    pub fn extract_image(&self) -> Option<ExtractedImage> {
        let rect = self.selection?;
        let size = rect.dimensions()?;
        self.placement?;
        let s = self.scale_factor;
        let (width, height) = (scaled(rect.w(), s), scaled(rect.h(), s));
        let mut out = Pixmap::new(width, height)?;
        let offset = self.physical(self.style.margin + EXTRACT_INSET).round() as i32;
        blit_region(
            &self.overlay,
            IntRect::from_xywh(offset, offset, width, height)?,
            &mut out,
            0,
            0,
        );

        match encode_png(&pixmap_to_rgba(&out)) {
            Ok(png) => {
                log::debug!(
                    "extracted {}x{} logical as {}x{} pixels",
                    size.width(),
                    size.height(),
                    width,
                    height
                );
                Some(ExtractedImage { width, height, png })
            }
            Err(err) => {
                log::error!("Failed to encode capture: {}", err);
                None
            }
        }
    }
}
