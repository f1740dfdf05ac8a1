//! Per-display capture view
//!
//! Owns one [`CaptureEditor`], keeps the size label and toolbar in step with
//! the selection, and turns toolbar buttons, shortcuts and relayed actions
//! into editor calls and outgoing [`CaptureAction`]s.

use std::path::PathBuf;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};

use super::messages::{CaptureAction, TakeScreen, ToolbarAction};
use super::shortcuts::{Key, MouseButton, Shortcut, handle_button_press, handle_key_event};
use crate::capture::image::ImageSource;
use crate::config::SnapmarkConfig;
use crate::domain::Rect;
use crate::editor::{CaptureEditor, EditorEvent, ExtractedImage, PointerEvent, Surface};

/// One capturable screen as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Handle passed back to [`ScreenSource::grab`]
    pub id: String,
    /// Display this source shows, when known
    pub display_id: Option<String>,
}

/// OS screen capture
#[allow(async_fn_in_trait)]
pub trait ScreenSource {
    async fn sources(&mut self) -> anyhow::Result<Vec<SourceInfo>>;

    /// Grab one frame, at least `width x height` pixels
    async fn grab(
        &mut self,
        source: &SourceInfo,
        width: u32,
        height: u32,
    ) -> anyhow::Result<ImageSource>;
}

/// Where finished captures go besides the action channel
#[allow(async_fn_in_trait)]
pub trait ImageSink {
    fn write_clipboard(&mut self, image: &ExtractedImage) -> anyhow::Result<()>;

    /// Ask where to save; `None` when the user declines
    async fn choose_save_path(&mut self, suggested: Option<PathBuf>) -> Option<PathBuf>;
}

/// Pick the source showing `screen`, else the one at its index
pub fn select_source<'a>(sources: &'a [SourceInfo], screen: &TakeScreen) -> Option<&'a SourceInfo> {
    sources
        .iter()
        .find(|source| source.display_id.as_deref() == Some(screen.id.as_str()))
        .or_else(|| sources.get(screen.index))
}

/// `"w * h"` label near the selection while dragging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeLabel {
    pub text: String,
    pub left: i32,
    pub top: i32,
}

impl SizeLabel {
    pub fn for_selection(rect: Rect) -> Self {
        let top = if rect.y() > 35 {
            rect.y() - 30
        } else {
            rect.y() + 10
        };
        Self {
            text: format!("{} * {}", rect.w(), rect.h()),
            left: rect.x(),
            top,
        }
    }
}

/// Toolbar position, logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarPlacement {
    pub left: i32,
    pub top: i32,
}

impl ToolbarPlacement {
    pub fn below(rect: Rect) -> Self {
        Self {
            left: rect.x(),
            top: rect.b() + 15,
        }
    }
}

/// Host-drawn widgets around the selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chrome {
    pub size_label: Option<SizeLabel>,
    pub toolbar: Option<ToolbarPlacement>,
}

impl Chrome {
    fn dragging(&mut self, rect: Rect) {
        self.toolbar = None;
        self.size_label = Some(SizeLabel::for_selection(rect));
    }

    fn settled(&mut self, rect: Rect) {
        self.toolbar = Some(ToolbarPlacement::below(rect));
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

fn send_action(actions: &Sender<CaptureAction>, screen: &str, action: CaptureAction) {
    if actions.send(action).is_err() {
        log::warn!("action channel closed on display {}", screen);
    }
}

pub struct CaptureView<S: Surface, K: ImageSink> {
    screen: TakeScreen,
    editor: CaptureEditor<S>,
    events: Receiver<EditorEvent>,
    chrome: Chrome,
    actions: Sender<CaptureAction>,
    sink: K,
    config: SnapmarkConfig,
}

impl<S: Surface, K: ImageSink> CaptureView<S, K> {
    /// Grab the display's frame and build its editor.
    ///
    /// Failures are also reported as an `error` action.
    pub async fn open<Src: ScreenSource>(
        screen: TakeScreen,
        source: &mut Src,
        surface: S,
        sink: K,
        actions: Sender<CaptureAction>,
        config: SnapmarkConfig,
    ) -> anyhow::Result<Self> {
        let id = screen.id.clone();
        match Self::try_open(screen, source, surface, sink, actions.clone(), config).await {
            Ok(view) => Ok(view),
            Err(err) => {
                log::error!("capture view failed: {:?}", err);
                send_action(&actions, &id, CaptureAction::error(&err));
                Err(err)
            }
        }
    }

    async fn try_open<Src: ScreenSource>(
        screen: TakeScreen,
        source: &mut Src,
        surface: S,
        sink: K,
        actions: Sender<CaptureAction>,
        config: SnapmarkConfig,
    ) -> anyhow::Result<Self> {
        let sources = source.sources().await.context("listing capture sources")?;
        let selected = select_source(&sources, &screen)
            .with_context(|| format!("no capture source for display {}", screen.id))?;
        let (width, height) = screen.display.physical_size();
        let frame = source
            .grab(selected, width, height)
            .await
            .with_context(|| format!("grabbing display {}", screen.id))?;

        send_action(&actions, &screen.id, CaptureAction::full(screen.id.clone()));

        let mut editor =
            CaptureEditor::load(surface, frame, &screen.display, config.style.clone())
                .await
                .context("loading captured frame")?;
        let events = editor.event_channel();
        log::debug!("capture view ready on display {}", screen.id);

        Ok(Self {
            screen,
            editor,
            events,
            chrome: Chrome::default(),
            actions,
            sink,
            config,
        })
    }

    pub fn screen(&self) -> &TakeScreen {
        &self.screen
    }

    pub fn editor(&self) -> &CaptureEditor<S> {
        &self.editor
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    fn send(&self, action: CaptureAction) {
        send_action(&self.actions, &self.screen.id, action);
    }

    fn sync_chrome(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                EditorEvent::StartDragging(rect) | EditorEvent::Dragging(rect) => {
                    self.chrome.dragging(rect)
                }
                EditorEvent::EndDragging => {
                    if let Some(rect) = self.editor.selection() {
                        self.send(CaptureAction::select(self.screen.id.clone()));
                        self.chrome.settled(rect);
                    }
                }
                EditorEvent::Reset => self.chrome.clear(),
                EditorEvent::EndMoving | EditorEvent::Moving | EditorEvent::PointerReleased => {}
            }
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.editor.handle_pointer(event);
        self.sync_chrome();
    }

    /// Returns `true` when the press was consumed as a shortcut
    pub fn handle_button_press(&mut self, button: MouseButton) -> bool {
        match handle_button_press(button) {
            Some(shortcut) => {
                self.run_shortcut(shortcut);
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: &Key) {
        if let Some(shortcut) = handle_key_event(key, self.editor.selection().is_some()) {
            self.run_shortcut(shortcut);
        }
    }

    fn run_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::Cancel => self.send(CaptureAction::Cancel),
            Shortcut::Complete => self.complete(),
        }
    }

    /// React to an action relayed by the orchestrator
    pub fn handle_action(&mut self, action: &CaptureAction) {
        if let CaptureAction::Select { screen_id } = action {
            if *screen_id != self.screen.id {
                log::debug!("display {} selected, disabling {}", screen_id, self.screen.id);
                self.editor.disable();
            }
        }
    }

    pub async fn handle_toolbar(&mut self, action: ToolbarAction) -> anyhow::Result<()> {
        match action {
            ToolbarAction::Close => self.send(CaptureAction::Cancel),
            ToolbarAction::Ok => self.complete(),
            ToolbarAction::Save => self.save().await?,
            ToolbarAction::Reset => {
                self.editor.reset();
                self.sync_chrome();
            }
            ToolbarAction::Rect
            | ToolbarAction::Line
            | ToolbarAction::Ellipse
            | ToolbarAction::Arrow => {
                if let Some(tool) = action.tool() {
                    self.editor.enable_tool(tool);
                }
            }
        }
        Ok(())
    }

    /// Copy the capture and finish the session
    /// Copy the capture through the sink when `add_to_clipboard` is set and
    /// send `complete`. The orchestrator puts the data URL on the platform
    /// clipboard under the same flag.
    pub fn complete(&mut self) {
        if self.editor.selection().is_none() {
            return;
        }
        let Some(image) = self.editor.extract_image() else {
            log::warn!("nothing to capture on display {}", self.screen.id);
            return;
        };
        if self.config.add_to_clipboard {
            if let Err(err) = self.sink.write_clipboard(&image) {
                log::error!("Failed to copy capture to clipboard: {:?}", err);
            }
        }
        self.send(CaptureAction::complete(image.to_data_url(), None));
    }

    /// Write the capture to a user-chosen file and finish the session
    pub async fn save(&mut self) -> anyhow::Result<()> {
        let Some(image) = self.editor.extract_image() else {
            log::warn!("nothing to save on display {}", self.screen.id);
            return Ok(());
        };
        let url = image.to_data_url();
        let suggested = self.config.default_save_path();
        let Some(path) = self.sink.choose_save_path(suggested).await else {
            self.send(CaptureAction::Cancel);
            return Ok(());
        };

        let png = image.png;
        let result = tokio::task::spawn_blocking(move || -> anyhow::Result<PathBuf> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, png)
                .with_context(|| format!("writing {}", path.display()))?;
            Ok(path)
        })
        .await
        .map_err(anyhow::Error::from)
        .and_then(|result| result);

        match result {
            Ok(path) => {
                log::debug!("capture saved to {}", path.display());
                self.send(CaptureAction::complete(url, Some(path)));
                Ok(())
            }
            Err(err) => {
                self.send(CaptureAction::error(&err));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bounds, Display, Point, Tool};
    use crate::editor::NullSurface;
    use image::{Rgba, RgbaImage};

    struct StaticSource {
        sources: Vec<SourceInfo>,
        frame: RgbaImage,
        grabbed: Option<String>,
    }

    impl ScreenSource for StaticSource {
        async fn sources(&mut self) -> anyhow::Result<Vec<SourceInfo>> {
            Ok(self.sources.clone())
        }

        async fn grab(
            &mut self,
            source: &SourceInfo,
            _width: u32,
            _height: u32,
        ) -> anyhow::Result<ImageSource> {
            self.grabbed = Some(source.id.clone());
            Ok(ImageSource::Rgba(self.frame.clone()))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        clipboard: Vec<ExtractedImage>,
        save_to: Option<PathBuf>,
    }

    impl ImageSink for MemorySink {
        fn write_clipboard(&mut self, image: &ExtractedImage) -> anyhow::Result<()> {
            self.clipboard.push(image.clone());
            Ok(())
        }

        async fn choose_save_path(&mut self, _suggested: Option<PathBuf>) -> Option<PathBuf> {
            self.save_to.clone()
        }
    }

    fn screen(id: &str, index: usize) -> TakeScreen {
        TakeScreen {
            display: Display {
                id: id.parse().unwrap(),
                scale_factor: 1.0,
                bounds: Bounds {
                    x: 0,
                    y: 0,
                    width: 200,
                    height: 150,
                },
            },
            max_width: 200,
            max_height: 150,
            id: id.into(),
            index,
        }
    }

    fn source(id: &str, display_id: Option<&str>) -> SourceInfo {
        SourceInfo {
            id: id.into(),
            display_id: display_id.map(str::to_owned),
        }
    }

    fn static_source() -> StaticSource {
        StaticSource {
            sources: vec![source("screen:0", Some("7")), source("screen:1", Some("8"))],
            frame: RgbaImage::from_pixel(200, 150, Rgba([30, 60, 90, 255])),
            grabbed: None,
        }
    }

    async fn open(
        sink: MemorySink,
    ) -> (
        CaptureView<NullSurface, MemorySink>,
        Receiver<CaptureAction>,
    ) {
        open_with(sink, SnapmarkConfig::default()).await
    }

    async fn open_with(
        sink: MemorySink,
        config: SnapmarkConfig,
    ) -> (
        CaptureView<NullSurface, MemorySink>,
        Receiver<CaptureAction>,
    ) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let view = CaptureView::open(
            screen("8", 1),
            &mut static_source(),
            NullSurface,
            sink,
            tx,
            config,
        )
        .await
        .unwrap();
        (view, rx)
    }

    fn select(view: &mut CaptureView<NullSurface, MemorySink>) {
        view.handle_pointer(PointerEvent::Down(Point::new(50, 50)));
        view.handle_pointer(PointerEvent::Move(Point::new(150, 120)));
        view.handle_pointer(PointerEvent::Up(Point::new(150, 120)));
    }

    #[test]
    fn source_matches_display_then_falls_back_to_index() {
        let sources = vec![source("a", Some("7")), source("b", None)];
        assert_eq!(select_source(&sources, &screen("7", 1)).unwrap().id, "a");
        assert_eq!(select_source(&sources, &screen("9", 1)).unwrap().id, "b");
        assert!(select_source(&sources, &screen("9", 5)).is_none());
    }

    #[test]
    fn size_label_moves_inside_near_the_top() {
        let label = SizeLabel::for_selection(Rect::new(40, 100, 120, 80));
        assert_eq!(label.text, "120 * 80");
        assert_eq!((label.left, label.top), (40, 70));

        let label = SizeLabel::for_selection(Rect::new(40, 35, 10, 10));
        assert_eq!(label.top, 45);
    }

    #[tokio::test]
    async fn open_grabs_the_matching_source_and_requests_full_screen() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut source = static_source();
        let view = CaptureView::open(
            screen("8", 0),
            &mut source,
            NullSurface,
            MemorySink::default(),
            tx,
            SnapmarkConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(source.grabbed.as_deref(), Some("screen:1"));
        assert_eq!(rx.try_recv(), Ok(CaptureAction::full("8")));
        assert_eq!(view.chrome(), &Chrome::default());
    }

    #[tokio::test]
    async fn open_failure_is_reported_as_an_error_action() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut source = StaticSource {
            sources: Vec::new(),
            ..static_source()
        };
        let result = CaptureView::open(
            screen("8", 0),
            &mut source,
            NullSurface,
            MemorySink::default(),
            tx,
            SnapmarkConfig::default(),
        )
        .await;

        assert!(result.is_err());
        match rx.try_recv() {
            Ok(CaptureAction::Error { error }) => {
                assert!(error.contains("no capture source for display 8"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn open_failure_survives_a_closed_channel() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let result = CaptureView::open(
            screen("8", 0),
            &mut StaticSource {
                sources: Vec::new(),
                ..static_source()
            },
            NullSurface,
            MemorySink::default(),
            tx,
            SnapmarkConfig::default(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn finished_drag_selects_and_places_the_toolbar() {
        let (mut view, rx) = open(MemorySink::default()).await;
        rx.try_iter().for_each(drop);

        view.handle_pointer(PointerEvent::Down(Point::new(50, 50)));
        view.handle_pointer(PointerEvent::Move(Point::new(150, 120)));
        assert_eq!(view.chrome().toolbar, None);
        assert_eq!(
            view.chrome().size_label.as_ref().map(|l| l.text.as_str()),
            Some("100 * 70")
        );

        view.handle_pointer(PointerEvent::Up(Point::new(150, 120)));
        assert_eq!(
            view.chrome().toolbar,
            Some(ToolbarPlacement { left: 50, top: 135 })
        );
        assert_eq!(rx.try_recv(), Ok(CaptureAction::select("8")));
    }

    #[tokio::test]
    async fn selection_elsewhere_disables_this_display() {
        let (mut view, _rx) = open(MemorySink::default()).await;
        view.handle_action(&CaptureAction::select("8"));
        assert!(!view.editor().is_disabled());
        view.handle_action(&CaptureAction::select("7"));
        assert!(view.editor().is_disabled());
    }

    #[tokio::test]
    async fn shortcuts_cancel_and_complete() {
        let (mut view, rx) = open(MemorySink::default()).await;
        rx.try_iter().for_each(drop);

        // Enter without a selection does nothing
        view.handle_key(&Key::Enter);
        assert!(rx.try_recv().is_err());

        assert!(view.handle_button_press(MouseButton::Right));
        assert!(!view.handle_button_press(MouseButton::Left));
        assert_eq!(rx.try_recv(), Ok(CaptureAction::Cancel));

        select(&mut view);
        rx.try_iter().for_each(drop);
        view.handle_key(&Key::Enter);
        match rx.try_recv() {
            Ok(CaptureAction::Complete { url, path: None }) => {
                assert!(url.starts_with("data:image/png;base64,"))
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(view.sink().clipboard.len(), 1);
        assert_eq!(view.sink().clipboard[0].width, 100);
    }

    #[tokio::test]
    async fn clipboard_copy_follows_the_config() {
        let config = SnapmarkConfig {
            add_to_clipboard: false,
            ..SnapmarkConfig::default()
        };
        let (mut view, rx) = open_with(MemorySink::default(), config).await;
        select(&mut view);
        rx.try_iter().for_each(drop);

        view.handle_toolbar(ToolbarAction::Ok).await.unwrap();
        assert!(view.sink().clipboard.is_empty());
        assert!(matches!(
            rx.try_recv(),
            Ok(CaptureAction::Complete { path: None, .. })
        ));
    }

    #[tokio::test]
    async fn toolbar_arms_tools_and_resets() {
        let (mut view, _rx) = open(MemorySink::default()).await;
        select(&mut view);

        view.handle_toolbar(ToolbarAction::Ellipse).await.unwrap();
        assert_eq!(view.editor().active_tool(), Tool::Ellipse);

        view.handle_toolbar(ToolbarAction::Reset).await.unwrap();
        assert_eq!(view.editor().selection(), None);
        assert_eq!(view.chrome(), &Chrome::default());
    }

    #[tokio::test]
    async fn save_writes_the_png_and_completes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("shots").join("capture.png");
        let sink = MemorySink {
            save_to: Some(target.clone()),
            ..Default::default()
        };
        let (mut view, rx) = open(sink).await;
        select(&mut view);
        rx.try_iter().for_each(drop);

        view.handle_toolbar(ToolbarAction::Save).await.unwrap();

        let written = image::open(&target).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (100, 70));
        assert_eq!(written.get_pixel(50, 35), &Rgba([30, 60, 90, 255]));
        match rx.try_recv() {
            Ok(CaptureAction::Complete { path, .. }) => assert_eq!(path, Some(target)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn declined_save_cancels() {
        let (mut view, rx) = open(MemorySink::default()).await;
        select(&mut view);
        rx.try_iter().for_each(drop);

        view.handle_toolbar(ToolbarAction::Save).await.unwrap();
        assert_eq!(rx.try_recv(), Ok(CaptureAction::Cancel));
    }
}
