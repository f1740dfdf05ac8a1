//! Headless replay of a scripted capture session
//!
//! A desktop image stands in for the screens. Every display gets a capture
//! view cropped from it, the script's pointer, key and toolbar steps are fed
//! to those views, and actions flow through a real [`ScreenCapture`] until
//! the session ends.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;
use serde::Deserialize;

use crate::capture::image::{ImageSource, parse_data_url};
use crate::config::SnapmarkConfig;
use crate::domain::{Bounds, Display};
use crate::editor::{ExtractedImage, NullSurface, PointerEvent};
use crate::session::messages::{CaptureAction, TakeScreen, ToolbarAction};
use crate::session::orchestrator::{CaptureEvent, CaptureWindow, Platform, ScreenCapture};
use crate::session::shortcuts::{Key, MouseButton};
use crate::session::view::{CaptureView, ImageSink, ScreenSource, SourceInfo};

/// Script driving a replay, read from JSON
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    /// Displays laid out over the desktop image; one covering it when empty
    #[serde(default)]
    pub displays: Vec<Display>,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

/// One input step. `screen` names the target display, the first one when
/// omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum ReplayStep {
    Pointer {
        #[serde(default)]
        screen: Option<String>,
        event: PointerEvent,
    },
    Button {
        #[serde(default)]
        screen: Option<String>,
        button: MouseButton,
    },
    Key {
        #[serde(default)]
        screen: Option<String>,
        key: Key,
    },
    Toolbar {
        #[serde(default)]
        screen: Option<String>,
        action: ToolbarAction,
    },
}

impl ReplayStep {
    fn screen(&self) -> Option<&str> {
        match self {
            ReplayStep::Pointer { screen, .. }
            | ReplayStep::Button { screen, .. }
            | ReplayStep::Key { screen, .. }
            | ReplayStep::Toolbar { screen, .. } => screen.as_deref(),
        }
    }
}

enum WindowMessage {
    TakeScreen(TakeScreen),
    Action(CaptureAction),
}

type Inbox = Sender<(String, WindowMessage)>;

struct ReplayWindow {
    id: String,
    inbox: Inbox,
}

impl ReplayWindow {
    fn post(&self, message: WindowMessage) -> anyhow::Result<()> {
        self.inbox
            .send((self.id.clone(), message))
            .map_err(|_| anyhow::anyhow!("window {} is gone", self.id))
    }
}

impl CaptureWindow for ReplayWindow {
    fn send_take_screen(&mut self, screen: &TakeScreen) -> anyhow::Result<()> {
        self.post(WindowMessage::TakeScreen(screen.clone()))
    }

    fn send_action(&mut self, action: &CaptureAction) -> anyhow::Result<()> {
        self.post(WindowMessage::Action(action.clone()))
    }

    fn set_full_screen(&mut self, full_screen: bool) -> anyhow::Result<()> {
        log::debug!("window {} full screen: {}", self.id, full_screen);
        Ok(())
    }

    fn show(&mut self) -> anyhow::Result<()> {
        log::debug!("window {} shown", self.id);
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        log::debug!("window {} closed", self.id);
        Ok(())
    }
}

struct ReplayPlatform {
    displays: Vec<Display>,
    inbox: Inbox,
}

impl Platform for ReplayPlatform {
    type Window = ReplayWindow;

    fn displays(&self) -> Vec<Display> {
        self.displays.clone()
    }

    fn create_window(&mut self, display: &Display) -> anyhow::Result<ReplayWindow> {
        Ok(ReplayWindow {
            id: display.screen_id(),
            inbox: self.inbox.clone(),
        })
    }

    fn write_clipboard(&mut self, data_url: &str) -> anyhow::Result<()> {
        log::debug!("clipboard <- {} bytes of data URL", data_url.len());
        Ok(())
    }
}

/// Crops each display's area out of the desktop image
struct DesktopSource {
    desktop: Rc<RgbaImage>,
    displays: Vec<Display>,
}

impl DesktopSource {
    fn origin(&self) -> (i32, i32) {
        self.displays.iter().fold((i32::MAX, i32::MAX), |(x, y), d| {
            (x.min(d.bounds.x), y.min(d.bounds.y))
        })
    }
}

impl ScreenSource for DesktopSource {
    async fn sources(&mut self) -> anyhow::Result<Vec<SourceInfo>> {
        Ok(self
            .displays
            .iter()
            .enumerate()
            .map(|(index, display)| SourceInfo {
                id: format!("screen:{index}"),
                display_id: Some(display.screen_id()),
            })
            .collect())
    }

    async fn grab(
        &mut self,
        source: &SourceInfo,
        _width: u32,
        _height: u32,
    ) -> anyhow::Result<ImageSource> {
        let display = self
            .displays
            .iter()
            .find(|d| source.display_id.as_deref() == Some(d.screen_id().as_str()))
            .with_context(|| format!("unknown source {}", source.id))?;
        let (ox, oy) = self.origin();
        let Bounds {
            x,
            y,
            width,
            height,
        } = display.bounds;
        let frame = image::imageops::crop_imm(
            &*self.desktop,
            (x - ox).max(0) as u32,
            (y - oy).max(0) as u32,
            width.max(0) as u32,
            height.max(0) as u32,
        )
        .to_image();
        Ok(ImageSource::Rgba(frame))
    }
}

/// Saves go to the replay output
struct ReplaySink {
    output: PathBuf,
}

impl ImageSink for ReplaySink {
    fn write_clipboard(&mut self, image: &ExtractedImage) -> anyhow::Result<()> {
        log::debug!("clipboard <- {}x{} capture", image.width, image.height);
        Ok(())
    }

    async fn choose_save_path(&mut self, _suggested: Option<PathBuf>) -> Option<PathBuf> {
        Some(self.output.clone())
    }
}

type ReplayView = CaptureView<NullSurface, ReplaySink>;

/// Deliver queued actions and relays until everything is quiet
fn pump(
    capture: &mut ScreenCapture<ReplayPlatform>,
    actions: &Receiver<CaptureAction>,
    inbox: &Receiver<(String, WindowMessage)>,
    views: &mut [ReplayView],
) {
    loop {
        capture.drain(actions);
        let mut delivered = false;
        while let Ok((id, message)) = inbox.try_recv() {
            delivered = true;
            let WindowMessage::Action(action) = message else {
                continue;
            };
            if let Some(view) = views.iter_mut().find(|v| v.screen().id == id) {
                view.handle_action(&action);
            }
        }
        if !delivered && actions.is_empty() {
            break;
        }
    }
}

/// Run `script` over `desktop` and return how the session ended.
///
/// A completed capture is written to `output` as PNG.
pub async fn replay(
    desktop: RgbaImage,
    script: ReplayScript,
    output: &Path,
    config: SnapmarkConfig,
) -> anyhow::Result<CaptureEvent> {
    let displays = if script.displays.is_empty() {
        vec![Display {
            id: 0,
            scale_factor: 1.0,
            bounds: Bounds {
                x: 0,
                y: 0,
                width: desktop.width() as i32,
                height: desktop.height() as i32,
            },
        }]
    } else {
        script.displays.clone()
    };

    let (inbox_tx, inbox_rx) = crossbeam_channel::unbounded();
    let (action_tx, action_rx) = crossbeam_channel::unbounded();
    let platform = ReplayPlatform {
        displays: displays.clone(),
        inbox: inbox_tx,
    };
    let mut capture = ScreenCapture::new(platform, config.add_to_clipboard);
    let outcomes = capture.events();
    capture.handle_action(CaptureAction::Start);

    let screens: Vec<TakeScreen> = inbox_rx
        .try_iter()
        .filter_map(|(_, message)| match message {
            WindowMessage::TakeScreen(screen) => Some(screen),
            WindowMessage::Action(_) => None,
        })
        .collect();

    let desktop = Rc::new(desktop);
    let opening = screens.into_iter().map(|screen| {
        let mut source = DesktopSource {
            desktop: desktop.clone(),
            displays: displays.clone(),
        };
        let sink = ReplaySink {
            output: output.to_path_buf(),
        };
        let actions = action_tx.clone();
        let config = config.clone();
        async move {
            CaptureView::open(screen, &mut source, NullSurface, sink, actions, config).await
        }
    });
    let mut views: Vec<ReplayView> = futures::future::join_all(opening)
        .await
        .into_iter()
        .filter_map(|view| view.ok())
        .collect();
    pump(&mut capture, &action_rx, &inbox_rx, &mut views);

    for (index, step) in script.steps.into_iter().enumerate() {
        if !capture.is_active() {
            log::debug!("session ended before step {}", index);
            break;
        }
        let view = match step.screen() {
            Some(id) => views.iter_mut().find(|v| v.screen().id == id),
            None => views.first_mut(),
        };
        let Some(view) = view else {
            log::warn!("step {} targets a display without a view", index);
            continue;
        };
        match step {
            ReplayStep::Pointer { event, .. } => view.handle_pointer(event),
            ReplayStep::Button { button, .. } => {
                view.handle_button_press(button);
            }
            ReplayStep::Key { key, .. } => view.handle_key(&key),
            ReplayStep::Toolbar { action, .. } => {
                if let Err(err) = view.handle_toolbar(action).await {
                    log::error!("toolbar {:?} failed: {:?}", action, err);
                }
            }
        }
        pump(&mut capture, &action_rx, &inbox_rx, &mut views);
    }

    let outcome = outcomes
        .try_recv()
        .context("script ended before the capture finished")?;
    if let CaptureEvent::Capture {
        data_url,
        path: None,
    } = &outcome
    {
        let png = parse_data_url(data_url)?;
        std::fs::write(output, png).with_context(|| format!("writing {}", output.display()))?;
    }
    Ok(outcome)
}

/// Load the inputs, replay, and report where the capture went
pub async fn run(image: &Path, script: &Path, output: &Path) -> anyhow::Result<()> {
    let config = SnapmarkConfig::load();
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("reading script {}", script.display()))?;
    let script: ReplayScript = serde_json::from_str(&text).context("parsing replay script")?;

    let source = ImageSource::Path(image.to_path_buf());
    let desktop = tokio::task::spawn_blocking(move || source.decode())
        .await?
        .with_context(|| format!("loading {}", image.display()))?;

    match replay(desktop, script, output, config).await? {
        CaptureEvent::Capture { path, .. } => {
            let path = path.unwrap_or_else(|| output.to_path_buf());
            println!("{}", path.display());
            Ok(())
        }
        CaptureEvent::Cancel => anyhow::bail!("capture was cancelled"),
        CaptureEvent::Error(error) => anyhow::bail!("capture failed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn desktop() -> RgbaImage {
        RgbaImage::from_fn(300, 100, |x, _| {
            if x < 200 {
                Rgba([200, 10, 10, 255])
            } else {
                Rgba([10, 10, 200, 255])
            }
        })
    }

    fn script(json: &str) -> ReplayScript {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn enter_completes_and_writes_the_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let script = script(
            r#"{"steps": [
                {"step": "pointer", "event": {"down": {"x": 20, "y": 20}}},
                {"step": "pointer", "event": {"move": {"x": 80, "y": 60}}},
                {"step": "pointer", "event": {"up": {"x": 80, "y": 60}}},
                {"step": "key", "key": "enter"}
            ]}"#,
        );

        let outcome = replay(desktop(), script, &output, SnapmarkConfig::default())
            .await
            .unwrap();
        assert!(matches!(outcome, CaptureEvent::Capture { path: None, .. }));

        let written = image::open(&output).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (60, 40));
        assert_eq!(written.get_pixel(30, 20), &Rgba([200, 10, 10, 255]));
    }

    #[tokio::test]
    async fn second_display_is_cropped_from_the_desktop() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let script = script(
            r#"{
                "displays": [
                    {"id": 1, "scaleFactor": 1.0, "bounds": {"x": 0, "y": 0, "width": 200, "height": 100}},
                    {"id": 2, "scaleFactor": 1.0, "bounds": {"x": 200, "y": 0, "width": 100, "height": 100}}
                ],
                "steps": [
                    {"step": "pointer", "screen": "2", "event": {"down": {"x": 10, "y": 10}}},
                    {"step": "pointer", "screen": "2", "event": {"move": {"x": 60, "y": 50}}},
                    {"step": "pointer", "screen": "2", "event": {"up": {"x": 60, "y": 50}}},
                    {"step": "pointer", "screen": "1", "event": {"down": {"x": 10, "y": 10}}},
                    {"step": "pointer", "screen": "1", "event": {"move": {"x": 90, "y": 90}}},
                    {"step": "toolbar", "screen": "2", "action": "save"}
                ]
            }"#,
        );

        let outcome = replay(desktop(), script, &output, SnapmarkConfig::default())
            .await
            .unwrap();
        match outcome {
            CaptureEvent::Capture { path, .. } => assert_eq!(path, Some(output.clone())),
            other => panic!("unexpected {other:?}"),
        }
        let written = image::open(&output).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (50, 40));
        assert_eq!(written.get_pixel(25, 20), &Rgba([10, 10, 200, 255]));
    }

    #[tokio::test]
    async fn right_click_cancels() {
        let dir = tempfile::tempdir().unwrap();
        let script = script(r#"{"steps": [{"step": "button", "button": "right"}]}"#);
        let outcome = replay(
            desktop(),
            script,
            &dir.path().join("out.png"),
            SnapmarkConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, CaptureEvent::Cancel);
    }

    #[tokio::test]
    async fn unfinished_scripts_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = replay(
            desktop(),
            ReplayScript::default(),
            &dir.path().join("out.png"),
            SnapmarkConfig::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
