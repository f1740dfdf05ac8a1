//! Main-process side of a capture session
//!
//! [`ScreenCapture`] opens one capture window per display, routes the
//! actions those windows send and reports the outcome as [`CaptureEvent`]s.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender};

use super::messages::{CaptureAction, TakeScreen};
use crate::domain::Display;

/// A full-screen capture window hosting one [`super::view::CaptureView`]
pub trait CaptureWindow {
    /// Hand the window its display once it has loaded
    fn send_take_screen(&mut self, screen: &TakeScreen) -> anyhow::Result<()>;

    /// Relay an action to the window's view
    fn send_action(&mut self, action: &CaptureAction) -> anyhow::Result<()>;

    fn set_full_screen(&mut self, full_screen: bool) -> anyhow::Result<()>;

    fn show(&mut self) -> anyhow::Result<()>;

    fn close(&mut self) -> anyhow::Result<()>;
}

/// Windowing and clipboard services of the host
pub trait Platform {
    type Window: CaptureWindow;

    /// Connected displays in enumeration order
    fn displays(&self) -> Vec<Display>;

    /// Create a hidden, frameless, always-on-top window covering `display`
    fn create_window(&mut self, display: &Display) -> anyhow::Result<Self::Window>;

    /// Put a PNG data URL on the clipboard
    fn write_clipboard(&mut self, data_url: &str) -> anyhow::Result<()>;
}

/// Outcome of a capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Capture {
        data_url: String,
        path: Option<PathBuf>,
    },
    Cancel,
    Error(String),
}

/// Largest physical size across all displays
fn max_physical_size(displays: &[Display]) -> (u32, u32) {
    displays.iter().fold((0, 0), |(w, h), display| {
        let (dw, dh) = display.physical_size();
        (w.max(dw), h.max(dh))
    })
}

pub struct ScreenCapture<P: Platform> {
    platform: P,
    active: bool,
    add_to_clipboard: bool,
    windows: BTreeMap<String, P::Window>,
    displays: BTreeMap<String, Display>,
    tx: Sender<CaptureEvent>,
    rx: Receiver<CaptureEvent>,
}

impl<P: Platform> ScreenCapture<P> {
    pub fn new(platform: P, add_to_clipboard: bool) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            platform,
            active: false,
            add_to_clipboard,
            windows: BTreeMap::new(),
            displays: BTreeMap::new(),
            tx,
            rx,
        }
    }

    /// Session outcomes, in order
    pub fn events(&self) -> Receiver<CaptureEvent> {
        self.rx.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Display ids with an open window
    pub fn window_ids(&self) -> impl Iterator<Item = &str> {
        self.windows.keys().map(String::as_str)
    }

    pub fn display(&self, screen_id: &str) -> Option<&Display> {
        self.displays.get(screen_id)
    }

    /// Start a session. Does nothing while one is already running.
    pub fn take(&mut self) {
        if self.active {
            log::debug!("capture already active");
            return;
        }
        self.active = true;
        self.hide();

        let displays = self.platform.displays();
        let (max_width, max_height) = max_physical_size(&displays);
        for (index, display) in displays.into_iter().enumerate() {
            let id = display.screen_id();
            let mut window = match self.platform.create_window(&display) {
                Ok(window) => window,
                Err(err) => {
                    log::error!("Failed to create capture window for display {}: {:?}", id, err);
                    continue;
                }
            };
            let screen = TakeScreen {
                display: display.clone(),
                max_width,
                max_height,
                id: id.clone(),
                index,
            };
            if let Err(err) = window.send_take_screen(&screen) {
                log::error!("Failed to start capture on display {}: {:?}", id, err);
            }
            self.windows.insert(id.clone(), window);
            self.displays.insert(id, display);
        }
        log::debug!("capture started on {} display(s)", self.windows.len());
    }

    /// Close every capture window. Close failures are ignored.
    pub fn hide(&mut self) {
        for (id, mut window) in std::mem::take(&mut self.windows) {
            if let Err(err) = window.set_full_screen(false) {
                log::debug!("leaving full screen on {} failed: {:?}", id, err);
            }
            if let Err(err) = window.close() {
                log::debug!("closing capture window {} failed: {:?}", id, err);
            }
        }
        self.displays.clear();
    }

    fn emit(&self, event: CaptureEvent) {
        // The receiver lives in `self`, so this cannot fail
        let _ = self.tx.send(event);
    }

    pub fn handle_action(&mut self, action: CaptureAction) {
        log::debug!("capture action {:?}", action);
        match action {
            CaptureAction::Start => self.take(),
            CaptureAction::Complete { url, path } => {
                self.hide();
                if self.add_to_clipboard {
                    if let Err(err) = self.platform.write_clipboard(&url) {
                        log::error!("Failed to copy capture to clipboard: {:?}", err);
                    }
                }
                self.emit(CaptureEvent::Capture {
                    data_url: url,
                    path,
                });
                self.active = false;
            }
            CaptureAction::Select { screen_id } => {
                let relay = CaptureAction::Select { screen_id };
                for (id, window) in &mut self.windows {
                    if let Err(err) = window.send_action(&relay) {
                        log::warn!("Failed to relay selection to {}: {:?}", id, err);
                    }
                }
            }
            CaptureAction::Cancel => {
                self.hide();
                self.active = false;
                self.emit(CaptureEvent::Cancel);
            }
            CaptureAction::Hide => self.hide(),
            CaptureAction::Full { screen_id } => {
                let Some(window) = self.windows.get_mut(&screen_id) else {
                    log::debug!("no capture window for display {}", screen_id);
                    return;
                };
                if let Err(err) = window.set_full_screen(true).and_then(|()| window.show()) {
                    log::error!("Failed to show capture window {}: {:?}", screen_id, err);
                }
            }
            CaptureAction::Error { error } => {
                self.hide();
                self.active = false;
                log::error!("capture failed: {}", error);
                self.emit(CaptureEvent::Error(error));
            }
        }
    }

    /// Handle every action currently queued on `actions`
    pub fn drain(&mut self, actions: &Receiver<CaptureAction>) {
        while let Ok(action) = actions.try_recv() {
            self.handle_action(action);
        }
    }
}
