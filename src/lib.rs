//! Region capture with selection handles and simple markup
//!
//! A capture session opens one [`session::view::CaptureView`] per display.
//! Each view runs an [`editor::CaptureEditor`] over a frozen frame of its
//! display; the [`session::orchestrator::ScreenCapture`] ties the views
//! together and reports the finished image.

pub mod capture;
pub mod config;
pub mod core;
pub mod domain;
pub mod editor;
pub mod render;
pub mod session;
