//! Application entry points
//!
//! This module contains:
//! - The scripted headless replay used by the `snapmark-replay` binary

pub mod replay;
