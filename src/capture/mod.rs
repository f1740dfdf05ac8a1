//! Image capture and processing module
//!
//! This module consolidates:
//! - Background image decoding (data URLs, encoded bytes, files)
//! - PNG encoding and data URL output
//! - Pixmap conversion for the overlay renderer

pub mod image;
