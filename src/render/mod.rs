//! Overlay rendering module
//!
//! This module contains:
//! - Geometry calculations for handles, arrows and ellipses
//! - Pixmap drawing using tiny-skia

pub mod geometry;
pub mod image;
