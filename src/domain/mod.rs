//! Pure domain types with minimal dependencies
//!
//! Nothing here touches pixels; the editor and renderer consume these types.

pub mod annotation;
pub mod display;
pub mod geometry;
pub mod selection;

pub use annotation::*;
pub use display::*;
pub use geometry::*;
pub use selection::*;
