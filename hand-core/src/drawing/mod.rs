//! From generated offsets to a vector document.

/// Line layout: absolute coordinates, clean-up, normalization, stacking.
pub mod compose;

/// SVG output.
pub mod render;

pub use compose::{Drawing, LineStyle, RenderedLine, compose};
pub use render::{render, save};
