//! Handwriting synthesis library.
//!
//! This crate turns lines of text into handwritten pen strokes and renders
//! them as SVG, including:
//! - A fixed character alphabet and its encoder
//! - A bank of recorded handwriting styles used for priming
//! - An attention-conditioned recurrent mixture-density stroke generator
//! - Seedable sampling with a neatness bias
//! - Line layout and SVG rendering
//!
//! The entry point is [`Hand`]: load it once, then call [`Hand::write`] as
//! many times as needed.
//!
//! ```no_run
//! use hand_core::{Hand, WriteRequest};
//!
//! let hand = Hand::new("./data")?;
//! let request = WriteRequest::new(["Hello, world!"], 0.75, Some(9));
//! hand.write("hello.svg", &request)?;
//! # Ok::<(), hand_core::HandError>(())
//! ```

/// Supported characters and their encoding.
pub mod alphabet;

/// Synthesizer and drawing settings.
pub mod config;

/// Line layout and SVG output.
pub mod drawing;

/// Error type shared by the whole crate.
pub mod error;

/// High-level synthesizer.
pub mod hand;

/// Sequence generation engine.
///
/// Exposes single steps as well as whole-line generation so that the
/// engine can be driven and inspected piece by piece.
pub mod model;

/// Caller-facing request and its validation.
pub mod request;

/// Stroke points and pen states.
pub mod stroke;

/// Priming styles.
pub mod style;

/// I/O utilities (directory listing, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use alphabet::{ALPHABET, CharSequence};
pub use config::{DrawingConfig, HandConfig};
pub use drawing::Drawing;
pub use error::{HandError, HandResult};
pub use hand::Hand;
pub use request::WriteRequest;
pub use stroke::{PenState, StrokePoint, StrokeSequence};
pub use style::{StyleBank, StyleRecord};
