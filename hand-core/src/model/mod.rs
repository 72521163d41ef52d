//! Top-level module for the stroke synthesis network.
//!
//! This module provides the sequence generation engine, including:
//! - Persisted network parameters (`ModelParams`)
//! - Per-line recurrent and alignment state (`GenerationState`)
//! - Per-step output distributions (`MixtureOutput`)
//! - Seedable sampling of stroke points (`sampler`)
//! - Line generation parameters (`LineInput`)
//! - The generation loop itself (`Generator`)

/// Recurrent, attention-conditioned stroke generator.
///
/// Runs single steps, priming, and whole lines with a bounded loop.
pub mod generator;

/// Per-line generation parameters: text, priming record, bias, step ceiling.
pub mod line_input;

/// Mixture-density output of one step and the bias transform.
pub mod mixture;

/// Network shapes and weights, postcard persistence.
pub mod params;

/// Draws stroke points from a mixture with an explicit random source.
pub mod sampler;

/// Explicit per-line state: LSTM vectors, attention window, previous point.
pub mod state;

pub use generator::Generator;
pub use line_input::LineInput;
pub use mixture::{Component, MixtureOutput};
pub use params::{Dense, LstmLayer, ModelConfig, ModelParams};
pub use state::{Alignment, GenerationState, LstmState};
