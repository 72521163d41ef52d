use rand::Rng;

use super::line_input::LineInput;
use super::mixture::{MixtureOutput, sigmoid};
use super::params::{LstmLayer, ModelParams};
use super::sampler;
use super::state::{GenerationState, LstmState};
use crate::alphabet::CharSequence;
use crate::error::{HandError, HandResult};
use crate::stroke::StrokeSequence;

/// Attention-conditioned mixture-density stroke generator.
///
/// # Responsibilities
/// - Run one recurrent step: LSTM stack, attention window, output mixture
/// - Warm the state on a style record (priming)
/// - Generate a full line with an explicit termination predicate and a step ceiling
///
/// A `Generator` only borrows the parameters, so any number of them can run
/// on different threads over the same shared model.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
	params: &'a ModelParams,
}

impl<'a> Generator<'a> {
	pub fn new(params: &'a ModelParams) -> Self {
		Self { params }
	}

	/// Fresh state: zero recurrent vectors, window at position 0, previous
	/// point at the origin with the pen lifted.
	pub fn initial_state(&self) -> GenerationState {
		let config = &self.params.config;
		GenerationState::new(config.layers, config.lstm_size, config.attention_mixtures, config.alphabet_size)
	}

	/// Feeds `state.previous()` through the network, updating the recurrent
	/// layers and the attention window. Produces no output.
	///
	/// # Notes
	/// - Layer 1 reads `[window_prev, point]`.
	/// - The window is then moved using `[window_prev, point, h1]`.
	/// - Layers above read `[point, h_below, window]`.
	pub fn forward(&self, state: &mut GenerationState, chars: &CharSequence) {
		let config = &self.params.config;
		let point = state.previous().as_input();

		let mut input: Vec<f32> = Vec::with_capacity(config.attention_input_size());
		input.extend_from_slice(state.alignment.window());
		input.extend_from_slice(&point);
		lstm_step(&self.params.layers[0], &mut state.layers[0], &input, config.forget_bias);

		input.extend_from_slice(&state.layers[0].h);
		let mut attention = self.params.attention.forward(&input);
		attention.iter_mut().for_each(|a| *a = softplus(*a));
		state.alignment.advance(&attention, chars.indices(), config.kappa_scale);

		for l in 1..config.layers {
			input.clear();
			input.extend_from_slice(&point);
			input.extend_from_slice(&state.layers[l - 1].h);
			input.extend_from_slice(state.alignment.window());
			lstm_step(&self.params.layers[l], &mut state.layers[l], &input, config.forget_bias);
		}
	}

	/// Predicted distribution of the next point, from the top layer's output.
	pub fn output(&self, state: &GenerationState, bias: f32) -> MixtureOutput {
		let top = &state.layers[self.params.config.layers - 1];
		let raw = self.params.output.forward(&top.h);
		MixtureOutput::from_raw(&raw, self.params.config.output_mixtures, bias)
	}

	/// One generation step: forward pass then output distribution.
	///
	/// The caller samples from the result and pushes the sampled point into
	/// `state` before the next step.
	pub fn step(&self, state: &mut GenerationState, chars: &CharSequence, bias: f32) -> MixtureOutput {
		self.forward(state, chars);
		self.output(state, bias)
	}

	/// Replays the priming strokes through the network (outputs discarded).
	///
	/// Leaves the last priming point as `state.previous()` so that free
	/// generation continues where the sample ended.
	pub fn prime(&self, state: &mut GenerationState, chars: &CharSequence, input: &LineInput) {
		if let Some(record) = input.prime {
			for &point in record.strokes() {
				self.forward(state, chars);
				state.push(point);
			}
		}
	}

	/// Generates one line of strokes.
	///
	/// # Parameters
	/// - `input`: encoded text, optional priming record, bias and step ceiling.
	/// - `rng`: randomness source; the same seed gives the same strokes.
	///
	/// # Returns
	/// Only the freely generated points; priming points are not included.
	///
	/// # Errors
	/// `GenerationTimeout` when the window has not read the whole text after
	/// `input.max_steps()` points.
	#[tracing::instrument(level = "debug", skip_all, fields(line = input.line))]
	pub fn generate<R: Rng + ?Sized>(&self, input: &LineInput, rng: &mut R) -> HandResult<StrokeSequence> {
		let chars = input.attended();
		let mut state = self.initial_state();
		self.prime(&mut state, &chars, input);

		let mut strokes = Vec::new();
		for _ in 0..input.max_steps() {
			let mixture = self.step(&mut state, &chars, input.bias());
			let point = sampler::sample(&mixture, rng);
			state.push(point);
			strokes.push(point);

			if state.alignment().is_finished(chars.len(), point.pen) {
				tracing::debug!(points = strokes.len(), location = state.alignment().location(), "line finished");
				return Ok(strokes);
			}
		}

		tracing::warn!(line = input.line, steps = input.max_steps(), "alignment did not reach the end of the text");
		Err(HandError::GenerationTimeout { line: input.line, steps: input.max_steps() })
	}
}

/// Standard LSTM update with gates in `i, j, f, o` order.
fn lstm_step(layer: &LstmLayer, state: &mut LstmState, input: &[f32], forget_bias: f32) {
	let hidden = state.h.len();
	let mut joined = Vec::with_capacity(input.len() + hidden);
	joined.extend_from_slice(input);
	joined.extend_from_slice(&state.h);
	let gates = layer.gates.forward(&joined);

	let (i, rest) = gates.split_at(hidden);
	let (j, rest) = rest.split_at(hidden);
	let (f, o) = rest.split_at(hidden);

	for u in 0..hidden {
		state.c[u] = state.c[u] * sigmoid(f[u] + forget_bias) + sigmoid(i[u]) * j[u].tanh();
		state.h[u] = sigmoid(o[u]) * state.c[u].tanh();
	}
}

fn softplus(x: f32) -> f32 {
	x.max(0.0) + (-x.abs()).exp().ln_1p()
}
