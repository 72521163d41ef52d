use crate::stroke::{PenState, StrokePoint};

/// Hidden and cell vectors of one LSTM layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LstmState {
	pub h: Vec<f32>,
	pub c: Vec<f32>,
}

impl LstmState {
	pub fn zeros(size: usize) -> Self {
		Self { h: vec![0.0; size], c: vec![0.0; size] }
	}
}

/// Where the attention window currently sits in the attended text.
///
/// Each of the `K` kernels has a location (`kappa`) that only moves forward:
/// it is a running sum of non-negative increments. `phi` holds the window
/// weight of every position `0..=L` (the extra position lies past the
/// terminator), and `window` the resulting soft one-hot character context.
#[derive(Clone, Debug, PartialEq)]
pub struct Alignment {
	kappa: Vec<f32>,
	phi: Vec<f32>,
	window: Vec<f32>,
}

impl Alignment {
	pub fn new(kernels: usize, alphabet_size: usize) -> Self {
		Self {
			kappa: vec![0.0; kernels],
			phi: Vec::new(),
			window: vec![0.0; alphabet_size],
		}
	}

	/// Kernel locations, one per attention kernel.
	pub fn kappa(&self) -> &[f32] {
		&self.kappa
	}

	/// Window weights over positions `0..=L`. Empty before the first step.
	pub fn phi(&self) -> &[f32] {
		&self.phi
	}

	/// Character context fed to the recurrent layers.
	pub fn window(&self) -> &[f32] {
		&self.window
	}

	/// Mean kernel location. Non-decreasing across steps since every kernel is.
	pub fn location(&self) -> f32 {
		self.kappa.iter().sum::<f32>() / self.kappa.len().max(1) as f32
	}

	/// Position receiving the most attention (first one on ties).
	pub fn focus(&self) -> usize {
		let mut best = 0;
		for (u, &p) in self.phi.iter().enumerate() {
			if p > self.phi[best] {
				best = u;
			}
		}
		best
	}

	/// Termination predicate for a text of `len` attended positions
	/// (terminator included).
	///
	/// Finished once the window sits past the terminator, or sits on the
	/// terminator and the last sampled point lifted the pen.
	pub fn is_finished(&self, len: usize, pen: PenState) -> bool {
		if self.phi.is_empty() {
			return false;
		}
		let focus = self.focus();
		focus >= len || (focus + 1 >= len && pen.is_lift())
	}

	/// Moves the window given the softplus-activated `[alpha | beta | kappa_step]`
	/// parameters of this step.
	pub(crate) fn advance(&mut self, params: &[f32], chars: &[u8], kappa_scale: f32) {
		let k = self.kappa.len();
		debug_assert_eq!(params.len(), 3 * k);
		let (alpha, rest) = params.split_at(k);
		let (beta, step) = rest.split_at(k);

		for (kappa, step) in self.kappa.iter_mut().zip(step) {
			*kappa += step / kappa_scale;
		}

		self.phi.clear();
		self.phi.extend((0..=chars.len()).map(|u| {
			let u = u as f32;
			(0..k)
				.map(|i| alpha[i] * (-(self.kappa[i] - u).powi(2) / beta[i].max(0.01)).exp())
				.sum::<f32>()
		}));

		self.window.iter_mut().for_each(|w| *w = 0.0);
		for (&c, &p) in chars.iter().zip(&self.phi) {
			self.window[c as usize] += p;
		}
	}
}

/// Everything that changes while one line is generated.
///
/// Owned by a single generation run, never shared. Dropping it is the only
/// way to restart: a sequence cannot be resumed from another state.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationState {
	pub(crate) layers: Vec<LstmState>,
	pub(crate) alignment: Alignment,
	previous: StrokePoint,
	steps: usize,
}

impl GenerationState {
	pub(crate) fn new(layers: usize, lstm_size: usize, kernels: usize, alphabet_size: usize) -> Self {
		Self {
			layers: (0..layers).map(|_| LstmState::zeros(lstm_size)).collect(),
			alignment: Alignment::new(kernels, alphabet_size),
			previous: StrokePoint::origin(),
			steps: 0,
		}
	}

	pub fn alignment(&self) -> &Alignment {
		&self.alignment
	}

	pub fn layers(&self) -> &[LstmState] {
		&self.layers
	}

	/// Point fed to the network on the next step.
	pub fn previous(&self) -> StrokePoint {
		self.previous
	}

	/// Number of points pushed so far (priming points included).
	pub fn steps(&self) -> usize {
		self.steps
	}

	/// Records the point produced (or replayed) by the last step.
	pub fn push(&mut self, point: StrokePoint) {
		self.previous = point;
		self.steps += 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn softplus_params(alpha: f32, beta: f32, step: f32, k: usize) -> Vec<f32> {
		[vec![alpha; k], vec![beta; k], vec![step; k]].concat()
	}

	#[test]
	fn window_moves_forward() {
		let chars = [5u8, 6, 0];
		let mut alignment = Alignment::new(2, 8);
		assert!(alignment.phi().is_empty());
		assert!(!alignment.is_finished(chars.len(), PenState::Lift));

		let mut last = alignment.location();
		for _ in 0..10 {
			alignment.advance(&softplus_params(1.0, 1.0, 12.5, 2), &chars, 25.0);
			assert!(alignment.location() >= last);
			last = alignment.location();
		}
		assert!((alignment.location() - 5.0).abs() < 1e-4);
		assert_eq!(alignment.phi().len(), chars.len() + 1);
	}

	#[test]
	fn window_weights_follow_the_focused_character() {
		let chars = [5u8, 6, 0];
		let mut alignment = Alignment::new(1, 8);
		alignment.advance(&softplus_params(1.0, 0.5, 25.0, 1), &chars, 25.0);
		assert_eq!(alignment.focus(), 1);
		assert!(alignment.window()[6] > alignment.window()[5]);
		assert_eq!(alignment.window()[7], 0.0);
	}

	#[test]
	fn finishes_past_the_terminator_or_on_it_with_a_lift() {
		let chars = [5u8, 6, 0];
		let mut alignment = Alignment::new(1, 8);
		alignment.advance(&softplus_params(1.0, 0.5, 50.0, 1), &chars, 25.0);
		assert_eq!(alignment.focus(), 2);
		assert!(!alignment.is_finished(chars.len(), PenState::Down));
		assert!(alignment.is_finished(chars.len(), PenState::Lift));

		alignment.advance(&softplus_params(1.0, 0.5, 25.0, 1), &chars, 25.0);
		assert!(alignment.is_finished(chars.len(), PenState::Down));
	}

	#[test]
	fn push_tracks_previous_point() {
		let mut state = GenerationState::new(2, 4, 1, 8);
		assert_eq!(state.previous(), StrokePoint::origin());
		state.push(StrokePoint::new(1.0, 2.0, PenState::Down));
		assert_eq!(state.steps(), 1);
		assert_eq!(state.previous().dx, 1.0);
	}
}
