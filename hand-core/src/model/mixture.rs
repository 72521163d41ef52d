use serde::{Deserialize, Serialize};

/// Weights below this are dropped before sampling.
const MIN_WEIGHT: f32 = 0.01;
/// Pen-lift probabilities below this snap to zero.
const MIN_PEN_LIFT: f32 = 0.01;
const MIN_STD: f32 = 1e-4;
const EPS: f32 = 1e-6;

/// One bivariate Gaussian of the output mixture.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Component {
	pub weight: f32,
	pub mean_x: f32,
	pub mean_y: f32,
	pub std_x: f32,
	pub std_y: f32,
	pub correlation: f32,
}

/// Predicted distribution of the next stroke point.
///
/// # Invariants
/// - component weights sum to 1
/// - every std is `> 0`
/// - every correlation is in `(-1, 1)`
/// - `pen_lift` is in `[0, 1)`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MixtureOutput {
	components: Vec<Component>,
	pen_lift: f32,
}

impl MixtureOutput {
	/// Builds the distribution from the raw network output, sharpened by `bias`.
	///
	/// `raw` is laid out as `[weights M | stds 2M | correlations M | means 2M | pen 1]`.
	///
	/// The bias acts like an inverse temperature:
	/// - weight and pen logits are multiplied by `1 + bias`
	/// - log-stds are reduced by `bias`, i.e. stds are scaled by `exp(-bias)`
	///
	/// `bias = 0` leaves the distribution untouched; a large bias collapses it
	/// onto its mode.
	pub fn from_raw(raw: &[f32], mixtures: usize, bias: f32) -> Self {
		debug_assert_eq!(raw.len(), 6 * mixtures + 1);
		let m = mixtures;
		let sharpen = 1.0 + bias;

		let (weight_logits, rest) = raw.split_at(m);
		let (log_stds, rest) = rest.split_at(2 * m);
		let (correlations, rest) = rest.split_at(m);
		let (means, pen) = rest.split_at(2 * m);

		let weights = sharpened_weights(weight_logits, sharpen);

		let components = (0..m)
			.map(|k| Component {
				weight: weights[k],
				mean_x: means[k],
				mean_y: means[m + k],
				std_x: (log_stds[k] - bias).exp().max(MIN_STD),
				std_y: (log_stds[m + k] - bias).exp().max(MIN_STD),
				correlation: correlations[k].tanh().clamp(EPS - 1.0, 1.0 - EPS),
			})
			.collect();

		let mut pen_lift = sigmoid(pen[0] * sharpen).clamp(EPS, 1.0 - EPS);
		if pen_lift < MIN_PEN_LIFT {
			pen_lift = 0.0;
		}

		Self { components, pen_lift }
	}

	pub fn components(&self) -> &[Component] {
		&self.components
	}

	pub fn pen_lift(&self) -> f32 {
		self.pen_lift
	}

	/// The component with the highest weight.
	pub fn mode(&self) -> &Component {
		self.components
			.iter()
			.fold(&self.components[0], |best, c| if c.weight > best.weight { c } else { best })
	}
}

/// `softmax(logits * sharpen)`, small weights dropped, then renormalized.
fn sharpened_weights(logits: &[f32], sharpen: f32) -> Vec<f32> {
	// shift before scaling so a huge `sharpen` cannot overflow
	let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
	let mut weights: Vec<f32> = logits.iter().map(|&l| ((l - max) * sharpen).exp()).collect();
	let total: f32 = weights.iter().sum();
	weights.iter_mut().for_each(|w| *w /= total);

	// The largest weight is at least 1/M, so something always survives.
	weights.iter_mut().filter(|w| **w < MIN_WEIGHT).for_each(|w| *w = 0.0);
	let kept: f32 = weights.iter().sum();
	weights.iter_mut().for_each(|w| *w /= kept);
	weights
}

pub(crate) fn sigmoid(x: f32) -> f32 {
	1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Two components: the first favoured, centred on (1, 0); the second on (0, 1).
	fn raw(pen_logit: f32) -> Vec<f32> {
		vec![
			1.0, 0.0, // weight logits
			0.0, 0.5, 0.0, 0.5, // log-stds x, then y
			0.3, -5.0, // correlations
			1.0, 0.0, 0.0, 1.0, // means x, then y
			pen_logit,
		]
	}

	#[test]
	fn weights_sum_to_one() {
		for bias in [0.0, 0.5, 2.0, 100.0, f32::MAX] {
			let mixture = MixtureOutput::from_raw(&raw(0.0), 2, bias);
			let total: f32 = mixture.components().iter().map(|c| c.weight).sum();
			assert!((total - 1.0).abs() < 1e-5, "bias {bias}: {total}");
		}
	}

	#[test]
	fn stds_and_correlations_stay_in_range() {
		let mixture = MixtureOutput::from_raw(&raw(0.0), 2, 1000.0);
		for c in mixture.components() {
			assert!(c.std_x > 0.0 && c.std_y > 0.0);
			assert!(c.correlation > -1.0 && c.correlation < 1.0);
		}
	}

	#[test]
	fn bias_sharpens_towards_the_mode() {
		let loose = MixtureOutput::from_raw(&raw(0.0), 2, 0.0);
		let tight = MixtureOutput::from_raw(&raw(0.0), 2, 5.0);
		assert!(tight.mode().weight > loose.mode().weight);
		assert!(tight.mode().std_x < loose.mode().std_x);
		assert_eq!(tight.mode().mean_x, 1.0);
	}

	#[test]
	fn extreme_bias_collapses_without_overflow() {
		let mixture = MixtureOutput::from_raw(&raw(-5.0), 2, f32::MAX);
		let weights: Vec<f32> = mixture.components().iter().map(|c| c.weight).collect();
		assert_eq!(weights, vec![1.0, 0.0]);
		assert_eq!(mixture.mode().mean_x, 1.0);
		assert_eq!(mixture.pen_lift(), 0.0);
	}

	#[test]
	fn bias_sharpens_pen_lift() {
		let loose = MixtureOutput::from_raw(&raw(-1.0), 2, 0.0);
		let tight = MixtureOutput::from_raw(&raw(-1.0), 2, 4.0);
		assert!(loose.pen_lift() > 0.2);
		assert_eq!(tight.pen_lift(), 0.0);

		let tight = MixtureOutput::from_raw(&raw(1.0), 2, 4.0);
		assert!(tight.pen_lift() > 0.99);
	}
}
