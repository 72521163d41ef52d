use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::mixture::{Component, MixtureOutput};
use crate::stroke::{PenState, StrokePoint};

/// Draws a concrete stroke point from a predicted distribution.
///
/// - picks a component with probability equal to its weight
/// - draws `(dx, dy)` from that component's bivariate Gaussian
/// - lifts the pen with probability `pen_lift`
///
/// The bias was already folded into `mixture` (see [`MixtureOutput::from_raw`]),
/// so the same `(mixture, rng state)` always yields the same point.
pub fn sample<R: Rng + ?Sized>(mixture: &MixtureOutput, rng: &mut R) -> StrokePoint {
	let component = pick_component(mixture.components(), rng);
	let (dx, dy) = sample_offset(component, rng);
	let pen = if rng.random::<f32>() < mixture.pen_lift() { PenState::Lift } else { PenState::Down };
	StrokePoint::new(dx, dy, pen)
}

/// Weighted random selection by cumulative subtraction.
fn pick_component<'a, R: Rng + ?Sized>(components: &'a [Component], rng: &mut R) -> &'a Component {
	let mut r = rng.random::<f32>();
	let mut fallback = &components[0];
	for component in components {
		if component.weight <= 0.0 {
			continue;
		}
		if r < component.weight {
			return component;
		}
		r -= component.weight;
		fallback = component;
	}

	// Rounding can leave a sliver of `r` after the last bucket.
	fallback
}

fn sample_offset<R: Rng + ?Sized>(c: &Component, rng: &mut R) -> (f32, f32) {
	let z1: f32 = StandardNormal.sample(rng);
	let z2: f32 = StandardNormal.sample(rng);
	let dx = c.mean_x + c.std_x * z1;
	let dy = c.mean_y + c.std_y * (c.correlation * z1 + (1.0 - c.correlation * c.correlation).sqrt() * z2);
	(dx, dy)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn mixture(bias: f32, pen_logit: f32) -> MixtureOutput {
		let raw = vec![
			2.0, 0.0, // weight logits
			0.0, 0.0, 0.0, 0.0, // log-stds
			0.0, 0.0, // correlations
			3.0, -3.0, 1.0, -1.0, // means
			pen_logit,
		];
		MixtureOutput::from_raw(&raw, 2, bias)
	}

	#[test]
	fn same_seed_same_point() {
		let m = mixture(0.0, 0.0);
		let a = sample(&m, &mut StdRng::seed_from_u64(42));
		let b = sample(&m, &mut StdRng::seed_from_u64(42));
		assert_eq!(a, b);
	}

	#[test]
	fn unbiased_samples_vary() {
		let m = mixture(0.0, 0.0);
		let a = sample(&m, &mut StdRng::seed_from_u64(1));
		let b = sample(&m, &mut StdRng::seed_from_u64(2));
		assert_ne!(a, b);
	}

	#[test]
	fn heavy_bias_collapses_on_the_mode() {
		let m = mixture(50.0, -1.0);
		for seed in 0..20 {
			let p = sample(&m, &mut StdRng::seed_from_u64(seed));
			assert!((p.dx - 3.0).abs() < 1e-2, "{p:?}");
			assert!((p.dy - 1.0).abs() < 1e-2, "{p:?}");
			assert_eq!(p.pen, PenState::Down);
		}
	}

	#[test]
	fn extreme_bias_still_picks_the_mode() {
		let m = mixture(f32::MAX, -5.0);
		for seed in 0..20 {
			let p = sample(&m, &mut StdRng::seed_from_u64(seed));
			assert!((p.dx - 3.0).abs() < 1e-2, "{p:?}");
			assert!((p.dy - 1.0).abs() < 1e-2, "{p:?}");
		}
	}

	#[test]
	fn offsets_follow_the_component_spread() {
		// single component at the origin, unit stds, no correlation
		let m = MixtureOutput::from_raw(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -10.0], 1, 0.0);
		let mut rng = StdRng::seed_from_u64(5);
		let n = 4000;
		let (mut vx, mut vy) = (0.0, 0.0);
		for _ in 0..n {
			let p = sample(&m, &mut rng);
			vx += p.dx * p.dx;
			vy += p.dy * p.dy;
		}
		assert!((vx / n as f32 - 1.0).abs() < 0.1);
		assert!((vy / n as f32 - 1.0).abs() < 0.1);
	}

	#[test]
	fn sample_mean_tracks_the_mixture() {
		let m = mixture(0.0, 0.0);
		let mut rng = StdRng::seed_from_u64(9);
		let n = 4000;
		let (mut sx, mut lifts) = (0.0, 0);
		for _ in 0..n {
			let p = sample(&m, &mut rng);
			sx += p.dx;
			lifts += p.pen.is_lift() as usize;
		}
		// weights 0.88 / 0.12 around x = 3 and x = -3
		let expected = 0.8808 * 3.0 - 0.1192 * 3.0;
		assert!((sx / n as f32 - expected).abs() < 0.15);
		assert!((lifts as f32 / n as f32 - 0.5).abs() < 0.05);
	}
}
