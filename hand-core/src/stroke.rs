use serde::{Deserialize, Serialize};

/// Pen state attached to a stroke point.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PenState {
	/// The pen keeps drawing towards the next point.
	#[default]
	Down,
	/// The pen lifts after this point; the next point starts a new stroke.
	Lift,
}

impl PenState {
	/// Network encoding: `1.0` for a lift, `0.0` otherwise.
	pub fn as_input(self) -> f32 {
		match self {
			PenState::Down => 0.0,
			PenState::Lift => 1.0,
		}
	}

	pub fn is_lift(self) -> bool {
		self == PenState::Lift
	}
}

/// One generated sample: an offset from the previous point plus a pen state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct StrokePoint {
	pub dx: f32,
	pub dy: f32,
	pub pen: PenState,
}

impl StrokePoint {
	pub fn new(dx: f32, dy: f32, pen: PenState) -> Self {
		Self { dx, dy, pen }
	}

	/// The point every sequence starts from: no movement, pen lifted.
	pub fn origin() -> Self {
		Self::new(0.0, 0.0, PenState::Lift)
	}

	/// Network input vector `[dx, dy, pen]`.
	pub fn as_input(&self) -> [f32; 3] {
		[self.dx, self.dy, self.pen.as_input()]
	}
}

/// Ordered, time-relevant sequence of stroke points.
pub type StrokeSequence = Vec<StrokePoint>;
