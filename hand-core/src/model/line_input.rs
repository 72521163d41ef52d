use crate::alphabet::CharSequence;
use crate::error::{HandError, HandResult};
use crate::style::StyleRecord;

/// Input parameters for generating one line of handwriting.
///
/// `LineInput` bundles the already validated text with the sampling
/// parameters that apply to it.
///
/// # Responsibilities
/// - Track the encoded text and the optional priming record
/// - Track the sampling bias (0.0 = raw samples, larger = neater)
/// - Bound the number of generation steps
///
/// # Invariants
/// - `bias` is finite and `>= 0`
/// - `max_steps > 0`
#[derive(Clone, Debug)]
pub struct LineInput<'a> {
	/// Index of the line in the request, used to label errors.
	pub line: usize,

	/// Encoded text to write.
	pub chars: &'a CharSequence,

	/// Style used to prime the network, if any.
	pub prime: Option<&'a StyleRecord>,

	/// Sampling sharpness.
	bias: f32,

	/// Hard ceiling on generated points.
	max_steps: usize,
}

impl<'a> LineInput<'a> {
	/// Creates an unprimed input with a zero bias and a ceiling of
	/// `steps_per_char` points per character.
	pub fn new(line: usize, chars: &'a CharSequence, steps_per_char: usize) -> Self {
		Self {
			line,
			chars,
			prime: None,
			bias: 0.0,
			max_steps: (steps_per_char * chars.char_count()).max(1),
		}
	}

	/// Primes generation with a style record.
	pub fn with_prime(mut self, prime: Option<&'a StyleRecord>) -> Self {
		self.prime = prime;
		self
	}

	/// Sets the bias.
	///
	/// # Errors
	/// `InvalidBias` if the value is negative, infinite or NaN.
	pub fn with_bias(mut self, bias: f32) -> HandResult<Self> {
		if !bias.is_finite() || bias < 0.0 {
			return Err(HandError::InvalidBias { line: self.line, bias });
		}
		self.bias = bias;
		Ok(self)
	}

	/// Overrides the step ceiling.
	pub fn with_max_steps(mut self, max_steps: usize) -> Self {
		self.max_steps = max_steps.max(1);
		self
	}

	/// Returns the sampling bias.
	pub fn bias(&self) -> f32 {
		self.bias
	}

	/// Returns the step ceiling.
	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	/// Text attended while generating: the priming transcription, a space,
	/// then the line, or just the line when unprimed.
	pub fn attended(&self) -> CharSequence {
		match self.prime {
			Some(record) => record.chars().join(self.chars),
			None => self.chars.clone(),
		}
	}
}
