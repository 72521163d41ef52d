/// Result alias used across the crate.
pub type HandResult<T> = Result<T, HandError>;

/// Every failure the synthesis pipeline can report.
///
/// Validation variants (`UnsupportedCharacter`, `LengthMismatch`, `InvalidStyle`,
/// `InvalidBias`, `InvalidWidth`, `LineTooLong`, `EmptyLine`) are raised before
/// any generation work starts. `GenerationTimeout` is raised per line and aborts the whole call.
#[derive(thiserror::Error, Debug)]
pub enum HandError {
	#[error("unsupported character {character:?} in line {line}")]
	UnsupportedCharacter { character: char, line: usize },

	#[error("length mismatch: `{field}` has {found} entries, expected {expected}")]
	LengthMismatch { field: &'static str, expected: usize, found: usize },

	#[error("invalid style {style}: {available} styles available")]
	InvalidStyle { style: usize, available: usize },

	#[error("generation of line {line} did not terminate within {steps} steps")]
	GenerationTimeout { line: usize, steps: usize },

	#[error("line {line} has nothing to write")]
	EmptyLine { line: usize },

	#[error("line {line} has {length} characters, at most {max} are allowed")]
	LineTooLong { line: usize, length: usize, max: usize },

	#[error("invalid bias {bias} for line {line}: must be finite and >= 0")]
	InvalidBias { line: usize, bias: f32 },

	#[error("invalid stroke width {width} for line {line}: must be finite and >= 0")]
	InvalidWidth { line: usize, width: f32 },

	#[error("model error: {0}")]
	Model(String),

	#[error("serialization error: {0}")]
	Serde(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl HandError {
	pub fn model(msg: impl Into<String>) -> Self {
		Self::Model(msg.into())
	}

	pub fn serde(msg: impl Into<String>) -> Self {
		Self::Serde(msg.into())
	}

	/// `true` for errors caused by the caller's input rather than by the engine.
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			Self::UnsupportedCharacter { .. }
				| Self::LengthMismatch { .. }
				| Self::InvalidStyle { .. }
				| Self::EmptyLine { .. }
				| Self::LineTooLong { .. }
				| Self::InvalidBias { .. }
				| Self::InvalidWidth { .. }
		)
	}
}

impl From<postcard::Error> for HandError {
	fn from(err: postcard::Error) -> Self {
		Self::serde(err.to_string())
	}
}

impl From<serde_json::Error> for HandError {
	fn from(err: serde_json::Error) -> Self {
		Self::serde(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_names_the_offending_line() {
		let err = HandError::UnsupportedCharacter { character: 'Q', line: 2 };
		assert!(err.to_string().contains("'Q'"));
		assert!(err.to_string().contains("line 2"));

		let err = HandError::LengthMismatch { field: "biases", expected: 3, found: 2 };
		assert!(err.to_string().contains("`biases`"));
	}

	#[test]
	fn validation_errors_are_classified() {
		assert!(HandError::InvalidStyle { style: 20, available: 13 }.is_validation());
		assert!(HandError::EmptyLine { line: 0 }.is_validation());
		assert!(HandError::InvalidWidth { line: 1, width: -2.0 }.is_validation());
		assert!(!HandError::GenerationTimeout { line: 0, steps: 80 }.is_validation());
		assert!(!HandError::model("shape").is_validation());
	}

	#[test]
	fn io_preserves_source() {
		let err = HandError::from(std::io::Error::other("boom"));
		assert!(err.to_string().contains("boom"));
	}
}
