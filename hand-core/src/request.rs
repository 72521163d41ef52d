use serde::{Deserialize, Serialize};

use crate::alphabet::CharSequence;
use crate::config::HandConfig;
use crate::drawing::LineStyle;
use crate::error::{HandError, HandResult};
use crate::style::StyleBank;

/// Everything a caller asks for in one document.
///
/// `biases` must have one entry per line; the optional arrays too when given.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WriteRequest {
	pub lines: Vec<String>,
	pub biases: Vec<f32>,
	#[serde(default)]
	pub styles: Option<Vec<Option<usize>>>,
	#[serde(default)]
	pub stroke_colors: Option<Vec<String>>,
	#[serde(default)]
	pub stroke_widths: Option<Vec<f32>>,
	/// Seed of the per-line random generators, random when absent.
	#[serde(default)]
	pub seed: Option<u64>,
}

/// A line that passed validation.
#[derive(Clone, Debug)]
pub(crate) struct ValidLine {
	pub index: usize,
	/// `None` for a blank row.
	pub chars: Option<CharSequence>,
	pub bias: f32,
	pub style: Option<usize>,
}

impl WriteRequest {
	/// Lines with a shared bias and style.
	pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>, bias: f32, style: Option<usize>) -> Self {
		let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
		let n = lines.len();
		Self {
			lines,
			biases: vec![bias; n],
			styles: Some(vec![style; n]),
			..Self::default()
		}
	}

	pub fn with_colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
		self.stroke_colors = Some(colors.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_widths(mut self, widths: impl IntoIterator<Item = f32>) -> Self {
		self.stroke_widths = Some(widths.into_iter().collect());
		self
	}

	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Checks the whole request before any generation work.
	///
	/// # Errors
	/// In order: `LengthMismatch`, then per line `LineTooLong`,
	/// `UnsupportedCharacter`, `EmptyLine`, `InvalidBias`, `InvalidWidth`,
	/// `InvalidStyle`.
	pub(crate) fn validate(&self, styles: &StyleBank, config: &HandConfig) -> HandResult<Vec<ValidLine>> {
		let n = self.lines.len();
		check_len("biases", n, self.biases.len())?;
		if let Some(s) = &self.styles {
			check_len("styles", n, s.len())?;
		}
		if let Some(c) = &self.stroke_colors {
			check_len("stroke_colors", n, c.len())?;
		}
		if let Some(w) = &self.stroke_widths {
			check_len("stroke_widths", n, w.len())?;
		}

		let mut valid = Vec::with_capacity(n);
		for (index, (text, &bias)) in self.lines.iter().zip(&self.biases).enumerate() {
			let length = text.chars().count();
			if length > config.max_line_chars {
				return Err(HandError::LineTooLong { line: index, length, max: config.max_line_chars });
			}

			let chars = if text.is_empty() {
				if !config.allow_blank_lines {
					return Err(HandError::EmptyLine { line: index });
				}
				None
			} else {
				let chars = CharSequence::encode(text, index)?;
				if text.trim().is_empty() {
					return Err(HandError::EmptyLine { line: index });
				}
				Some(chars)
			};

			if !bias.is_finite() || bias < 0.0 {
				return Err(HandError::InvalidBias { line: index, bias });
			}

			if let Some(width) = self.stroke_widths.as_ref().map(|w| w[index]) {
				if !width.is_finite() || width < 0.0 {
					return Err(HandError::InvalidWidth { line: index, width });
				}
			}

			let style = self.styles.as_ref().and_then(|s| s[index]);
			if let Some(id) = style {
				if !styles.contains(id) {
					return Err(HandError::InvalidStyle { style: id, available: styles.len() });
				}
			}

			valid.push(ValidLine { index, chars, bias, style });
		}
		Ok(valid)
	}

	/// Per-line colour and width, falling back to the configured defaults.
	pub(crate) fn line_styles(&self, config: &HandConfig) -> Vec<LineStyle> {
		(0..self.lines.len())
			.map(|i| LineStyle {
				color: self
					.stroke_colors
					.as_ref()
					.map_or_else(|| config.drawing.default_color.clone(), |c| c[i].clone()),
				width: self.stroke_widths.as_ref().map_or(config.drawing.default_width, |w| w[i]),
			})
			.collect()
	}
}

fn check_len(field: &'static str, expected: usize, found: usize) -> HandResult<()> {
	if expected != found {
		return Err(HandError::LengthMismatch { field, expected, found });
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::style::StyleRecord;

	fn bank() -> StyleBank {
		StyleBank::new(vec![StyleRecord::new(Vec::new(), "a").unwrap(); 3])
	}

	fn validate(request: &WriteRequest) -> HandResult<Vec<ValidLine>> {
		request.validate(&bank(), &HandConfig::default())
	}

	#[test]
	fn accepts_a_well_formed_request() {
		let request = WriteRequest::new(["Hello, world!", "", "second line"], 0.75, Some(2));
		let lines = validate(&request).unwrap();
		assert_eq!(lines.len(), 3);
		assert!(lines[1].chars.is_none());
		assert_eq!(lines[2].style, Some(2));
	}

	#[test]
	fn rejects_mismatched_lengths() {
		let mut request = WriteRequest::new(["a", "b", "c"], 1.0, None);
		request.biases.pop();
		assert!(matches!(
			validate(&request),
			Err(HandError::LengthMismatch { field: "biases", expected: 3, found: 2 })
		));

		let request = WriteRequest::new(["a", "b"], 1.0, None).with_colors(["red"]);
		assert!(matches!(validate(&request), Err(HandError::LengthMismatch { field: "stroke_colors", .. })));
	}

	#[test]
	fn rejects_out_of_range_styles() {
		let request = WriteRequest::new(["a"], 1.0, Some(3));
		assert!(matches!(validate(&request), Err(HandError::InvalidStyle { style: 3, available: 3 })));
	}

	#[test]
	fn rejects_bad_text() {
		let request = WriteRequest::new(["fine", "Quiz"], 1.0, None);
		assert!(matches!(validate(&request), Err(HandError::UnsupportedCharacter { character: 'Q', line: 1 })));

		let request = WriteRequest::new(["a".repeat(76)], 1.0, None);
		assert!(matches!(validate(&request), Err(HandError::LineTooLong { length: 76, .. })));

		let request = WriteRequest::new(["   "], 1.0, None);
		assert!(matches!(validate(&request), Err(HandError::EmptyLine { line: 0 })));
	}

	#[test]
	fn rejects_bad_widths() {
		let request = WriteRequest::new(["a", "b"], 1.0, None).with_widths([1.0, -2.0]);
		assert!(matches!(validate(&request), Err(HandError::InvalidWidth { line: 1, .. })));

		let request = WriteRequest::new(["a"], 1.0, None).with_widths([f32::NAN]);
		assert!(matches!(validate(&request), Err(HandError::InvalidWidth { line: 0, .. })));

		let request = WriteRequest::new(["a"], 1.0, None).with_widths([0.0]);
		assert!(validate(&request).is_ok());
	}

	#[test]
	fn blank_lines_can_be_forbidden() {
		let config = HandConfig { allow_blank_lines: false, ..HandConfig::default() };
		let request = WriteRequest::new(["a", ""], 1.0, None);
		assert!(matches!(request.validate(&bank(), &config), Err(HandError::EmptyLine { line: 1 })));
	}

	#[test]
	fn styles_fall_back_to_defaults() {
		let config = HandConfig::default();
		let request = WriteRequest::new(["a", "b"], 1.0, None);
		let styles = request.line_styles(&config);
		assert_eq!(styles[1].color, "black");
		assert_eq!(styles[1].width, 2.0);

		let styles = request.with_colors(["red", "blue"]).with_widths([1.0, 3.0]).line_styles(&config);
		assert_eq!(styles[1].color, "blue");
		assert_eq!(styles[1].width, 3.0);
	}

	#[test]
	fn deserializes_with_optional_fields() {
		let request: WriteRequest = serde_json::from_str(r#"{ "lines": ["Hi"], "biases": [1.0] }"#).unwrap();
		assert_eq!(request.lines, vec!["Hi"]);
		assert!(request.styles.is_none());
		assert!(request.seed.is_none());
	}
}
