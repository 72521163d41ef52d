use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HandResult;

/// Layout and styling of the rendered document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DrawingConfig {
	/// Vertical distance between two rows, blank rows included.
	pub line_height: f64,
	/// Space kept around the written lines.
	pub margin: f64,
	/// Factor applied to every generated offset before layout.
	pub offset_scale: f64,
	/// Height every line is scaled to, `None` to keep the model's scale.
	pub stroke_height: Option<f64>,
	/// Smooth each pen-down stroke.
	pub denoise: bool,
	/// Remove the overall slant of each line.
	pub align: bool,
	pub default_color: String,
	pub default_width: f32,
}

impl Default for DrawingConfig {
	fn default() -> Self {
		Self {
			line_height: 60.0,
			margin: 20.0,
			offset_scale: 1.5,
			stroke_height: Some(30.0),
			denoise: true,
			align: true,
			default_color: "black".to_owned(),
			default_width: 2.0,
		}
	}
}

/// Settings of a [`Hand`](crate::hand::Hand).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HandConfig {
	/// Longest accepted line, in characters.
	pub max_line_chars: usize,
	/// Step ceiling per character of the line.
	pub steps_per_char: usize,
	/// Accept `""` as an empty row instead of failing with `EmptyLine`.
	pub allow_blank_lines: bool,
	/// Worker threads for line generation, `None` for one per CPU.
	pub threads: Option<usize>,
	pub drawing: DrawingConfig,
}

impl Default for HandConfig {
	fn default() -> Self {
		Self {
			max_line_chars: 75,
			steps_per_char: 40,
			allow_blank_lines: true,
			threads: None,
			drawing: DrawingConfig::default(),
		}
	}
}

impl HandConfig {
	/// Reads a JSON config. Missing fields keep their default.
	pub fn from_path<P: AsRef<Path>>(path: P) -> HandResult<Self> {
		let bytes = std::fs::read(path)?;
		Ok(serde_json::from_slice(&bytes)?)
	}

	/// Number of generation threads to use for `lines` lines.
	pub fn worker_count(&self, lines: usize) -> usize {
		self.threads.unwrap_or_else(num_cpus::get).clamp(1, lines.max(1))
	}
}
