use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alphabet::CharSequence;
use crate::error::{HandError, HandResult};
use crate::io::{list_files, numeric_stem};
use crate::stroke::{StrokePoint, StrokeSequence};

/// Extension of persisted style records.
pub const STYLE_EXTENSION: &str = "style";

/// Persisted form of a style record: raw strokes plus their transcription.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct StoredStyle {
	strokes: StrokeSequence,
	text: String,
}

/// A recorded handwriting sample used to prime generation.
///
/// # Invariants
/// - `chars` is the encoding of the transcription the strokes were written from
/// - immutable once built
#[derive(Clone, Debug)]
pub struct StyleRecord {
	strokes: StrokeSequence,
	chars: CharSequence,
}

impl StyleRecord {
	/// Builds a record, validating the transcription against the alphabet.
	pub fn new(strokes: StrokeSequence, text: &str) -> HandResult<Self> {
		let chars = CharSequence::encode(text, 0)?;
		Ok(Self { strokes, chars })
	}

	pub fn strokes(&self) -> &[StrokePoint] {
		&self.strokes
	}

	pub fn chars(&self) -> &CharSequence {
		&self.chars
	}

	/// Transcription of the priming strokes.
	pub fn text(&self) -> String {
		self.chars.decode()
	}
}

/// Fixed collection of style records, indexed by style id.
#[derive(Clone, Debug, Default)]
pub struct StyleBank {
	records: Vec<StyleRecord>,
}

impl StyleBank {
	pub fn new(records: Vec<StyleRecord>) -> Self {
		Self { records }
	}

	/// Loads every `<id>.style` file of a directory.
	///
	/// # Errors
	/// - a file name that is not a number
	/// - ids that are not contiguous from 0
	/// - postcard decoding or alphabet errors
	pub fn from_dir<P: AsRef<Path>>(dir: P) -> HandResult<Self> {
		let dir = dir.as_ref();
		let mut found: Vec<(usize, StyleRecord)> = Vec::new();

		for file in list_files(dir, STYLE_EXTENSION)? {
			let path = dir.join(&file);
			let id = numeric_stem(&path)
				.ok_or_else(|| HandError::model(format!("style file {file} is not named after its id")))?;
			let bytes = std::fs::read(&path)?;
			let stored: StoredStyle = postcard::from_bytes(&bytes)?;
			found.push((id, StyleRecord::new(stored.strokes, &stored.text)?));
		}

		found.sort_by_key(|(id, _)| *id);
		for (expected, (id, _)) in found.iter().enumerate() {
			if *id != expected {
				return Err(HandError::model(format!("style ids must be contiguous, missing {expected}")));
			}
		}

		tracing::info!(styles = found.len(), dir = %dir.display(), "loaded style bank");
		Ok(Self::new(found.into_iter().map(|(_, record)| record).collect()))
	}

	/// Writes a record as `<id>.style` into `dir`.
	pub fn save_record<P: AsRef<Path>>(dir: P, id: usize, record: &StyleRecord) -> HandResult<()> {
		let stored = StoredStyle { strokes: record.strokes.clone(), text: record.text() };
		let bytes = postcard::to_stdvec(&stored)?;
		let mut path = dir.as_ref().join(id.to_string());
		path.set_extension(STYLE_EXTENSION);
		std::fs::write(path, bytes)?;
		Ok(())
	}

	/// Number of styles (`K`).
	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn contains(&self, style: usize) -> bool {
		style < self.records.len()
	}

	/// Priming material for a style, `None` for no style or an unknown id.
	pub fn prime(&self, style: Option<usize>) -> Option<&StyleRecord> {
		style.and_then(|id| self.records.get(id))
	}
}
