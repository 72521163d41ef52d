use serde::{Deserialize, Serialize};

use crate::error::{HandError, HandResult};

/// Index of the terminator appended to every encoded sequence.
pub const TERMINATOR: u8 = 0;

/// The fixed alphabet the model was trained on, in index order.
///
/// Index 0 is the terminator. There is no `Q`, `X` or `Z`: the style bank
/// transcriptions never contain them, so the model never learned them.
pub const ALPHABET: [char; 73] = [
	'\0', ' ', '!', '"', '#', '\'', '(', ')', ',', '-', '.',
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';',
	'?', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K',
	'L', 'M', 'N', 'O', 'P', 'R', 'S', 'T', 'U', 'V', 'W', 'Y',
	'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l',
	'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x',
	'y', 'z',
];

/// Number of symbols, terminator included.
pub const ALPHABET_SIZE: usize = ALPHABET.len();

/// Returns the alphabet index of `c`, or `None` if unsupported.
///
/// The terminator is not a writable character and always maps to `None`.
pub fn index_of(c: char) -> Option<u8> {
	if c == '\0' {
		return None;
	}
	ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

/// Returns `true` if `c` can appear in a line of text.
pub fn is_supported(c: char) -> bool {
	index_of(c).is_some()
}

/// An encoded, terminator-ended line of text.
///
/// # Invariants
/// - every index is `< ALPHABET_SIZE`
/// - the last index is always `TERMINATOR`, and it appears nowhere else
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CharSequence {
	indices: Vec<u8>,
}

impl CharSequence {
	/// Encodes `text`.
	///
	/// # Errors
	/// `UnsupportedCharacter` on the first character outside the alphabet.
	/// `line` is only used to label the error.
	pub fn encode(text: &str, line: usize) -> HandResult<Self> {
		let mut indices = Vec::with_capacity(text.len() + 1);
		for character in text.chars() {
			match index_of(character) {
				Some(i) => indices.push(i),
				None => return Err(HandError::UnsupportedCharacter { character, line }),
			}
		}
		indices.push(TERMINATOR);
		Ok(Self { indices })
	}

	/// Decodes back to the original text (terminator dropped).
	pub fn decode(&self) -> String {
		self.text_indices().iter().map(|&i| ALPHABET[i as usize]).collect()
	}

	/// Concatenates two sequences with a space between them.
	///
	/// Used to attend over `prime_text + " " + line` while priming.
	pub fn join(&self, other: &Self) -> Self {
		let mut indices = Vec::with_capacity(self.indices.len() + other.indices.len());
		indices.extend_from_slice(self.text_indices());
		indices.push(1); // ' '
		indices.extend_from_slice(&other.indices);
		Self { indices }
	}

	/// All indices, terminator included. This is what the attention window reads.
	pub fn indices(&self) -> &[u8] {
		&self.indices
	}

	/// Indices without the terminator.
	pub fn text_indices(&self) -> &[u8] {
		&self.indices[..self.indices.len() - 1]
	}

	/// Attended length, terminator included.
	pub fn len(&self) -> usize {
		self.indices.len()
	}

	/// Number of encoded characters, terminator excluded.
	pub fn char_count(&self) -> usize {
		self.indices.len() - 1
	}

	/// `true` when no character was encoded.
	pub fn is_empty(&self) -> bool {
		self.char_count() == 0
	}
}
