use std::path::Path;
use std::sync::{Arc, mpsc};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use svg::Document;

use crate::config::HandConfig;
use crate::drawing::{self, Drawing};
use crate::error::{HandError, HandResult};
use crate::io;
use crate::model::{Generator, LineInput, ModelParams};
use crate::request::{ValidLine, WriteRequest};
use crate::stroke::StrokeSequence;
use crate::style::StyleBank;

/// Parameter file inside a model directory.
pub const MODEL_FILE: &str = "model.bin";
/// Style bank directory inside a model directory.
pub const STYLES_DIR: &str = "styles";
/// Optional configuration file inside a model directory.
pub const CONFIG_FILE: &str = "hand.json";

/// High-level handwriting synthesizer.
///
/// # Responsibilities
/// - Hold the model parameters and the style bank, loaded once and shared read-only
/// - Validate a `WriteRequest` up front
/// - Generate every line (in parallel), compose and render the document
///
/// Cloning is cheap: the parameters and styles are behind `Arc`s.
#[derive(Clone, Debug)]
pub struct Hand {
	model: Arc<ModelParams>,
	styles: Arc<StyleBank>,
	config: HandConfig,
}

impl Hand {
	/// Loads a synthesizer from a model directory.
	///
	/// # Parameters
	/// - `dir`: directory containing `model.bin`, an optional `styles/`
	///   directory of `<id>.style` files and an optional `hand.json`.
	///   Both `"folder"` and `"folder/"` are accepted.
	///
	/// # Errors
	/// - The path is not a directory.
	/// - The parameters or a style record fail to load or validate.
	#[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
	pub fn new<P: AsRef<Path>>(dir: P) -> HandResult<Self> {
		let folder = io::normalize_folder(dir.as_ref());
		if !folder.is_dir() {
			return Err(HandError::model(format!("expected a directory, got: {}", folder.display())));
		}

		let model = ModelParams::from_path(folder.join(MODEL_FILE))?;
		let styles = StyleBank::from_dir(folder.join(STYLES_DIR))?;
		let config_path = folder.join(CONFIG_FILE);
		let config = if config_path.is_file() { HandConfig::from_path(config_path)? } else { HandConfig::default() };

		Self::from_parts(model, styles, config)
	}

	/// Builds a synthesizer from in-memory parts.
	///
	/// # Errors
	/// `Model` if the parameter shapes are inconsistent.
	pub fn from_parts(model: ModelParams, styles: StyleBank, config: HandConfig) -> HandResult<Self> {
		model.validate()?;
		Ok(Self { model: Arc::new(model), styles: Arc::new(styles), config })
	}

	pub fn config(&self) -> &HandConfig {
		&self.config
	}

	pub fn styles(&self) -> &StyleBank {
		&self.styles
	}

	pub fn model(&self) -> &ModelParams {
		&self.model
	}

	/// Renders the request and writes the SVG to `path`.
	///
	/// Nothing is written unless every line was generated.
	#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), lines = request.lines.len()))]
	pub fn write<P: AsRef<Path>>(&self, path: P, request: &WriteRequest) -> HandResult<()> {
		let document = self.render(request)?;
		drawing::save(&path, &document)?;
		tracing::info!("document written");
		Ok(())
	}

	/// Renders the request to an in-memory SVG document.
	pub fn render(&self, request: &WriteRequest) -> HandResult<Document> {
		Ok(drawing::render(&self.draw(request)?))
	}

	/// Generates and lays out every line of the request.
	#[tracing::instrument(level = "debug", skip_all, fields(lines = request.lines.len()))]
	pub fn draw(&self, request: &WriteRequest) -> HandResult<Drawing> {
		let strokes = self.generate(request)?;
		drawing::compose(&strokes, &request.line_styles(&self.config), &self.config.drawing)
	}

	/// Generates the raw strokes of every line, `None` for blank rows.
	///
	/// # Behavior
	/// - Validates the whole request first; no generation happens on error.
	/// - Splits the written lines into chunks, one per worker thread.
	/// - Each line gets its own random generator seeded from the request seed,
	///   so results do not depend on the number of threads.
	/// - The first failing line aborts the call.
	pub fn generate(&self, request: &WriteRequest) -> HandResult<Vec<Option<StrokeSequence>>> {
		let lines = request.validate(&self.styles, &self.config)?;
		let seed = request.seed.unwrap_or_else(|| rand::rng().random());

		let work: Vec<ValidLine> = lines.into_iter().filter(|l| l.chars.is_some()).collect();
		let mut results: Vec<Option<StrokeSequence>> = vec![None; request.lines.len()];
		if work.is_empty() {
			return Ok(results);
		}

		let workers = self.config.worker_count(work.len());
		let chunk_size = work.len().div_ceil(workers);
		tracing::debug!(lines = work.len(), workers, seed, "generating lines");

		let (tx, rx) = mpsc::channel();
		for chunk in work.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<ValidLine> = chunk.to_vec();
			let model = Arc::clone(&self.model);
			let styles = Arc::clone(&self.styles);
			let steps_per_char = self.config.steps_per_char;

			thread::Builder::new().name("hand-line".to_owned()).spawn(move || {
				for line in chunk {
					let result = generate_line(&model, &styles, &line, steps_per_char, line_seed(seed, line.index));
					if tx.send((line.index, result)).is_err() {
						// receiver gave up after another line failed
						break;
					}
				}
			})?;
		}
		drop(tx);

		collect_lines(rx, &mut results, work.len())?;
		Ok(results)
	}
}

/// Stores each line result at its index.
///
/// # Errors
/// The first line error, or `Model` if a worker stopped (panicked) before
/// reporting all of its lines.
fn collect_lines(
	rx: mpsc::Receiver<(usize, HandResult<StrokeSequence>)>,
	results: &mut [Option<StrokeSequence>],
	expected: usize,
) -> HandResult<()> {
	let mut received = 0;
	for (index, result) in rx.iter() {
		results[index] = Some(result?);
		received += 1;
	}
	if received != expected {
		return Err(HandError::model(format!("{} of {expected} lines lost by a generation worker", expected - received)));
	}
	Ok(())
}

fn generate_line(
	model: &ModelParams,
	styles: &StyleBank,
	line: &ValidLine,
	steps_per_char: usize,
	seed: u64,
) -> HandResult<StrokeSequence> {
	let Some(chars) = &line.chars else {
		return Ok(Vec::new());
	};
	let input = LineInput::new(line.index, chars, steps_per_char)
		.with_prime(styles.prime(line.style))
		.with_bias(line.bias)?;
	let mut rng = StdRng::seed_from_u64(seed);
	Generator::new(model).generate(&input, &mut rng)
}

/// Distinct, reproducible seed for each line of a request.
fn line_seed(seed: u64, line: usize) -> u64 {
	seed ^ (line as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::stroke::StrokePoint;

	#[test]
	fn line_seeds_differ_per_line() {
		assert_ne!(line_seed(1, 0), line_seed(1, 1));
		assert_eq!(line_seed(5, 3), line_seed(5, 3));
	}

	#[test]
	fn collect_fails_when_a_worker_stops_early() {
		let (tx, rx) = mpsc::channel();
		tx.send((0, Ok(vec![StrokePoint::origin()]))).unwrap();
		drop(tx);

		let mut results = vec![None, None];
		let err = collect_lines(rx, &mut results, 2).unwrap_err();
		assert!(matches!(err, HandError::Model(_)));
		assert!(results[0].is_some());
	}

	#[test]
	fn collect_places_results_by_index() {
		let (tx, rx) = mpsc::channel();
		tx.send((1, Ok(vec![StrokePoint::origin()]))).unwrap();
		tx.send((0, Ok(Vec::new()))).unwrap();
		drop(tx);

		let mut results = vec![None, None];
		collect_lines(rx, &mut results, 2).unwrap();
		assert_eq!(results[1].as_ref().map(Vec::len), Some(1));
		assert_eq!(results[0].as_ref().map(Vec::len), Some(0));
	}

	#[test]
	fn new_rejects_missing_directory() {
		assert!(matches!(Hand::new("/definitely/not/a/model"), Err(HandError::Model(_))));
	}
}
