use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::alphabet::ALPHABET_SIZE;
use crate::error::{HandError, HandResult};

/// Size of a stroke point as fed to the network (`dx`, `dy`, `pen`).
pub const POINT_SIZE: usize = 3;

/// Shape of the synthesis network.
///
/// Stored alongside the weights so that a parameter file is self-describing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelConfig {
	/// Hidden units per LSTM layer.
	pub lstm_size: usize,
	/// Number of stacked LSTM layers (>= 1).
	pub layers: usize,
	/// Bivariate Gaussian components in the output mixture (`M`).
	pub output_mixtures: usize,
	/// Gaussian kernels in the attention window (`K`).
	pub attention_mixtures: usize,
	/// One-hot width of the attended characters.
	pub alphabet_size: usize,
	/// Divisor applied to every attention location increment.
	pub kappa_scale: f32,
	/// Constant added to the forget gate pre-activation.
	pub forget_bias: f32,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			lstm_size: 400,
			layers: 3,
			output_mixtures: 20,
			attention_mixtures: 10,
			alphabet_size: ALPHABET_SIZE,
			kappa_scale: 25.0,
			forget_bias: 1.0,
		}
	}
}

impl ModelConfig {
	/// Width of the raw output vector: weights, 2 stds, correlation, 2 means per component, plus the pen logit.
	pub fn output_size(&self) -> usize {
		6 * self.output_mixtures + 1
	}

	/// Width of the input of layer `layer`.
	///
	/// The first layer reads `[window, point]`, the others `[point, h_below, window]`.
	pub fn layer_input_size(&self, layer: usize) -> usize {
		if layer == 0 {
			self.alphabet_size + POINT_SIZE
		} else {
			POINT_SIZE + self.lstm_size + self.alphabet_size
		}
	}

	/// Width of the attention input `[window, point, h1]`.
	pub fn attention_input_size(&self) -> usize {
		self.alphabet_size + POINT_SIZE + self.lstm_size
	}
}

/// Fully connected layer, `y = W x + b`.
///
/// `weights` is row-major with one row of `inputs` values per output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Dense {
	pub inputs: usize,
	pub outputs: usize,
	pub weights: Vec<f32>,
	pub bias: Vec<f32>,
}

impl Dense {
	pub fn zeros(inputs: usize, outputs: usize) -> Self {
		Self {
			inputs,
			outputs,
			weights: vec![0.0; inputs * outputs],
			bias: vec![0.0; outputs],
		}
	}

	/// Uniform initialization in `±1/sqrt(inputs)`, zero bias.
	pub fn random<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
		let scale = 1.0 / (inputs.max(1) as f32).sqrt();
		Self {
			inputs,
			outputs,
			weights: (0..inputs * outputs).map(|_| rng.random_range(-scale..scale)).collect(),
			bias: vec![0.0; outputs],
		}
	}

	/// Computes `W x + b` into `out` (cleared first).
	pub fn forward_into(&self, input: &[f32], out: &mut Vec<f32>) {
		debug_assert_eq!(input.len(), self.inputs);
		out.clear();
		out.extend(self.weights.chunks_exact(self.inputs).zip(&self.bias).map(|(row, b)| {
			row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b
		}));
	}

	pub fn forward(&self, input: &[f32]) -> Vec<f32> {
		let mut out = Vec::with_capacity(self.outputs);
		self.forward_into(input, &mut out);
		out
	}

	fn check(&self, name: &str, inputs: usize, outputs: usize) -> HandResult<()> {
		if self.inputs != inputs || self.outputs != outputs {
			return Err(HandError::model(format!(
				"{name}: expected {inputs}x{outputs}, got {}x{}",
				self.inputs, self.outputs
			)));
		}
		if self.weights.len() != inputs * outputs || self.bias.len() != outputs {
			return Err(HandError::model(format!("{name}: weight buffers do not match the declared shape")));
		}
		Ok(())
	}
}

/// One LSTM layer. The four gates (`i`, `j`, `f`, `o`, in that order) are
/// computed by a single dense layer over `[input, h_prev]`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LstmLayer {
	pub gates: Dense,
}

impl LstmLayer {
	pub fn zeros(inputs: usize, hidden: usize) -> Self {
		Self { gates: Dense::zeros(inputs + hidden, 4 * hidden) }
	}

	pub fn random<R: Rng + ?Sized>(inputs: usize, hidden: usize, rng: &mut R) -> Self {
		Self { gates: Dense::random(inputs + hidden, 4 * hidden, rng) }
	}
}

/// Trained parameters of the synthesis network. Read-only once loaded.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelParams {
	pub config: ModelConfig,
	pub layers: Vec<LstmLayer>,
	/// Maps `[window, point, h1]` to `3K` attention parameters.
	pub attention: Dense,
	/// Maps the last layer's `h` to the raw mixture parameters.
	pub output: Dense,
}

impl ModelParams {
	/// All-zero parameters with the shapes `config` describes.
	pub fn zeros(config: ModelConfig) -> Self {
		let layers = (0..config.layers)
			.map(|l| LstmLayer::zeros(config.layer_input_size(l), config.lstm_size))
			.collect();
		let attention = Dense::zeros(config.attention_input_size(), 3 * config.attention_mixtures);
		let output = Dense::zeros(config.lstm_size, config.output_size());
		Self { config, layers, attention, output }
	}

	/// Randomly initialized, untrained parameters.
	pub fn random<R: Rng + ?Sized>(config: ModelConfig, rng: &mut R) -> Self {
		let layers = (0..config.layers)
			.map(|l| LstmLayer::random(config.layer_input_size(l), config.lstm_size, rng))
			.collect();
		let attention = Dense::random(config.attention_input_size(), 3 * config.attention_mixtures, rng);
		let output = Dense::random(config.lstm_size, config.output_size(), rng);
		Self { config, layers, attention, output }
	}

	/// Loads postcard-encoded parameters and checks their shapes.
	pub fn from_path<P: AsRef<Path>>(path: P) -> HandResult<Self> {
		let bytes = std::fs::read(path.as_ref())?;
		let params: Self = postcard::from_bytes(&bytes)?;
		params.validate()?;
		tracing::info!(
			path = %path.as_ref().display(),
			layers = params.config.layers,
			lstm_size = params.config.lstm_size,
			"loaded model parameters"
		);
		Ok(params)
	}

	/// Writes the parameters with postcard.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> HandResult<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	/// Checks that every layer matches `config`.
	///
	/// # Errors
	/// `HandError::Model` naming the first inconsistent layer.
	pub fn validate(&self) -> HandResult<()> {
		let config = &self.config;
		if config.layers == 0 || config.output_mixtures == 0 || config.attention_mixtures == 0 {
			return Err(HandError::model("layers and mixture counts must be positive"));
		}
		if config.alphabet_size != ALPHABET_SIZE {
			return Err(HandError::model(format!(
				"model was trained on {} symbols, the alphabet has {ALPHABET_SIZE}",
				config.alphabet_size
			)));
		}
		if config.kappa_scale.is_nan() || config.kappa_scale <= 0.0 {
			return Err(HandError::model("kappa_scale must be positive"));
		}
		if self.layers.len() != config.layers {
			return Err(HandError::model(format!("expected {} layers, got {}", config.layers, self.layers.len())));
		}
		for (l, layer) in self.layers.iter().enumerate() {
			layer.gates.check(
				&format!("lstm layer {l}"),
				config.layer_input_size(l) + config.lstm_size,
				4 * config.lstm_size,
			)?;
		}
		self.attention.check("attention", config.attention_input_size(), 3 * config.attention_mixtures)?;
		self.output.check("output", config.lstm_size, config.output_size())?;
		Ok(())
	}
}
