use crate::error::{Error, Result};

/// Default bias added to the stop roll.
pub const DEFAULT_STOP_BIAS: f32 = 0.1;

/// Default cap on the number of words of one sentence.
pub const DEFAULT_MAX_WORDS: usize = 64;

/// Parameters of a generation.
///
/// # Responsibilities
/// - Track the fixed bias of the stop decision (`stop_bias`)
/// - Bound the length of a single walk (`max_words`)
///
/// # Invariants
/// - `stop_bias` is within `0.0..=1.0`
/// - `max_words` is at least 1
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationInput {
	/// Added to a word's stop ratio before comparing it to the random roll.
	/// Higher values produce shorter sentences.
	stop_bias: f32,

	/// A walk reaching this many words ends as if it had stopped naturally.
	/// Needed for chains with cycles that never reach an end marker.
	max_words: usize,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self {
			stop_bias: DEFAULT_STOP_BIAS,
			max_words: DEFAULT_MAX_WORDS,
		}
	}
}

impl GenerationInput {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current stop bias.
	pub fn stop_bias(&self) -> f32 {
		self.stop_bias
	}

	/// Returns the current word cap.
	pub fn max_words(&self) -> usize {
		self.max_words
	}

	/// Sets the stop bias (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_stop_bias(&mut self, stop_bias: f32) -> Result<()> {
		if !(0.0..=1.0).contains(&stop_bias) {
			return Err(Error::InvalidInput(format!(
				"stop bias must be between 0.0 and 1.0, got {stop_bias}"
			)));
		}
		self.stop_bias = stop_bias;
		Ok(())
	}

	/// Sets the word cap.
	///
	/// # Errors
	/// Returns an error if `max_words` is zero.
	pub fn set_max_words(&mut self, max_words: usize) -> Result<()> {
		if max_words == 0 {
			return Err(Error::InvalidInput("max words must be at least 1".to_owned()));
		}
		self.max_words = max_words;
		Ok(())
	}
}
