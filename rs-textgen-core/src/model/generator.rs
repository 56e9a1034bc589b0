use std::path::Path;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::chain::{Chain, TrainStats};
use super::generation_input::GenerationInput;
use super::node::Node;
use super::persistence;
use crate::error::{Error, Result};
use crate::io::ModelStore;

/// Punctuation closing a walk that stopped on a word with no end marker
/// (a dead end or the word cap).
pub const FALLBACK_END_MARKER: char = '.';

/// Generates `lines` sentences, one per line, followed by a blank line.
///
/// `lines == 0` yields a single newline, even on an empty chain.
///
/// # Errors
/// Returns `Error::EmptyModel` if sentences are requested from a chain
/// without any node.
pub fn generate<R: Rng + ?Sized>(
	chain: &Chain,
	lines: usize,
	input: &GenerationInput,
	rng: &mut R,
) -> Result<String> {
	let mut output = String::new();
	for sentence in sentences(chain, lines, input, rng)? {
		output.push_str(&sentence);
		output.push('\n');
	}
	output.push('\n');
	Ok(output)
}

/// Generates `lines` independent sentences.
pub fn sentences<R: Rng + ?Sized>(
	chain: &Chain,
	lines: usize,
	input: &GenerationInput,
	rng: &mut R,
) -> Result<Vec<String>> {
	if lines > 0 && chain.is_empty() {
		return Err(Error::EmptyModel);
	}
	(0..lines).map(|_| sentence(chain, input, rng)).collect()
}

/// Generates one sentence by walking the chain.
///
/// Returns `Error::EmptyModel` if no word can open a sentence, which also
/// covers a chain trained only on punctuation.
///
/// - A start-eligible word is drawn uniformly and capitalized
/// - On each word, the walk may stop if the word ever ended a sentence
///   (see `Node::roll_stop`); otherwise it follows a weighted transition
/// - A dead end or `max_words` also stops the walk
/// - Punctuation-only tokens (the empty key) are walked through but add no
///   text
/// - The sentence is closed with an end marker of the last word, or
///   `FALLBACK_END_MARKER` if it has none
pub fn sentence<R: Rng + ?Sized>(chain: &Chain, input: &GenerationInput, rng: &mut R) -> Result<String> {
	let start = chain.starts().choose(rng).ok_or(Error::EmptyModel)?;
	let mut node = lookup(chain, start)?;
	let mut sentence = capitalize(start);
	let mut words = 1;

	while words < input.max_words() && !node.roll_stop(input.stop_bias(), rng) {
		let Some(next) = node.pick_transition(rng) else {
			break;
		};
		node = lookup(chain, next)?;
		if !next.is_empty() {
			sentence.push(' ');
			sentence.push_str(next);
		}
		words += 1;
	}

	sentence.push(node.pick_end_marker(rng).unwrap_or(FALLBACK_END_MARKER));
	Ok(sentence)
}

fn lookup<'a>(chain: &'a Chain, key: &str) -> Result<&'a Node> {
	chain
		.node(key)
		.ok_or_else(|| Error::CorruptData(format!("no node for key {key:?}")))
}

/// Uppercases the first character of a word.
fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// High-level text generator.
///
/// # Responsibilities
/// - Own a `Chain`, its generation parameters and a random source
/// - Train and generate through a single handle
/// - Load and save the chain through a `ModelStore`
///
/// The random source is injected, so a seeded generator replays the same
/// output for the same training.
#[derive(Debug)]
pub struct Generator<R = StdRng> {
	chain: Chain,
	input: GenerationInput,
	rng: R,
}

impl Generator<StdRng> {
	/// Creates an empty generator with a deterministic random source.
	pub fn seeded(seed: u64) -> Self {
		Self::with_rng(StdRng::seed_from_u64(seed))
	}

	/// Creates an empty generator seeded from the operating system.
	pub fn from_os_rng() -> Self {
		Self::with_rng(StdRng::from_os_rng())
	}
}

impl<R: Rng> Generator<R> {
	/// Creates an empty generator drawing from `rng`.
	pub fn with_rng(rng: R) -> Self {
		Self { chain: Chain::new(), input: GenerationInput::default(), rng }
	}

	pub fn chain(&self) -> &Chain {
		&self.chain
	}

	pub fn input(&self) -> &GenerationInput {
		&self.input
	}

	pub fn input_mut(&mut self) -> &mut GenerationInput {
		&mut self.input
	}

	pub fn is_empty(&self) -> bool {
		self.chain.is_empty()
	}

	/// Adds `text` to the chain. See `Chain::train`.
	pub fn train(&mut self, text: &str) -> TrainStats {
		self.chain.train(text)
	}

	/// See the free function `generate`.
	pub fn generate(&mut self, lines: usize) -> Result<String> {
		generate(&self.chain, lines, &self.input, &mut self.rng)
	}

	/// See the free function `sentences`.
	pub fn sentences(&mut self, lines: usize) -> Result<Vec<String>> {
		sentences(&self.chain, lines, &self.input, &mut self.rng)
	}

	/// Replaces the chain with the one stored at `path`.
	///
	/// # Errors
	/// `NotFound` and `CorruptData` are returned as is; the current chain is
	/// left untouched.
	pub fn load<S: ModelStore + ?Sized>(&mut self, store: &S, path: &Path) -> Result<()> {
		self.chain = persistence::load(store, path)?;
		Ok(())
	}

	/// Like `load`, but a missing or undecodable model resets the generator
	/// to an empty chain.
	///
	/// Returns whether a model was loaded. Other storage failures are still
	/// returned.
	pub fn load_or_empty<S: ModelStore + ?Sized>(&mut self, store: &S, path: &Path) -> Result<bool> {
		match self.load(store, path) {
			Ok(()) => Ok(true),
			Err(Error::NotFound(_)) => {
				debug!("No model at {}, starting empty", path.display());
				self.chain = Chain::new();
				Ok(false)
			}
			Err(Error::CorruptData(reason)) => {
				warn!("Discarding corrupt model {}: {}", path.display(), reason);
				self.chain = Chain::new();
				Ok(false)
			}
			Err(e) => Err(e),
		}
	}

	/// Writes the chain to `path`.
	pub fn save<S: ModelStore + ?Sized>(&self, store: &S, path: &Path) -> Result<()> {
		persistence::save(store, path, &self.chain)
	}
}
