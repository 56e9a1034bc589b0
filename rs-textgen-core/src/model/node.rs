use rand::Rng;
use rand::seq::IndexedRandom;

use serde::{Deserialize, Serialize};

/// Represents one word of the chain.
///
/// A `Node` is keyed by a normalized token and stores everything observed
/// right after that token: the words that followed it and the punctuation
/// that closed a sentence on it.
///
/// Successors are kept as a multiset: a word seen three times after this one
/// appears three times in `transitions`. Picking a uniform entry is therefore
/// a frequency-weighted choice over distinct successors. Collapsing the list
/// to unique successors would change the output distribution.
///
/// ## Invariants
/// - `key` has no leading or trailing non-alphabetic character
/// - Every transition is the key of a node of the same chain
/// - Entries are only ever appended
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Node {
	key: String,
	transitions: Vec<String>,
	is_start: bool,
	end_markers: Vec<char>,
}

impl Node {
	/// Creates a node with no observation.
	pub fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: Vec::new(),
			is_start: false,
			end_markers: Vec::new(),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Observed successors, in training order, duplicates included.
	pub fn transitions(&self) -> &[String] {
		&self.transitions
	}

	pub fn transition_count(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_start(&self) -> bool {
		self.is_start
	}

	/// Observed sentence-ending punctuation, duplicates included.
	pub fn end_markers(&self) -> &[char] {
		&self.end_markers
	}

	pub fn end_count(&self) -> usize {
		self.end_markers.len()
	}

	/// Records one occurrence of `next` following this word.
	pub(crate) fn add_transition(&mut self, next: &str) {
		self.transitions.push(next.to_owned());
	}

	/// Records one sentence ending on this word with `marker`.
	pub(crate) fn add_end_marker(&mut self, marker: char) {
		self.end_markers.push(marker);
	}

	/// Marks the word as sentence-initial.
	///
	/// Returns `true` if the flag was not already set.
	pub(crate) fn mark_start(&mut self) -> bool {
		!std::mem::replace(&mut self.is_start, true)
	}

	/// Picks a successor, weighted by observation count.
	///
	/// Returns `None` if the word was never followed by anything.
	pub fn pick_transition<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.transitions.choose(rng).map(String::as_str)
	}

	/// Picks a closing punctuation mark, weighted by observation count.
	///
	/// Returns `None` if no sentence ever ended on this word.
	pub fn pick_end_marker<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char> {
		self.end_markers.choose(rng).copied()
	}

	/// Share of observations where the sentence ended here:
	/// `ends / (ends + transitions)`.
	///
	/// Zero if the word never ended a sentence.
	pub fn stop_ratio(&self) -> f32 {
		let ends = self.end_count();
		if ends == 0 {
			return 0.0;
		}
		ends as f32 / (ends + self.transition_count()) as f32
	}

	/// Rolls whether a walk standing on this word should end the sentence.
	///
	/// Only words that ended a sentence at least once can stop a walk. The
	/// roll is a uniform percentage; the walk stops when it falls under the
	/// stop ratio raised by `bias`.
	pub fn roll_stop<R: Rng + ?Sized>(&self, bias: f32, rng: &mut R) -> bool {
		if self.end_markers.is_empty() {
			return false;
		}
		let roll: f32 = rng.random_range(0.0..1.0);
		roll < self.stop_ratio() + bias
	}
}
