use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use super::node::Node;
use super::sanitizer;

/// First-order word Markov chain.
///
/// The `Chain` maps each normalized word to its `Node` and keeps an ordered
/// list of the words allowed to open a sentence.
///
/// # Responsibilities
/// - Build the chain from raw text, cumulatively across calls
/// - Record successors, sentence starts and closing punctuation
/// - Expose read-only access for generation and persistence
///
/// # Invariants
/// - Nodes are never removed; training only adds or extends
/// - `starts` lists, in the order they were first flagged, exactly the keys
///   whose node has `is_start` set, each once
/// - The empty key (punctuation-only tokens) never opens a sentence
/// - Every transition target is a key of `nodes`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Chain {
	nodes: IndexMap<String, Node>,
	starts: Vec<String>,
}

/// Counters describing one training call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrainStats {
	pub tokens: usize,
	pub new_nodes: usize,
	pub sentence_ends: usize,
}

impl Chain {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of distinct words.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, key: &str) -> Option<&Node> {
		self.nodes.get(key)
	}

	/// Iterates over nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	/// Words allowed to open a sentence, in the order they were first seen
	/// opening one.
	pub fn starts(&self) -> &[String] {
		&self.starts
	}

	/// Adds the words of `text` to the chain.
	///
	/// For each surface token:
	/// - its node is created if missing
	/// - the previous word gains a transition toward it
	/// - a closing `.`, `!` or `?` (not an ellipsis) is recorded as an end marker
	/// - it becomes start-eligible if it opens a sentence
	///
	/// Start eligibility accumulates: a word that opened a sentence once stays
	/// eligible even if later seen mid-sentence. Punctuation-only tokens get
	/// the empty key and are never start-eligible. Training is not deduplicated;
	/// feeding the same text twice doubles every count.
	pub fn train(&mut self, text: &str) -> TrainStats {
		let mut stats = TrainStats::default();
		let mut prev: Option<(&str, String)> = None;

		for surface in sanitizer::split(text) {
			let key = sanitizer::normalize(surface);
			stats.tokens += 1;

			if !self.nodes.contains_key(&key) {
				self.nodes.insert(key.clone(), Node::new(&key));
				stats.new_nodes += 1;
			}

			if let Some((_, prev_key)) = &prev {
				if let Some(prev_node) = self.nodes.get_mut(prev_key) {
					prev_node.add_transition(&key);
				}
			}

			let opens_sentence = sanitizer::is_start(prev.as_ref().map(|(s, _)| *s));
			if let Some(node) = self.nodes.get_mut(&key) {
				if let Some(marker) = sanitizer::end_marker(surface) {
					node.add_end_marker(marker);
					stats.sentence_ends += 1;
				}
				if opens_sentence && !key.is_empty() && node.mark_start() {
					self.starts.push(key.clone());
				}
			}

			prev = Some((surface, key));
		}

		debug!(
			"Trained on {} tokens: {} new nodes, {} sentence ends, {} nodes total",
			stats.tokens,
			stats.new_nodes,
			stats.sentence_ends,
			self.nodes.len()
		);
		stats
	}

	/// Checks the structural invariants of a chain built elsewhere
	/// (typically a decoded snapshot).
	pub(crate) fn validate(&self) -> Result<(), String> {
		for (key, node) in &self.nodes {
			if key != node.key() {
				return Err(format!("node {:?} stored under key {:?}", node.key(), key));
			}
			if sanitizer::normalize(key) != *key {
				return Err(format!("key {key:?} is not normalized"));
			}
			if let Some(target) = node.transitions().iter().find(|t| !self.nodes.contains_key(*t)) {
				return Err(format!("node {key:?} transitions to unknown key {target:?}"));
			}
			if let Some(marker) = node.end_markers().iter().find(|m| !sanitizer::END_MARKS.contains(*m)) {
				return Err(format!("node {key:?} has invalid end marker {marker:?}"));
			}
		}

		let flagged = self.nodes.values().filter(|n| n.is_start()).count();
		if flagged != self.starts.len() {
			return Err(format!(
				"{} start-eligible nodes but {} start entries",
				flagged,
				self.starts.len()
			));
		}
		let mut seen = HashSet::with_capacity(self.starts.len());
		for start in &self.starts {
			if start.is_empty() {
				return Err("empty key in start entries".to_owned());
			}
			if !seen.insert(start.as_str()) {
				return Err(format!("duplicate start entry {start:?}"));
			}
			match self.nodes.get(start) {
				Some(node) if node.is_start() => (),
				_ => return Err(format!("start entry {start:?} is not a start-eligible node")),
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn keys(chain: &Chain) -> Vec<&str> {
		chain.nodes().map(Node::key).collect()
	}

	#[test]
	fn trains_two_sentences() {
		let mut chain = Chain::new();
		let stats = chain.train("It goes without saying. 'twas a long night!");

		assert_eq!(keys(&chain), ["it", "goes", "without", "saying", "twas", "a", "long", "night"]);
		assert_eq!(stats, TrainStats { tokens: 8, new_nodes: 8, sentence_ends: 2 });

		let expected: [(&str, Option<&str>, bool, &[char]); 8] = [
			("it", Some("goes"), true, &[]),
			("goes", Some("without"), false, &[]),
			("without", Some("saying"), false, &[]),
			("saying", Some("twas"), false, &['.']),
			("twas", Some("a"), true, &[]),
			("a", Some("long"), false, &[]),
			("long", Some("night"), false, &[]),
			("night", None, false, &['!']),
		];
		for (key, next, start, ends) in expected {
			let node = chain.node(key).unwrap();
			let transitions: Vec<&str> = node.transitions().iter().map(String::as_str).collect();
			assert_eq!(transitions, next.into_iter().collect::<Vec<_>>(), "transitions of {key}");
			assert_eq!(node.is_start(), start, "start flag of {key}");
			assert_eq!(node.end_markers(), ends, "end markers of {key}");
		}
		assert_eq!(chain.starts(), ["it", "twas"]);
		chain.validate().unwrap();
	}

	#[test]
	fn splits_on_double_dash() {
		let mut chain = Chain::new();
		chain.train("yarns--and even.");

		assert_eq!(keys(&chain), ["yarns", "and", "even"]);
		assert!(chain.node("yarns").unwrap().is_start());
		assert!(!chain.node("and").unwrap().is_start());
		assert_eq!(chain.node("even").unwrap().end_markers(), ['.']);
		assert_eq!(chain.node("yarns").unwrap().transitions(), ["and"]);
	}

	#[test]
	fn repeated_successors_form_a_multiset() {
		let mut chain = Chain::new();
		chain.train("the cat and the cat and the dog.");
		assert_eq!(chain.node("the").unwrap().transitions(), ["cat", "cat", "dog"]);
		assert_eq!(chain.node("and").unwrap().transition_count(), 2);
	}

	#[test]
	fn training_is_cumulative() {
		let mut chain = Chain::new();
		chain.train("Run fast.");
		chain.train("Run fast.");

		let run = chain.node("run").unwrap();
		assert_eq!(run.transitions(), ["fast", "fast"]);
		let fast = chain.node("fast").unwrap();
		assert_eq!(fast.transitions(), ["run"]);
		assert_eq!(fast.end_markers(), ['.', '.']);
		assert_eq!(chain.starts(), ["run"]);
	}

	#[test]
	fn start_flag_accumulates_in_either_order() {
		// Sentence-initial first, then mid-sentence.
		let mut chain = Chain::new();
		chain.train("Dogs bark. Big dogs sleep.");
		assert!(chain.node("dogs").unwrap().is_start());

		// Mid-sentence first, then sentence-initial.
		let mut chain = Chain::new();
		chain.train("Big dogs sleep. Dogs bark.");
		assert!(chain.node("dogs").unwrap().is_start());
		assert_eq!(chain.starts(), ["big", "dogs"]);
	}

	#[test]
	fn punctuation_tokens_use_empty_key() {
		let mut chain = Chain::new();
		chain.train("wait - what?!");

		assert_eq!(keys(&chain), ["wait", "", "what"]);
		assert_eq!(chain.node("wait").unwrap().transitions(), [""]);
		assert_eq!(chain.node("").unwrap().transitions(), ["what"]);
		// The dash ends with a non-alphabetic character.
		assert!(chain.node("what").unwrap().is_start());
		assert_eq!(chain.node("what").unwrap().end_markers(), ['!']);
	}

	#[test]
	fn punctuation_after_sentence_end_is_not_a_start() {
		let mut chain = Chain::new();
		chain.train("I see. - Yes it is. Hi. ?");

		assert_eq!(chain.starts(), ["i", "yes", "hi"]);
		let empty = chain.node("").unwrap();
		assert!(!empty.is_start());
		assert_eq!(empty.transitions(), ["yes"]);
		assert_eq!(empty.end_markers(), ['?']);
		chain.validate().unwrap();
	}

	#[test]
	fn only_punctuation_has_no_start() {
		let mut chain = Chain::new();
		chain.train("?! --- ...");
		assert_eq!(chain.len(), 1);
		assert!(chain.starts().is_empty());
		chain.validate().unwrap();
	}

	#[test]
	fn ellipsis_is_not_an_end() {
		let mut chain = Chain::new();
		chain.train("How terrible... Really.");
		assert!(chain.node("terrible").unwrap().end_markers().is_empty());
		assert!(chain.node("really").unwrap().is_start());
	}

	#[test]
	fn case_and_affixes_share_a_node() {
		let mut chain = Chain::new();
		chain.train("_Hello_ hello, \u{201C}HELLO\u{201D}");
		assert_eq!(keys(&chain), ["hello"]);
		assert_eq!(chain.node("hello").unwrap().transitions(), ["hello", "hello"]);
	}

	#[test]
	fn empty_text_adds_nothing() {
		let mut chain = Chain::new();
		assert_eq!(chain.train("   "), TrainStats::default());
		assert!(chain.is_empty());
		assert!(chain.starts().is_empty());
	}

	#[test]
	fn validate_rejects_dangling_start() {
		let mut chain = Chain::new();
		chain.train("Hello there.");
		chain.starts.push("missing".to_owned());
		assert!(chain.validate().is_err());
	}
}
