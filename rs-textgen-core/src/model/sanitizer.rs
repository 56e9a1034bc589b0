//! Tokenization of raw text into surface tokens and normalized keys.
//!
//! A *surface* token is a word as it appears in the text, punctuation
//! included. Its *key* is the case-folded core of the word, without any
//! leading or trailing non-alphabetic character. Every function here is
//! total: any input, including empty or all-punctuation text, is accepted.

/// Characters that terminate a sentence.
pub const END_MARKS: [char; 3] = ['.', '!', '?'];

const ELLIPSIS: &str = "...";

/// Splits `text` into surface tokens.
///
/// Tokens are separated by whitespace and by runs of two or more dashes
/// (typed em-dashes). Empty fragments are discarded. The returned iterator
/// is lazy and can be cloned to restart the walk.
pub fn split(text: &str) -> impl Iterator<Item = &str> + Clone {
	text.split_whitespace().flat_map(DashSplit::new)
}

/// Iterator over the fragments of a word separated by dash runs.
#[derive(Clone, Debug)]
struct DashSplit<'a> {
	rest: &'a str,
}

impl<'a> DashSplit<'a> {
	fn new(word: &'a str) -> Self {
		Self { rest: word }
	}
}

impl<'a> Iterator for DashSplit<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<&'a str> {
		while !self.rest.is_empty() {
			let (fragment, rest) = split_at_dash_run(self.rest);
			self.rest = rest;
			if !fragment.is_empty() {
				return Some(fragment);
			}
		}
		None
	}
}

/// Splits around the first run of at least two dashes.
///
/// Dashes are ASCII, so byte offsets around them are char boundaries.
fn split_at_dash_run(s: &str) -> (&str, &str) {
	let bytes = s.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] != b'-' {
			i += 1;
			continue;
		}
		let mut end = i;
		while end < bytes.len() && bytes[end] == b'-' {
			end += 1;
		}
		if end - i >= 2 {
			return (&s[..i], &s[end..]);
		}
		i = end;
	}
	(s, "")
}

/// Removes the leading run of non-alphabetic characters.
///
/// Underscores, digits and quotes (typographic ones included) count as
/// non-alphabetic.
pub fn strip_front(token: &str) -> &str {
	token.trim_start_matches(|c: char| !c.is_alphabetic())
}

/// Removes the trailing run of non-alphabetic characters.
///
/// Characters listed in `exceptions` survive, up to `keep_n` of them in
/// total, counted from the end of the token inward. Survivors keep their
/// relative order and are glued back onto the alphabetic core.
///
/// `strip_back("apple!-.!", &['!'], 2) == "apple!!"`
pub fn strip_back(token: &str, exceptions: &[char], keep_n: usize) -> String {
	let core = token.trim_end_matches(|c: char| !c.is_alphabetic());
	let tail = &token[core.len()..];

	let mut kept: Vec<char> = tail
		.chars()
		.rev()
		.filter(|c| exceptions.contains(c))
		.take(keep_n)
		.collect();
	kept.reverse();

	let mut stripped = String::with_capacity(core.len() + kept.len());
	stripped.push_str(core);
	stripped.extend(kept);
	stripped
}

/// Computes the chain key of a surface token.
///
/// The token is lowercased first so that case folding can never leave a
/// non-alphabetic character (such as a combining mark) on either edge.
/// Tokens made only of punctuation normalize to the empty string.
pub fn normalize(token: &str) -> String {
	let lower = token.to_lowercase();
	strip_front(&strip_back(&lower, &[], 0)).to_owned()
}

/// Whether the token following `prev` begins a sentence.
///
/// True for the first token of a text and after any token whose last
/// character is non-alphabetic.
pub fn is_start(prev: Option<&str>) -> bool {
	match prev.and_then(|p| p.chars().last()) {
		None => true,
		Some(last) => !last.is_alphabetic(),
	}
}

/// Whether `surface` ends a sentence.
///
/// The last character must be one of `END_MARKS`; a trailing ellipsis does
/// not count.
pub fn is_end(surface: &str) -> bool {
	end_marker(surface).is_some()
}

/// The sentence-ending punctuation carried by `surface`, if any.
pub fn end_marker(surface: &str) -> Option<char> {
	let last = surface.chars().last()?;
	if END_MARKS.contains(&last) && !surface.ends_with(ELLIPSIS) {
		Some(last)
	} else {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn tokens(text: &str) -> Vec<&str> {
		split(text).collect()
	}

	#[test]
	fn split_on_whitespace() {
		assert_eq!(tokens("  It goes\twithout\nsaying. "), vec!["It", "goes", "without", "saying."]);
		assert!(tokens("").is_empty());
		assert!(tokens(" \n\t").is_empty());
	}

	#[test]
	fn split_on_dash_runs() {
		assert_eq!(tokens("yarns--and even."), vec!["yarns", "and", "even."]);
		assert_eq!(tokens("well---then"), vec!["well", "then"]);
		assert_eq!(tokens("--hassle"), vec!["hassle"]);
		assert_eq!(tokens("a----"), vec!["a"]);
		assert!(tokens("--").is_empty());
	}

	#[test]
	fn single_dash_is_kept() {
		assert_eq!(tokens("well-known -"), vec!["well-known", "-"]);
	}

	#[test]
	fn split_is_restartable() {
		let iter = split("one two--three");
		let first: Vec<_> = iter.clone().collect();
		let second: Vec<_> = iter.collect();
		assert_eq!(first, second);
	}

	#[test]
	fn strip_front_cases() {
		assert_eq!(strip_front("apple"), "apple");
		assert_eq!(strip_front("!apple"), "apple");
		assert_eq!(strip_front("'you"), "you");
		assert_eq!(strip_front("--hassle"), "hassle");
		assert_eq!(strip_front("_word_"), "word_");
		assert_eq!(strip_front("\u{201C}Hello"), "Hello");
		assert_eq!(strip_front("42"), "");
	}

	#[test]
	fn strip_back_cases() {
		assert_eq!(strip_back("apple!!!!", &['!'], 2), "apple!!");
		assert_eq!(strip_back("apple!-.!", &['!'], 2), "apple!!");
		assert_eq!(strip_back("apple...", &[], 0), "apple");
		assert_eq!(strip_back("apple!", &[], 0), "apple");
		assert_eq!(strip_back("can't", &[], 0), "can't");
		assert_eq!(strip_back("!!!", &['!'], 1), "!");
	}

	#[test]
	fn strip_both_ends() {
		let clean = |w: &str| strip_front(&strip_back(w, &[], 0)).to_owned();
		assert_eq!(clean("'Sparrow"), "Sparrow");
		assert_eq!(clean("'And'"), "And");
		assert_eq!(clean("_word_"), "word");
		assert_eq!(clean("\u{201C}Hello,\u{201D}"), "Hello");
	}

	#[test]
	fn normalize_cases() {
		assert_eq!(normalize("It"), "it");
		assert_eq!(normalize("saying."), "saying");
		assert_eq!(normalize("'twas"), "twas");
		assert_eq!(normalize("night!"), "night");
		assert_eq!(normalize("terror,"), "terror");
		assert_eq!(normalize("don't"), "don't");
		assert_eq!(normalize("_Word_"), "word");
		assert_eq!(normalize("?!"), "");
		assert_eq!(normalize(""), "");
	}

	#[test]
	fn is_start_cases() {
		assert!(is_start(None));
		assert!(is_start(Some("")));
		assert!(!is_start(Some("Hello")));
		assert!(is_start(Some("Hello!")));
		assert!(is_start(Some("saying.")));
	}

	#[test]
	fn is_end_cases() {
		assert!(!is_end("Hello"));
		assert!(is_end("tomorrow."));
		assert!(is_end("what?"));
		assert!(is_end("night!"));
		assert!(!is_end("terror,"));
		assert!(!is_end("terrible..."));
		assert!(!is_end("wait...."));
		assert!(is_end("no.."));
		assert!(!is_end(""));
	}

	#[test]
	fn end_marker_is_last_char() {
		assert_eq!(end_marker("night!"), Some('!'));
		assert_eq!(end_marker("terrible..."), None);
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(256))]

		#[test]
		fn normalize_is_idempotent(w in "[a-zA-Z0-9_'\",.!?\u{201C}\u{201D} -]{0,16}") {
			let once = normalize(&w);
			prop_assert_eq!(normalize(&once), once.clone());
		}

		#[test]
		fn normalize_has_alphabetic_edges(w in "\\PC{0,16}") {
			let key = normalize(&w);
			if let (Some(first), Some(last)) = (key.chars().next(), key.chars().last()) {
				prop_assert!(first.is_alphabetic(), "leading {:?} in {:?}", first, key);
				prop_assert!(last.is_alphabetic(), "trailing {:?} in {:?}", last, key);
			}
		}

		#[test]
		fn split_never_yields_empty_tokens(text in "[a-z .!-]{0,40}") {
			for token in split(&text) {
				prop_assert!(!token.is_empty());
				prop_assert!(!token.contains("--"));
			}
		}
	}
}
