//! Top-level module for the word chain engine.
//!
//! This module provides the Markov text engine, including:
//! - Tokenization and normalization of raw text (`sanitizer`)
//! - The transition model built from training text (`Chain`)
//! - Per-word transition and punctuation records (`Node`)
//! - Generation parameters (`GenerationInput`)
//! - Sentence sampling and a high-level interface (`Generator`)
//! - A versioned binary snapshot of the model (`persistence`)

/// Splitting raw text into surface tokens and normalized keys.
pub mod sanitizer;

/// Per-word record of successors, start eligibility and end punctuation.
pub mod node;

/// First-order word chain built incrementally from text.
pub mod chain;

/// Generation parameters (stop bias, word cap).
pub mod generation_input;

/// Weighted random walks producing sentences, and the `Generator` handle
/// owning a chain and its random source.
pub mod generator;

/// Encoding of a chain to and from an opaque blob.
pub mod persistence;

pub use chain::{Chain, TrainStats};
pub use generation_input::GenerationInput;
pub use generator::Generator;
pub use node::Node;
