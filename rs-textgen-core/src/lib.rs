//! Word-level Markov chain text generation library.
//!
//! This crate provides a first-order Markov text engine including:
//! - Tokenization and sanitization of raw text into normalized word keys
//! - A chain model recording successors, sentence starts and end punctuation
//! - Sentence generation through weighted random walks
//! - A versioned binary snapshot of the model and storage helpers
//!
//! The engine is single-threaded and performs no locking. Callers sharing a
//! model across threads must serialize `train` against every other access.

/// Error taxonomy shared by every fallible operation of the crate.
pub mod error;

/// Chain model, sanitizer, generator and persistence.
pub mod model;

/// Storage collaborator (model blobs, training sources, ledger lines).
pub mod io;

/// On-disk layout of a data directory.
pub mod config;

/// Content-hash ledger used to skip already trained sources.
pub mod ledger;

pub use error::{Error, Result};
