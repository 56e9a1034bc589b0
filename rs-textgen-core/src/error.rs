use std::path::PathBuf;

/// Errors surfaced by the text engine and its storage collaborators.
///
/// `NotFound` and `CorruptData` are recoverable: the usual reaction is to
/// continue with an empty model. `EmptyModel` is reported by generation when
/// there is nothing to walk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The persisted model or a training source does not exist.
	#[error("Not found: {}", .0.display())]
	NotFound(PathBuf),

	/// A persisted blob could not be decoded.
	#[error("Corrupt model data: {0}")]
	CorruptData(String),

	/// Generation was requested on a model without any node.
	#[error("The model is empty, train it first")]
	EmptyModel,

	/// A generation parameter is out of range.
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	/// Any other storage failure.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
