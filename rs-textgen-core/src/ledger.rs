use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::io::{append_line, read_text};

/// Record of the training sources already fed to a model.
///
/// Sources are identified by the MD5 hex digest of their content, one digest
/// per line in the backing file. The chain itself never deduplicates:
/// training twice on the same text doubles every count, so callers consult
/// the ledger before calling `train`.
#[derive(Debug)]
pub struct TrainingLedger {
	path: PathBuf,
	digests: HashSet<String>,
}

impl TrainingLedger {
	/// Opens the ledger stored at `path`.
	///
	/// A missing file opens as an empty ledger; it is created on the first
	/// `record`.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref().to_owned();
		let digests = match read_text(&path) {
			Ok(contents) => contents
				.lines()
				.map(str::trim)
				.filter(|line| !line.is_empty())
				.map(str::to_owned)
				.collect(),
			Err(Error::NotFound(_)) => HashSet::new(),
			Err(e) => return Err(e),
		};
		debug!("Opened ledger {} ({} entries)", path.display(), digests.len());
		Ok(Self { path, digests })
	}

	/// Hex digest identifying a training source.
	pub fn digest(content: &str) -> String {
		format!("{:x}", md5::compute(content.as_bytes()))
	}

	pub fn contains(&self, digest: &str) -> bool {
		self.digests.contains(digest)
	}

	pub fn len(&self) -> usize {
		self.digests.len()
	}

	pub fn is_empty(&self) -> bool {
		self.digests.is_empty()
	}

	/// Marks a digest as trained and appends it to the backing file.
	///
	/// Returns `false` without touching the file if it was already present.
	/// The digest is kept in memory even when the append fails, so this
	/// process never trains the same source twice; only the on-disk copy is
	/// behind.
	pub fn record(&mut self, digest: &str) -> Result<bool> {
		if !self.digests.insert(digest.to_owned()) {
			return Ok(false);
		}
		append_line(&self.path, digest)?;
		Ok(true)
	}
}
