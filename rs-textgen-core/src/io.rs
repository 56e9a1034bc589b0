use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Storage collaborator for persisted model blobs.
///
/// Blobs are opaque to the store. A missing location must be reported as
/// `Error::NotFound` so callers can fall back to an empty model.
pub trait ModelStore {
	/// Reads the whole blob stored at `path`.
	fn read(&self, path: &Path) -> Result<Vec<u8>>;

	/// Replaces the blob stored at `path`.
	fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Filesystem-backed store.
///
/// Parent directories are created on write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStore;

impl ModelStore for FileStore {
	fn read(&self, path: &Path) -> Result<Vec<u8>> {
		fs::read(path).map_err(|e| not_found_or_io(e, path))
	}

	fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
		if let Some(parent) = path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}
		fs::write(path, bytes)?;
		Ok(())
	}
}

/// In-process store keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStore {
	blobs: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl ModelStore for MemoryStore {
	fn read(&self, path: &Path) -> Result<Vec<u8>> {
		let blobs = self.blobs.lock().map_err(|_| poisoned())?;
		blobs.get(path).cloned().ok_or_else(|| Error::NotFound(path.to_owned()))
	}

	fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
		let mut blobs = self.blobs.lock().map_err(|_| poisoned())?;
		blobs.insert(path.to_owned(), bytes.to_vec());
		Ok(())
	}
}

/// Reads a whole UTF-8 text file (a training source or the ledger).
///
/// A missing file is reported as `Error::NotFound`.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
	let path = path.as_ref();
	fs::read_to_string(path).map_err(|e| not_found_or_io(e, path))
}

/// Appends one line to a text file, creating it (and its parents) if needed.
pub fn append_line<P: AsRef<Path>>(path: P, line: &str) -> Result<()> {
	let path = path.as_ref();
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}
	let mut file = OpenOptions::new().create(true).append(true).open(path)?;
	writeln!(file, "{line}")?;
	Ok(())
}

fn not_found_or_io(error: io::Error, path: &Path) -> Error {
	if error.kind() == io::ErrorKind::NotFound {
		Error::NotFound(path.to_owned())
	} else {
		Error::Io(error)
	}
}

fn poisoned() -> Error {
	Error::Io(io::Error::other("memory store lock poisoned"))
}
