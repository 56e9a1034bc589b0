use std::env;
use std::path::{Component, Path, PathBuf};

/// Default data directory.
pub const DATA_DIR: &str = "./data";

/// File holding the persisted chain model.
pub const MODEL_FILE: &str = "markov.dat";

/// File holding the digests of already trained sources.
pub const LEDGER_FILE: &str = "training.dat";

/// Locations of the files kept in a data directory.
///
/// A data directory holds one model snapshot and one training ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
	dir: PathBuf,
}

impl Default for DataLayout {
	fn default() -> Self {
		Self::new(DATA_DIR)
	}
}

impl DataLayout {
	pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
		Self { dir: dir.into() }
	}

	/// Layout for a directory given on the command line or in the
	/// environment.
	///
	/// A path made only of `.` components (`.`, `./`, `./.`) is pinned to the
	/// working directory at startup, so log lines show where the files live.
	/// Any other path is kept verbatim.
	pub fn resolve(dir: &str) -> Self {
		let path = Path::new(dir);
		let current_only = path.components().next().is_some()
			&& path.components().all(|c| c == Component::CurDir);
		if current_only {
			if let Ok(cwd) = env::current_dir() {
				return Self::new(cwd);
			}
		}
		Self::new(path)
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Path of the persisted model.
	pub fn model_path(&self) -> PathBuf {
		self.dir.join(MODEL_FILE)
	}

	/// Path of the training ledger.
	pub fn ledger_path(&self) -> PathBuf {
		self.dir.join(LEDGER_FILE)
	}
}
