//! Versioned binary snapshot of a `Chain`.
//!
//! Layout: the 4-byte magic `TXGN`, one format version byte, then the
//! `postcard` encoding of the chain. Nodes are stored in insertion order, so
//! decoding and re-encoding a snapshot yields the same bytes.

use std::path::Path;

use log::info;

use super::chain::Chain;
use crate::error::{Error, Result};
use crate::io::ModelStore;

const MAGIC: &[u8; 4] = b"TXGN";

/// Current snapshot format version.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

/// Encodes the whole chain into a self-describing blob.
pub fn serialize(chain: &Chain) -> Result<Vec<u8>> {
	let mut header = Vec::with_capacity(HEADER_LEN);
	header.extend_from_slice(MAGIC);
	header.push(FORMAT_VERSION);
	postcard::to_extend(chain, header).map_err(|e| Error::Io(std::io::Error::other(e)))
}

/// Decodes a blob produced by `serialize`.
///
/// # Errors
/// Returns `Error::CorruptData` if the header is missing or of another
/// version, the payload does not decode, bytes are left over, or the decoded
/// chain breaks a structural invariant. Nothing is partially decoded.
pub fn deserialize(bytes: &[u8]) -> Result<Chain> {
	if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
		return Err(Error::CorruptData("missing TXGN header".to_owned()));
	}
	let version = bytes[MAGIC.len()];
	if version != FORMAT_VERSION {
		return Err(Error::CorruptData(format!(
			"unsupported format version {version} (expected {FORMAT_VERSION})"
		)));
	}

	let (chain, rest) = postcard::take_from_bytes::<Chain>(&bytes[HEADER_LEN..])
		.map_err(|e| Error::CorruptData(e.to_string()))?;
	if !rest.is_empty() {
		return Err(Error::CorruptData(format!("{} trailing bytes", rest.len())));
	}
	chain.validate().map_err(Error::CorruptData)?;
	Ok(chain)
}

/// Reads and decodes the chain stored at `path`.
pub fn load<S: ModelStore + ?Sized>(store: &S, path: &Path) -> Result<Chain> {
	let bytes = store.read(path)?;
	let chain = deserialize(&bytes)?;
	info!("Loaded model {} ({} nodes)", path.display(), chain.len());
	Ok(chain)
}

/// Encodes and writes the chain to `path`.
pub fn save<S: ModelStore + ?Sized>(store: &S, path: &Path, chain: &Chain) -> Result<()> {
	let bytes = serialize(chain)?;
	store.write(path, &bytes)?;
	info!("Saved model {} ({} nodes, {} bytes)", path.display(), chain.len(), bytes.len());
	Ok(())
}
