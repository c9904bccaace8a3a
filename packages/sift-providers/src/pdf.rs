//! Local checks run on a document before it is sent for extraction.

use std::path::Path;

use crate::{Error, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";
const ENCRYPT_KEY: &[u8] = b"/Encrypt";
/// Readers accept a header that starts anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1_024;

/// Reads the file and classifies it. Missing paths and directories are `NotFound`.
pub async fn preflight(path: &Path) -> Result<Vec<u8>> {
	let is_file = tokio::fs::metadata(path).await.map(|meta| meta.is_file()).unwrap_or(false);

	if !is_file {
		return Err(Error::NotFound { path: path.to_path_buf() });
	}

	let bytes = tokio::fs::read(path).await.map_err(|err| match err.kind() {
		std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied =>
			Error::NotFound { path: path.to_path_buf() },
		_ => Error::ReadDocument { path: path.to_path_buf(), source: err },
	})?;

	inspect(path, &bytes)?;

	Ok(bytes)
}

pub fn inspect(path: &Path, bytes: &[u8]) -> Result<()> {
	let window = &bytes[..bytes.len().min(HEADER_WINDOW)];

	if !contains(window, PDF_MAGIC) {
		return Err(Error::UnsupportedFormat {
			message: format!("Invalid PDF format: {path:?} has no PDF header."),
		});
	}
	if is_encrypted(bytes) {
		return Err(Error::Encrypted { path: path.to_path_buf() });
	}

	Ok(())
}

fn is_encrypted(bytes: &[u8]) -> bool {
	bytes.windows(ENCRYPT_KEY.len() + 1).any(|window| {
		window.starts_with(ENCRYPT_KEY) && !window[ENCRYPT_KEY.len()].is_ascii_alphanumeric()
	})
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
	haystack.windows(needle.len()).any(|window| window == needle)
}
