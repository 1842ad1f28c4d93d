use std::fs;
use std::path::Path;

use crate::error::{KeywordError, Result};

/// Reads a whole UTF-8 file into memory.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> Result<String> {
	let path = filename.as_ref();
	fs::read_to_string(path).map_err(|e| KeywordError::io(path, e))
}

/// Reads a whole file as raw bytes.
pub(crate) fn read_bytes<P: AsRef<Path>>(filename: P) -> Result<Vec<u8>> {
	let path = filename.as_ref();
	fs::read(path).map_err(|e| KeywordError::io(path, e))
}

/// Writes `contents` to `filename`, creating missing parent directories.
///
/// The file is truncated if it already exists.
pub(crate) fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(filename: P, contents: C) -> Result<()> {
	let path = filename.as_ref();
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|e| KeywordError::io(parent, e))?;
	}
	fs::write(path, contents).map_err(|e| KeywordError::io(path, e))
}
