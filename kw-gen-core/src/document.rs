//! On-disk formats.
//!
//! Two formats are supported:
//! - the taxonomy document, a JSON object mapping each category name to a
//!   list of `[text, weight]` pairs (interchange format, taxonomy only)
//! - the session snapshot, a compact `postcard` dump of the taxonomy and
//!   the per-category settings, used to restore a session across restarts

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KeywordError, Result};
use crate::io;
use crate::model::category_settings::CategorySettings;
use crate::model::taxonomy::Taxonomy;

/// Serializes a taxonomy as a JSON document.
///
/// Category order and keyword order are preserved. Non-ASCII text is
/// written as-is.
///
/// # Errors
/// `Encode` if the encoder fails.
pub fn to_json(taxonomy: &Taxonomy) -> Result<String> {
	serde_json::to_string_pretty(taxonomy).map_err(|e| KeywordError::Encode(e.to_string()))
}

/// Parses a JSON taxonomy document.
///
/// # Errors
/// `MalformedDocument` if the root is not an object, a category is not a
/// list, an entry is not a `[string, integer]` pair, a weight is `< 1`, or
/// a category name is empty or repeated.
pub fn from_json(data: &str) -> Result<Taxonomy> {
	serde_json::from_str(data).map_err(|e| KeywordError::MalformedDocument(e.to_string()))
}

/// Writes a taxonomy document to `path`.
pub fn save_json<P: AsRef<Path>>(path: P, taxonomy: &Taxonomy) -> Result<()> {
	let json = to_json(taxonomy)?;
	io::write_file(&path, json)?;
	log::info!("Taxonomy saved to {}", path.as_ref().display());
	Ok(())
}

/// Reads a taxonomy document from `path`.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Taxonomy> {
	let taxonomy = from_json(&io::read_file(&path)?)?;
	log::info!("Taxonomy loaded from {} ({} categories)", path.as_ref().display(), taxonomy.len());
	Ok(taxonomy)
}

/// Everything needed to restore a session.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
	pub taxonomy: Taxonomy,
	pub settings: CategorySettings,
}

impl Snapshot {
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		postcard::to_stdvec(self).map_err(|e| KeywordError::Encode(e.to_string()))
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		postcard::from_bytes(bytes).map_err(|e| KeywordError::MalformedDocument(e.to_string()))
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		io::write_file(&path, self.to_bytes()?)?;
		log::info!("Session snapshot saved to {}", path.as_ref().display());
		Ok(())
	}

	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let snapshot = Self::from_bytes(&io::read_bytes(&path)?)?;
		log::info!("Session snapshot loaded from {}", path.as_ref().display());
		Ok(snapshot)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_round_trip_single_category() {
		let mut taxonomy = Taxonomy::new();
		taxonomy.add_category("风格").unwrap();
		taxonomy.add_keyword("风格", "拟真", 1).unwrap();

		let json = to_json(&taxonomy).unwrap();
		assert!(json.contains("拟真"), "non-ASCII text should not be escaped: {json}");
		assert_eq!(from_json(&json).unwrap(), taxonomy);
	}

	#[test]
	fn test_round_trip_seeded() {
		let taxonomy = Taxonomy::seeded();
		assert_eq!(from_json(&to_json(&taxonomy).unwrap()).unwrap(), taxonomy);
	}

	#[test]
	fn test_reads_legacy_document() {
		let json = r#"{"风格": [["拟真", 1], ["近未来", 2]], "可得性": []}"#;
		let taxonomy = from_json(json).unwrap();
		assert_eq!(taxonomy.category_names(), vec!["风格", "可得性"]);
		assert_eq!(taxonomy.category("风格").unwrap().total_weight(), 3);
	}

	#[test]
	fn test_malformed_documents() {
		for json in [
			"",
			"[]",
			r#"{"风格": "拟真"}"#,
			r#"{"风格": [["拟真"]]}"#,
			r#"{"风格": [["拟真", 1, 2]]}"#,
			r#"{"风格": [["拟真", "1"]]}"#,
			r#"{"风格": [[1, 1]]}"#,
			r#"{"风格": [["拟真", 0]]}"#,
			r#"{"风格": [["拟真", -2]]}"#,
			r#"{"风格": [], "风格": []}"#,
			r#"{" \t ": []}"#,
			r#"{"风格": [["   ", 1]]}"#,
		] {
			assert!(
				matches!(from_json(json), Err(KeywordError::MalformedDocument(_))),
				"accepted malformed document {json:?}"
			);
		}
	}

	#[test]
	fn test_snapshot_round_trip_keeps_settings() {
		let taxonomy = Taxonomy::seeded();
		let mut settings = CategorySettings::for_taxonomy(&taxonomy);
		settings.set(&taxonomy, "风格", 5, true).unwrap();
		let snapshot = Snapshot { taxonomy, settings };

		let back = Snapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
		assert_eq!(back, snapshot);
		assert_eq!(back.settings.peek("风格").fixed_count, 5);
	}

	#[test]
	fn test_snapshot_rejects_garbage() {
		assert!(matches!(Snapshot::from_bytes(&[0xff, 0xff, 0xff]), Err(KeywordError::MalformedDocument(_))));
	}
}
