use rand::Rng;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{KeywordError, Result};

/// A single keyword and its relative selection weight.
///
/// Serialized as a 2-element sequence `[text, weight]`, which is the shape
/// used by the taxonomy document.
///
/// ## Invariants
/// - `weight >= 1`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordEntry {
	text: String,
	weight: u32,
}

impl KeywordEntry {
	/// Creates a new entry.
	///
	/// The weight is taken as a signed integer because it usually comes
	/// straight from user input.
	///
	/// # Errors
	/// - `InvalidWeight` if `weight < 1` or does not fit in 32 bits.
	/// - `EmptyName` if `text` is empty or only whitespace.
	pub fn new(text: impl Into<String>, weight: i64) -> Result<Self> {
		let text = text.into();
		if text.trim().is_empty() {
			return Err(KeywordError::EmptyName("Keyword"));
		}
		let weight = u32::try_from(weight)
			.ok()
			.filter(|w| *w >= 1)
			.ok_or(KeywordError::InvalidWeight(weight))?;
		Ok(Self { text, weight })
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn weight(&self) -> u32 {
		self.weight
	}
}

impl Serialize for KeywordEntry {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		(&self.text, i64::from(self.weight)).serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for KeywordEntry {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let (text, weight) = <(String, i64)>::deserialize(deserializer)?;
		KeywordEntry::new(text, weight).map_err(D::Error::custom)
	}
}

/// A named bucket of weighted keywords.
///
/// Entries keep their insertion order so that listings stay stable between
/// refreshes. Duplicate texts are allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
	name: String,
	entries: Vec<KeywordEntry>,
}

impl Category {
	/// Creates an empty category.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), entries: Vec::new() }
	}

	pub(crate) fn with_entries(name: impl Into<String>, entries: Vec<KeywordEntry>) -> Self {
		Self { name: name.into(), entries }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn entries(&self) -> &[KeywordEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Sum of all weights, i.e. the size of the equivalent expanded pool
	/// where each text is repeated `weight` times.
	pub fn total_weight(&self) -> u64 {
		self.entries.iter().map(|e| u64::from(e.weight)).sum()
	}

	pub(crate) fn push(&mut self, entry: KeywordEntry) {
		self.entries.push(entry);
	}

	/// Removes every entry whose text is exactly `text`, whatever its weight.
	///
	/// Returns how many entries were removed.
	pub(crate) fn remove_text(&mut self, text: &str) -> usize {
		let before = self.entries.len();
		self.entries.retain(|e| e.text != text);
		before - self.entries.len()
	}

	/// Picks one keyword using weighted random sampling.
	///
	/// The probability of selecting an entry is `weight / total_weight`.
	/// Draws are independent (with replacement).
	///
	/// This method performs:
	/// - an O(n) scan over the entries
	/// - a cumulative subtraction to select a bucket
	///
	/// Returns `None` if the category has no entries.
	pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		let total = self.total_weight();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for entry in &self.entries {
			let weight = u64::from(entry.weight);
			if r < weight {
				return Some(entry.text.as_str());
			}
			r -= weight;
		}

		// Unreachable while weights sum to `total`
		self.entries.last().map(|e| e.text.as_str())
	}
}
