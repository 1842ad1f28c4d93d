use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::taxonomy::Taxonomy;
use crate::error::{KeywordError, Result};

/// Default number of keywords drawn from a category in per-category mode.
pub const DEFAULT_FIXED_COUNT: u32 = 3;

/// Generation policy of a single category.
///
/// Only used by `GenerationMode::PerCategoryPolicy`.
/// - `use_random == false`: draw exactly `fixed_count` keywords
/// - `use_random == true`: draw a random count in `[1, total_count]`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategorySetting {
	pub fixed_count: u32,
	pub use_random: bool,
}

impl Default for CategorySetting {
	fn default() -> Self {
		Self { fixed_count: DEFAULT_FIXED_COUNT, use_random: false }
	}
}

/// Per-category generation settings, keyed by category name.
///
/// Lookups are lenient: a category without an explicit setting behaves as
/// if it had the default one.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySettings {
	settings: HashMap<String, CategorySetting>,
}

impl CategorySettings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds default settings for every category of a taxonomy.
	pub fn for_taxonomy(taxonomy: &Taxonomy) -> Self {
		let mut settings = Self::new();
		settings.sync_with(taxonomy);
		settings
	}

	/// Returns the setting of `category`, inserting the default one if
	/// missing.
	pub fn get(&mut self, category: &str) -> CategorySetting {
		*self.settings.entry(category.to_owned()).or_default()
	}

	/// Read-only lookup, falling back to the default setting.
	pub fn peek(&self, category: &str) -> CategorySetting {
		self.settings.get(category).copied().unwrap_or_default()
	}

	/// Overwrites the setting of an existing category.
	///
	/// # Errors
	/// - `NotFound` if `category` is not part of `taxonomy`.
	/// - `InvalidCount` if `fixed_count` is negative (or too large).
	pub fn set(&mut self, taxonomy: &Taxonomy, category: &str, fixed_count: i64, use_random: bool) -> Result<()> {
		if !taxonomy.contains(category) {
			return Err(KeywordError::category_not_found(category));
		}
		let fixed_count = u32::try_from(fixed_count).map_err(|_| KeywordError::InvalidCount(fixed_count))?;
		self.settings.insert(category.to_owned(), CategorySetting { fixed_count, use_random });
		Ok(())
	}

	/// Inserts the default setting for `category` if it has none yet.
	pub(crate) fn ensure(&mut self, category: &str) {
		self.settings.entry(category.to_owned()).or_default();
	}

	/// Drops the setting of `category`. Idempotent.
	pub fn remove(&mut self, category: &str) {
		self.settings.remove(category);
	}

	/// Keeps settings of categories still present, drops the others and
	/// adds defaults for new ones.
	pub(crate) fn sync_with(&mut self, taxonomy: &Taxonomy) {
		self.settings.retain(|name, _| taxonomy.contains(name));
		for category in taxonomy.categories() {
			self.ensure(category.name());
		}
	}

	pub fn len(&self) -> usize {
		self.settings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.settings.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_get_inserts_default() {
		let mut settings = CategorySettings::new();
		assert!(settings.is_empty());
		assert_eq!(settings.get("风格"), CategorySetting { fixed_count: 3, use_random: false });
		assert_eq!(settings.len(), 1);
	}

	#[test]
	fn test_peek_does_not_insert() {
		let settings = CategorySettings::new();
		assert_eq!(settings.peek("风格"), CategorySetting::default());
		assert!(settings.is_empty());
	}

	#[test]
	fn test_set_validates() {
		let taxonomy = Taxonomy::seeded();
		let mut settings = CategorySettings::for_taxonomy(&taxonomy);
		assert_eq!(settings.len(), 8);

		assert!(matches!(settings.set(&taxonomy, "缺失", 1, false), Err(KeywordError::NotFound(_))));
		assert!(matches!(settings.set(&taxonomy, "风格", -1, false), Err(KeywordError::InvalidCount(-1))));
		assert_eq!(settings.peek("风格"), CategorySetting::default());

		settings.set(&taxonomy, "风格", 0, true).unwrap();
		assert_eq!(settings.peek("风格"), CategorySetting { fixed_count: 0, use_random: true });
	}

	#[test]
	fn test_remove_is_idempotent() {
		let taxonomy = Taxonomy::seeded();
		let mut settings = CategorySettings::for_taxonomy(&taxonomy);
		settings.remove("风格");
		settings.remove("风格");
		assert_eq!(settings.len(), 7);
	}

	#[test]
	fn test_sync_keeps_existing_settings() {
		let mut taxonomy = Taxonomy::new();
		taxonomy.add_category("a").unwrap();
		taxonomy.add_category("b").unwrap();
		let mut settings = CategorySettings::for_taxonomy(&taxonomy);
		settings.set(&taxonomy, "a", 7, false).unwrap();

		taxonomy.delete_category("b").unwrap();
		taxonomy.add_category("c").unwrap();
		settings.sync_with(&taxonomy);

		assert_eq!(settings.len(), 2);
		assert_eq!(settings.peek("a").fixed_count, 7);
		assert_eq!(settings.peek("c"), CategorySetting::default());
	}
}
