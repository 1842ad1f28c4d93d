use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::category::{Category, KeywordEntry};
use crate::error::{KeywordError, Result};

/// Default vocabulary the application starts with.
///
/// Every entry has weight 1.
const SEED: &[(&str, &[&str])] = &[
	("风格", &["拟真", "近未来", "超现实", "写实", "参数化", "复古", "文化", "太空歌剧"]),
	("可得性", &["稀缺", "定制", "量产", "日用", "限量", "开源"]),
	("使用频率", &["工业耗材", "重度使用", "定期使用", "一次性", "多用途", "特定场景", "通用"]),
	("耐用性", &["易碎", "户外", "标准件", "展品", "实验性", "原型", "极端", "回收", "自修复"]),
	("类型", &["商品", "工具", "义肢", "载具", "电脑", "PPE", "防护", "装备", "医疗", "娱乐", "战术"]),
	(
		"外观特征",
		&[
			"透明", "复古", "重工业", "机械联动", "齿轮", "光纤", "能量场", "生物", "模拟", "EDC",
			"电路", "动态", "情绪", "混搭",
		],
	),
	("重点倾向", &["内构", "外饰", "功能", "隐蔽", "美学", "叙事"]),
	(
		"特殊词条",
		&["蒙太奇", "类比", "拟物", "讽刺", "荒谬", "哲学/伦理设计", "隐喻", "跨领域", "乌托邦/反乌托邦"],
	),
];

/// The full set of categories and their keyword entries.
///
/// Behaves as an ordered map from category name to `Category`: lookups are
/// by name, iteration follows insertion order.
///
/// # Responsibilities
/// - Category CRUD (add / delete)
/// - Keyword CRUD inside a category
/// - (De)serialization as a map of `name -> [[text, weight], ...]`
///
/// # Invariants
/// - Category names are non-empty and unique
/// - Every keyword weight is `>= 1` (enforced by `KeywordEntry`)
///
/// Category settings are not tracked here; `Session` keeps them in sync.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Taxonomy {
	categories: Vec<Category>,
}

impl Taxonomy {
	/// Returns an empty taxonomy.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the default design vocabulary (8 categories).
	pub fn seeded() -> Self {
		let categories = SEED
			.iter()
			.map(|(name, words)| {
				let entries = words.iter().filter_map(|w| KeywordEntry::new(*w, 1).ok()).collect();
				Category::with_entries(*name, entries)
			})
			.collect();
		Self { categories }
	}

	pub fn len(&self) -> usize {
		self.categories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.categories.is_empty()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.position(name).is_some()
	}

	pub fn category(&self, name: &str) -> Option<&Category> {
		self.categories.iter().find(|c| c.name() == name)
	}

	/// Iterates over categories in insertion order.
	pub fn categories(&self) -> impl Iterator<Item = &Category> {
		self.categories.iter()
	}

	pub fn category_names(&self) -> Vec<String> {
		self.categories.iter().map(|c| c.name().to_owned()).collect()
	}

	fn position(&self, name: &str) -> Option<usize> {
		self.categories.iter().position(|c| c.name() == name)
	}

	fn category_mut(&mut self, name: &str) -> Result<&mut Category> {
		self.categories
			.iter_mut()
			.find(|c| c.name() == name)
			.ok_or_else(|| KeywordError::category_not_found(name))
	}

	/// Appends a new, empty category.
	///
	/// The name is trimmed before use.
	///
	/// # Errors
	/// - `EmptyName` if the trimmed name is empty.
	/// - `DuplicateCategory` if a category with that name already exists.
	pub fn add_category(&mut self, name: &str) -> Result<()> {
		let name = name.trim();
		if name.is_empty() {
			return Err(KeywordError::EmptyName("Category name"));
		}
		if self.contains(name) {
			return Err(KeywordError::DuplicateCategory(name.to_owned()));
		}
		self.categories.push(Category::new(name));
		Ok(())
	}

	/// Removes a category and all of its keywords.
	///
	/// # Errors
	/// Returns `NotFound` if the category does not exist.
	pub fn delete_category(&mut self, name: &str) -> Result<Category> {
		let index = self.position(name).ok_or_else(|| KeywordError::category_not_found(name))?;
		Ok(self.categories.remove(index))
	}

	/// Appends a keyword to a category. Duplicates are permitted.
	///
	/// # Errors
	/// - `NotFound` if the category does not exist.
	/// - `InvalidWeight` if `weight < 1`.
	pub fn add_keyword(&mut self, category: &str, text: &str, weight: i64) -> Result<()> {
		let category = self.category_mut(category)?;
		let entry = KeywordEntry::new(text, weight)?;
		category.push(entry);
		Ok(())
	}

	/// Removes every entry of `category` whose text equals `text`.
	///
	/// Entries sharing the same text but carrying different weights are all
	/// removed together. Removing a text that is not present is not an error.
	///
	/// # Errors
	/// Returns `NotFound` if the category does not exist.
	pub fn delete_keyword(&mut self, category: &str, text: &str) -> Result<usize> {
		Ok(self.category_mut(category)?.remove_text(text))
	}
}

impl Serialize for Taxonomy {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.categories.len()))?;
		for category in &self.categories {
			map.serialize_entry(category.name(), category.entries())?;
		}
		map.end()
	}
}

struct TaxonomyVisitor;

impl<'de> Visitor<'de> for TaxonomyVisitor {
	type Value = Taxonomy;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a map of category name to a list of [text, weight] pairs")
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Taxonomy, A::Error> {
		use serde::de::Error;

		let mut taxonomy = Taxonomy::new();
		while let Some((name, entries)) = access.next_entry::<String, Vec<KeywordEntry>>()? {
			if name.trim().is_empty() {
				return Err(A::Error::custom("category name cannot be empty"));
			}
			if taxonomy.contains(&name) {
				return Err(A::Error::custom(format!("duplicate category '{name}'")));
			}
			taxonomy.categories.push(Category::with_entries(name, entries));
		}
		Ok(taxonomy)
	}
}

impl<'de> Deserialize<'de> for Taxonomy {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		deserializer.deserialize_map(TaxonomyVisitor)
	}
}
