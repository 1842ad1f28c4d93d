use std::fmt;
use std::path::Path;

use rand::Rng;

use crate::document::{self, Snapshot};
use crate::error::Result;
use crate::model::category_settings::{CategorySetting, CategorySettings};
use crate::model::generation_request::GenerationRequest;
use crate::model::generator::Generator;
use crate::model::taxonomy::Taxonomy;

/// Change notification sent to listeners after a successful mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	CategoryAdded(String),
	CategoryDeleted(String),
	KeywordAdded { category: String, text: String, weight: i64 },
	KeywordsDeleted { category: String, text: String, count: usize },
	SettingUpdated { category: String, setting: CategorySetting },
	TaxonomyReplaced,
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

/// Application state: the taxonomy, its per-category settings and the
/// listeners to notify when either changes.
///
/// # Responsibilities
/// - Expose every operation the presentation layer may call
/// - Keep settings in step with categories (created with a category,
///   removed with it, re-synchronized when the taxonomy is replaced)
/// - Notify listeners once per successful mutation, never on failure
///
/// A failed call leaves the session untouched.
pub struct Session {
	taxonomy: Taxonomy,
	settings: CategorySettings,
	listeners: Vec<Listener>,
}

impl Default for Session {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("taxonomy", &self.taxonomy)
			.field("settings", &self.settings)
			.field("listeners", &self.listeners.len())
			.finish()
	}
}

impl Session {
	/// Creates a session seeded with the default vocabulary.
	pub fn new() -> Self {
		Self::from_taxonomy(Taxonomy::seeded())
	}

	/// Creates a session without any category.
	pub fn empty() -> Self {
		Self::from_taxonomy(Taxonomy::new())
	}

	/// Creates a session with default settings for every category.
	pub fn from_taxonomy(taxonomy: Taxonomy) -> Self {
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		Self { taxonomy, settings, listeners: Vec::new() }
	}

	pub fn from_snapshot(snapshot: Snapshot) -> Self {
		let Snapshot { taxonomy, mut settings } = snapshot;
		settings.sync_with(&taxonomy);
		Self { taxonomy, settings, listeners: Vec::new() }
	}

	pub fn taxonomy(&self) -> &Taxonomy {
		&self.taxonomy
	}

	pub fn settings(&self) -> &CategorySettings {
		&self.settings
	}

	/// Registers a callback invoked after every successful mutation.
	pub fn on_change<F>(&mut self, listener: F)
	where
		F: FnMut(&SessionEvent) + 'static,
	{
		self.listeners.push(Box::new(listener));
	}

	fn notify(&mut self, event: SessionEvent) {
		log::debug!("Session event: {event:?}");
		for listener in &mut self.listeners {
			listener(&event);
		}
	}

	pub fn add_category(&mut self, name: &str) -> Result<()> {
		self.taxonomy.add_category(name)?;
		let name = name.trim().to_owned();
		self.settings.ensure(&name);
		self.notify(SessionEvent::CategoryAdded(name));
		Ok(())
	}

	pub fn delete_category(&mut self, name: &str) -> Result<()> {
		self.taxonomy.delete_category(name)?;
		self.settings.remove(name);
		self.notify(SessionEvent::CategoryDeleted(name.to_owned()));
		Ok(())
	}

	pub fn add_keyword(&mut self, category: &str, text: &str, weight: i64) -> Result<()> {
		self.taxonomy.add_keyword(category, text, weight)?;
		self.notify(SessionEvent::KeywordAdded { category: category.to_owned(), text: text.to_owned(), weight });
		Ok(())
	}

	/// Removes every entry of `category` whose text is `text`.
	///
	/// Returns the number of removed entries.
	pub fn delete_keyword(&mut self, category: &str, text: &str) -> Result<usize> {
		let count = self.taxonomy.delete_keyword(category, text)?;
		self.notify(SessionEvent::KeywordsDeleted { category: category.to_owned(), text: text.to_owned(), count });
		Ok(count)
	}

	/// Returns the generation setting of `category`, creating the default
	/// one if missing.
	pub fn setting(&mut self, category: &str) -> CategorySetting {
		self.settings.get(category)
	}

	pub fn update_setting(&mut self, category: &str, fixed_count: i64, use_random: bool) -> Result<()> {
		self.settings.set(&self.taxonomy, category, fixed_count, use_random)?;
		let setting = self.settings.peek(category);
		self.notify(SessionEvent::SettingUpdated { category: category.to_owned(), setting });
		Ok(())
	}

	pub fn generator(&self) -> Generator<'_> {
		Generator::new(&self.taxonomy, &self.settings)
	}

	/// Generates keywords using the thread-local RNG.
	pub fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>> {
		self.generate_with(&mut rand::rng(), request)
	}

	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, request: &GenerationRequest) -> Result<Vec<String>> {
		self.generator().generate(request, rng)
	}

	/// Generates keywords and joins them using the request's output format.
	pub fn generate_text(&self, request: &GenerationRequest) -> Result<String> {
		self.generator().generate_text(request, &mut rand::rng())
	}

	/// Serializes the taxonomy as a JSON document.
	pub fn serialize(&self) -> Result<String> {
		document::to_json(&self.taxonomy)
	}

	/// Replaces the whole taxonomy with the content of a JSON document.
	///
	/// Settings of categories that survive the replacement are kept.
	pub fn deserialize(&mut self, data: &str) -> Result<()> {
		let taxonomy = document::from_json(data)?;
		self.replace_taxonomy(taxonomy);
		Ok(())
	}

	pub fn save_document<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		document::save_json(path, &self.taxonomy)
	}

	pub fn load_document<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let taxonomy = document::load_json(path)?;
		self.replace_taxonomy(taxonomy);
		Ok(())
	}

	fn replace_taxonomy(&mut self, taxonomy: Taxonomy) {
		self.taxonomy = taxonomy;
		self.settings.sync_with(&self.taxonomy);
		self.notify(SessionEvent::TaxonomyReplaced);
	}

	pub fn snapshot(&self) -> Snapshot {
		Snapshot { taxonomy: self.taxonomy.clone(), settings: self.settings.clone() }
	}

	pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		self.snapshot().save(path)
	}

	/// Replaces both the taxonomy and the settings with a saved snapshot.
	pub fn load_snapshot<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let Snapshot { taxonomy, settings } = Snapshot::load(path)?;
		self.settings = settings;
		self.replace_taxonomy(taxonomy);
		Ok(())
	}
}
