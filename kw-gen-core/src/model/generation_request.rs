use serde::{Deserialize, Serialize};

/// Sampling policy used by `Generator`.
///
/// # Variants
/// - `Uniform`: every draw picks a selected category uniformly, then one
///   weighted keyword from it.
/// - `Balanced`: splits the requested count evenly across the selected
///   categories, then tops up the shortfall from one random category.
/// - `PerCategoryPolicy`: each category draws the count given by its
///   `CategorySetting`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
	#[default]
	Uniform,
	Balanced,
	PerCategoryPolicy,
}

impl GenerationMode {
	pub const ALL: [GenerationMode; 3] =
		[GenerationMode::Uniform, GenerationMode::Balanced, GenerationMode::PerCategoryPolicy];

	/// Maps the "balance categories" toggle onto a mode.
	pub fn from_balance(balance_mode: bool) -> Self {
		if balance_mode { Self::Balanced } else { Self::Uniform }
	}
}

/// How a generated sequence is joined into text.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
	#[default]
	SingleLine,
	CommaSeparated,
	MultiLine,
}

impl OutputFormat {
	pub const ALL: [OutputFormat; 3] = [OutputFormat::SingleLine, OutputFormat::CommaSeparated, OutputFormat::MultiLine];

	pub fn separator(self) -> &'static str {
		match self {
			Self::SingleLine => " ",
			Self::CommaSeparated => ", ",
			Self::MultiLine => "\n",
		}
	}

	/// Joins keywords with the separator of this format.
	pub fn join<S: AsRef<str>>(self, keywords: &[S]) -> String {
		let parts: Vec<&str> = keywords.iter().map(|k| k.as_ref()).collect();
		parts.join(self.separator())
	}

	/// Display label, as shown in the format picker.
	pub fn label(self) -> &'static str {
		match self {
			Self::SingleLine => "单行",
			Self::CommaSeparated => "逗号分隔",
			Self::MultiLine => "多行",
		}
	}

	/// Inverse of `label`.
	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|f| f.label() == label)
	}
}

/// Parameters of one generation call.
///
/// Counts are signed because they usually come from user input; the
/// generator rejects negative values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
	/// Category names to draw from. Duplicates are ignored.
	pub selected_categories: Vec<String>,

	/// Requested number of keywords.
	pub total_count: i64,

	pub mode: GenerationMode,

	pub output_format: OutputFormat,
}

impl GenerationRequest {
	/// Creates a request in uniform or balanced mode.
	pub fn new<I, S>(selected_categories: I, total_count: i64, balance_mode: bool, output_format: OutputFormat) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			selected_categories: selected_categories.into_iter().map(Into::into).collect(),
			total_count,
			mode: GenerationMode::from_balance(balance_mode),
			output_format,
		}
	}

	pub fn with_mode(mut self, mode: GenerationMode) -> Self {
		self.mode = mode;
		self
	}
}
