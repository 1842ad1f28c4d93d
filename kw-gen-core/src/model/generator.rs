use std::cmp::{max, min};

use rand::Rng;
use rand::seq::IndexedRandom;

use super::category::Category;
use super::category_settings::CategorySettings;
use super::generation_request::{GenerationMode, GenerationRequest};
use super::taxonomy::Taxonomy;
use crate::error::{KeywordError, Result};

/// Stateless keyword generator over a taxonomy and its settings.
///
/// # Responsibilities
/// - Validate a `GenerationRequest` before drawing anything
/// - Draw weighted keywords according to the request's `GenerationMode`
/// - Format the result according to the request's `OutputFormat`
///
/// The generator only borrows its inputs; it never mutates them.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
	taxonomy: &'a Taxonomy,
	settings: &'a CategorySettings,
}

impl<'a> Generator<'a> {
	pub fn new(taxonomy: &'a Taxonomy, settings: &'a CategorySettings) -> Self {
		Self { taxonomy, settings }
	}

	/// Checks a request and resolves its selected categories.
	///
	/// # Returns
	/// - The selected categories, in selection order, without duplicates
	/// - The requested count as `usize`
	///
	/// # Errors
	/// `InvalidRequest` if the selection is empty, names an unknown category
	/// or the count is negative.
	fn resolve(&self, request: &GenerationRequest) -> Result<(Vec<&'a Category>, usize)> {
		if request.selected_categories.is_empty() {
			return Err(KeywordError::InvalidRequest("at least one category must be selected".to_owned()));
		}
		let total = usize::try_from(request.total_count).map_err(|_| {
			KeywordError::InvalidRequest(format!("keyword count must not be negative, got {}", request.total_count))
		})?;

		let mut categories: Vec<&'a Category> = Vec::with_capacity(request.selected_categories.len());
		for name in &request.selected_categories {
			let category = self
				.taxonomy
				.category(name)
				.ok_or_else(|| KeywordError::InvalidRequest(format!("unknown category '{name}'")))?;
			if !categories.iter().any(|c| c.name() == category.name()) {
				categories.push(category);
			}
		}

		Ok((categories, total))
	}

	/// Generates a keyword sequence.
	///
	/// # Behavior
	/// - `total_count == 0` returns an empty sequence whatever the mode.
	/// - Categories without keywords contribute nothing. A selection made only
	///   of empty categories yields an empty sequence.
	/// - All draws are with replacement; a keyword may appear several times.
	///
	/// # Errors
	/// `InvalidRequest` if the request is invalid. Nothing is drawn in that
	/// case.
	pub fn generate<R: Rng + ?Sized>(&self, request: &GenerationRequest, rng: &mut R) -> Result<Vec<String>> {
		let (categories, total) = self.resolve(request)?;
		if total == 0 || categories.iter().all(|c| c.is_empty()) {
			return Ok(Vec::new());
		}

		let generated = match request.mode {
			GenerationMode::Uniform => Self::draw_uniform(&categories, total, rng),
			GenerationMode::Balanced => Self::draw_balanced(&categories, total, rng),
			GenerationMode::PerCategoryPolicy => self.draw_per_category(&categories, total, rng),
		};

		log::debug!(
			"Generated {} keyword(s) from {} category(ies) in {:?} mode (requested {})",
			generated.len(),
			categories.len(),
			request.mode,
			total
		);
		Ok(generated)
	}

	/// Generates a keyword sequence and joins it using the request's format.
	pub fn generate_text<R: Rng + ?Sized>(&self, request: &GenerationRequest, rng: &mut R) -> Result<String> {
		let generated = self.generate(request, rng)?;
		Ok(request.output_format.join(&generated))
	}

	/// Appends `count` weighted draws from `category` to `out`.
	///
	/// Does nothing if the category is empty.
	fn draw_into<R: Rng + ?Sized>(category: &Category, count: usize, rng: &mut R, out: &mut Vec<String>) {
		for _ in 0..count {
			match category.pick(rng) {
				Some(word) => out.push(word.to_owned()),
				None => return,
			}
		}
	}

	/// Each draw picks a category uniformly, whatever its size, then one
	/// keyword from it.
	fn draw_uniform<R: Rng + ?Sized>(categories: &[&Category], total: usize, rng: &mut R) -> Vec<String> {
		let mut generated = Vec::new();
		for _ in 0..total {
			if let Some(category) = categories.choose(rng) {
				Self::draw_into(category, 1, rng, &mut generated);
			}
		}
		generated
	}

	/// Draws `max(1, total / n)` keywords per category, then tops up any
	/// shortfall from one randomly chosen non-empty category.
	///
	/// When `total < n` every category still yields one keyword, so the
	/// result can be longer than `total`.
	fn draw_balanced<R: Rng + ?Sized>(categories: &[&Category], total: usize, rng: &mut R) -> Vec<String> {
		let count_per_category = max(1, total / categories.len());
		let mut generated = Vec::new();
		for category in categories {
			Self::draw_into(category, count_per_category, rng, &mut generated);
		}

		if generated.len() < total {
			let remaining = total - generated.len();
			let candidates: Vec<&Category> = categories.iter().copied().filter(|c| !c.is_empty()).collect();
			if let Some(category) = candidates.choose(rng) {
				Self::draw_into(category, remaining, rng, &mut generated);
			}
		}
		generated
	}

	/// Draws, per category, its fixed count or a random count in
	/// `[1, total]`, capped at the category's pool size.
	fn draw_per_category<R: Rng + ?Sized>(&self, categories: &[&Category], total: usize, rng: &mut R) -> Vec<String> {
		let mut generated = Vec::new();
		for category in categories {
			let setting = self.settings.peek(category.name());
			let count = if setting.use_random {
				rng.random_range(1..=total)
			} else {
				setting.fixed_count as usize
			};
			let pool_size = usize::try_from(category.total_weight()).unwrap_or(usize::MAX);
			Self::draw_into(category, min(count, pool_size), rng, &mut generated);
		}
		generated
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::generation_request::OutputFormat;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn taxonomy(layout: &[(&str, &[(&str, i64)])]) -> Taxonomy {
		let mut taxonomy = Taxonomy::new();
		for (name, entries) in layout {
			taxonomy.add_category(name).unwrap();
			for (text, weight) in *entries {
				taxonomy.add_keyword(name, text, *weight).unwrap();
			}
		}
		taxonomy
	}

	fn request(selected: &[&str], total: i64, mode: GenerationMode) -> GenerationRequest {
		GenerationRequest::new(selected.iter().copied(), total, false, OutputFormat::SingleLine).with_mode(mode)
	}

	fn rng() -> StdRng {
		StdRng::seed_from_u64(7)
	}

	#[test]
	fn test_zero_count_is_empty_in_every_mode() {
		let taxonomy = taxonomy(&[("风格", &[("拟真", 1)]), ("可得性", &[("稀缺", 1)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);

		for mode in GenerationMode::ALL {
			let result = generator.generate(&request(&["风格", "可得性"], 0, mode), &mut rng()).unwrap();
			assert!(result.is_empty(), "{mode:?} produced {result:?}");
		}
	}

	#[test]
	fn test_invalid_requests() {
		let taxonomy = taxonomy(&[("风格", &[("拟真", 1)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);

		for req in [
			request(&[], 3, GenerationMode::Uniform),
			request(&["风格"], -1, GenerationMode::Balanced),
			request(&["风格", "缺失"], 3, GenerationMode::PerCategoryPolicy),
		] {
			assert!(matches!(generator.generate(&req, &mut rng()), Err(KeywordError::InvalidRequest(_))));
		}
	}

	#[test]
	fn test_empty_category_contributes_nothing() {
		let taxonomy = taxonomy(&[("空", &[]), ("风格", &[("拟真", 1)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);

		for mode in GenerationMode::ALL {
			let only_empty = generator.generate(&request(&["空"], 5, mode), &mut rng()).unwrap();
			assert!(only_empty.is_empty(), "{mode:?} produced {only_empty:?}");

			let mixed = generator.generate(&request(&["空", "风格"], 6, mode), &mut rng()).unwrap();
			assert!(mixed.iter().all(|w| w == "拟真"));
		}
	}

	#[test]
	fn test_huge_count_does_not_preallocate() {
		let taxonomy = taxonomy(&[("空", &[]), ("风格", &[("拟真", 2), ("复古", 1)])]);
		let mut settings = CategorySettings::for_taxonomy(&taxonomy);
		settings.set(&taxonomy, "风格", 0, true).unwrap();
		let generator = Generator::new(&taxonomy, &settings);

		for mode in GenerationMode::ALL {
			let generated = generator.generate(&request(&["空"], i64::MAX, mode), &mut rng()).unwrap();
			assert!(generated.is_empty(), "{mode:?} produced {generated:?}");
		}

		// The random count lands somewhere in [1, i64::MAX] and is capped by the pool of 3
		let req = request(&["空", "风格"], i64::MAX, GenerationMode::PerCategoryPolicy);
		for seed in 0..20 {
			let generated = generator.generate(&req, &mut StdRng::seed_from_u64(seed)).unwrap();
			assert!((1..=3).contains(&generated.len()), "seed {seed} produced {generated:?}");
		}
	}

	#[test]
	fn test_uniform_category_choice_ignores_pool_size() {
		// "风格" has a pool 100 times larger than "可得性"
		let taxonomy = taxonomy(&[("风格", &[("拟真", 50), ("写实", 50)]), ("可得性", &[("稀缺", 1)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);
		let req = request(&["风格", "可得性"], 100, GenerationMode::Uniform);

		let mut rng = rng();
		let mut from_availability = 0usize;
		let mut draws = 0usize;
		for _ in 0..200 {
			let generated = generator.generate(&req, &mut rng).unwrap();
			assert_eq!(generated.len(), 100);
			draws += generated.len();
			from_availability += generated.iter().filter(|w| *w == "稀缺").count();
		}

		let freq = from_availability as f64 / draws as f64;
		assert!((freq - 0.5).abs() < 0.02, "category frequency {freq} too far from 0.5");
	}

	#[test]
	fn test_uniform_keyword_frequency_follows_weights() {
		let taxonomy = taxonomy(&[("风格", &[("拟真", 1), ("写实", 4)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);

		let generated = generator.generate(&request(&["风格"], 50_000, GenerationMode::Uniform), &mut rng()).unwrap();
		let freq = generated.iter().filter(|w| *w == "写实").count() as f64 / generated.len() as f64;
		assert!((freq - 0.8).abs() < 0.01, "keyword frequency {freq} too far from 0.8");
	}

	#[test]
	fn test_balanced_split_and_top_up() {
		let taxonomy = taxonomy(&[("a", &[("a1", 1), ("a2", 2)]), ("b", &[("b1", 1)]), ("c", &[("c1", 3)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);
		let req = request(&["a", "b", "c"], 10, GenerationMode::Balanced);

		let mut rng = rng();
		for _ in 0..50 {
			let generated = generator.generate(&req, &mut rng).unwrap();
			assert_eq!(generated.len(), 10);

			let per_category = [
				generated.iter().filter(|w| w.starts_with('a')).count(),
				generated.iter().filter(|w| w.starts_with('b')).count(),
				generated.iter().filter(|w| w.starts_with('c')).count(),
			];
			let mut sorted = per_category;
			sorted.sort_unstable();
			assert_eq!(sorted, [3, 3, 4], "unexpected split {per_category:?}");

			// The first 9 draws come from the categories in selection order
			assert!(generated[..3].iter().all(|w| w.starts_with('a')));
			assert!(generated[3..6].iter().all(|w| w.starts_with('b')));
			assert!(generated[6..9].iter().all(|w| w.starts_with('c')));
		}
	}

	#[test]
	fn test_balanced_count_smaller_than_selection() {
		let taxonomy = taxonomy(&[("a", &[("a1", 1)]), ("b", &[("b1", 1)]), ("c", &[("c1", 1)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);

		let generated = generator.generate(&request(&["a", "b", "c"], 2, GenerationMode::Balanced), &mut rng()).unwrap();
		assert_eq!(generated, vec!["a1", "b1", "c1"]);
	}

	#[test]
	fn test_balanced_top_up_skips_empty_categories() {
		let taxonomy = taxonomy(&[("空", &[]), ("b", &[("b1", 1)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);

		let generated = generator.generate(&request(&["空", "b"], 6, GenerationMode::Balanced), &mut rng()).unwrap();
		assert_eq!(generated.len(), 6);
	}

	#[test]
	fn test_per_category_fixed_counts_capped_by_pool() {
		let taxonomy = taxonomy(&[("小", &[("x", 2)]), ("大", &[("y", 5), ("z", 5)])]);
		let mut settings = CategorySettings::for_taxonomy(&taxonomy);
		settings.set(&taxonomy, "小", 5, false).unwrap();
		settings.set(&taxonomy, "大", 4, false).unwrap();
		let generator = Generator::new(&taxonomy, &settings);

		let generated = generator
			.generate(&request(&["小", "大"], 1, GenerationMode::PerCategoryPolicy), &mut rng())
			.unwrap();
		// min(5, 2) from "小", then min(4, 10) from "大"
		assert_eq!(generated.len(), 6);
		assert!(generated[..2].iter().all(|w| w == "x"));
		assert!(generated[2..].iter().all(|w| w == "y" || w == "z"));
	}

	#[test]
	fn test_per_category_default_and_random_counts() {
		let taxonomy = taxonomy(&[("默认", &[("d", 10)]), ("随机", &[("r", 10)])]);
		let mut settings = CategorySettings::for_taxonomy(&taxonomy);
		settings.set(&taxonomy, "随机", 0, true).unwrap();
		let generator = Generator::new(&taxonomy, &settings);
		let req = request(&["默认", "随机"], 4, GenerationMode::PerCategoryPolicy);

		let mut rng = rng();
		let mut seen = [false; 5];
		for _ in 0..200 {
			let generated = generator.generate(&req, &mut rng).unwrap();
			assert_eq!(generated.iter().filter(|w| *w == "d").count(), 3);
			let random = generated.iter().filter(|w| *w == "r").count();
			assert!((1..=4).contains(&random));
			seen[random] = true;
		}
		assert_eq!(seen, [false, true, true, true, true]);
	}

	#[test]
	fn test_generate_text_uses_format() {
		let taxonomy = taxonomy(&[("风格", &[("拟真", 1)])]);
		let settings = CategorySettings::for_taxonomy(&taxonomy);
		let generator = Generator::new(&taxonomy, &settings);

		let mut req = request(&["风格"], 3, GenerationMode::Uniform);
		req.output_format = OutputFormat::CommaSeparated;
		assert_eq!(generator.generate_text(&req, &mut rng()).unwrap(), "拟真, 拟真, 拟真");
		req.output_format = OutputFormat::MultiLine;
		assert_eq!(generator.generate_text(&req, &mut rng()).unwrap(), "拟真\n拟真\n拟真");
	}
}
