//! Data model of the keyword generator.
//!
//! - Keyword entries and categories (`Category`, `KeywordEntry`)
//! - The ordered category store (`Taxonomy`)
//! - Per-category generation policies (`CategorySettings`)
//! - Generation parameters (`GenerationRequest`)
//! - The sampling engine (`Generator`)

/// Weighted keyword entries and the category holding them.
///
/// Provides weighted random sampling over a category's entries.
pub mod category;

/// Ordered map of categories with category and keyword CRUD.
///
/// Also seeds the default design vocabulary and defines the document
/// (de)serialization shape.
pub mod taxonomy;

/// Fixed or random per-category draw counts.
pub mod category_settings;

/// Generation modes, output formats and the request tying them together.
pub mod generation_request;

/// Stateless generator drawing keywords according to a request.
pub mod generator;
