use std::path::PathBuf;

use thiserror::Error;

/// Every failure the keyword generator can report to its caller.
///
/// All variants are local and recoverable. None of them is ever retried
/// internally; the presentation layer decides what to show the user.
#[derive(Debug, Error)]
pub enum KeywordError {
	#[error("Category '{0}' already exists")]
	DuplicateCategory(String),

	#[error("{0} not found")]
	NotFound(String),

	#[error("Invalid weight {0}: weight must be a positive integer")]
	InvalidWeight(i64),

	#[error("Invalid count {0}: count must not be negative")]
	InvalidCount(i64),

	#[error("Invalid generation request: {0}")]
	InvalidRequest(String),

	#[error("Malformed document: {0}")]
	MalformedDocument(String),

	#[error("Cannot encode document: {0}")]
	Encode(String),

	#[error("{0} cannot be empty")]
	EmptyName(&'static str),

	#[error("I/O error on {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid configuration: {0}")]
	Config(String),
}

impl KeywordError {
	/// Shorthand for a missing category.
	pub(crate) fn category_not_found(name: &str) -> Self {
		Self::NotFound(format!("Category '{name}'"))
	}

	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}

pub type Result<T> = std::result::Result<T, KeywordError>;
