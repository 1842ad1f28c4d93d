//! Weighted keyword generation library.
//!
//! This crate provides the core of a keyword combination generator:
//! - User-editable categories of weighted keywords
//! - Per-category generation settings
//! - Uniform, balanced and per-category sampling modes
//! - JSON documents and binary session snapshots
//! - Application configuration
//!
//! Presentation layers drive everything through `Session`.

/// Categories, settings, requests and the generator.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// Application state and the operations exposed to front-ends.
pub mod session;

/// JSON taxonomy documents and binary session snapshots.
pub mod document;

/// TOML application configuration.
pub mod config;

/// Prompt contract used by interactive front-ends.
pub mod prompt;

/// File helpers.
///
/// Not exposed
pub(crate) mod io;

pub use error::{KeywordError, Result};
pub use session::{Session, SessionEvent};
