//! Application configuration.
//!
//! Stored as TOML. Every field is optional in the file; missing fields take
//! their default value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KeywordError, Result};
use crate::io;
use crate::model::generation_request::{GenerationMode, OutputFormat};

const APP_DIR: &str = "kw-gen";
const CONFIG_FILE: &str = "config.toml";
const SNAPSHOT_FILE: &str = "session.bin";

/// Initial values of the generator controls.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationDefaults {
	pub total_count: i64,
	pub mode: GenerationMode,
	pub output_format: OutputFormat,
}

impl Default for GenerationDefaults {
	fn default() -> Self {
		Self { total_count: 3, mode: GenerationMode::default(), output_format: OutputFormat::default() }
	}
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
	/// Taxonomy document opened at startup, if any.
	pub default_document: Option<PathBuf>,

	/// Where the session snapshot lives. Defaults to the platform config
	/// directory.
	pub snapshot_path: Option<PathBuf>,

	/// Restore the last snapshot at startup.
	pub restore_on_start: bool,

	/// Write a snapshot when the application exits.
	pub save_on_exit: bool,

	pub generation: GenerationDefaults,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			default_document: None,
			snapshot_path: None,
			restore_on_start: true,
			save_on_exit: true,
			generation: GenerationDefaults::default(),
		}
	}
}

impl AppConfig {
	/// Platform config directory of the application.
	///
	/// - Linux: `~/.config/kw-gen/`
	/// - macOS: `~/Library/Application Support/kw-gen/`
	/// - Windows: `%APPDATA%\kw-gen\`
	pub fn config_dir() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join(APP_DIR))
	}

	pub fn default_path() -> Option<PathBuf> {
		Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
	}

	/// Loads a configuration file. A missing file yields the defaults.
	///
	/// # Errors
	/// - `Io` if the file exists but cannot be read.
	/// - `Config` if the file is not valid TOML for this structure.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		if !path.exists() {
			log::debug!("No configuration at {}, using defaults", path.display());
			return Ok(Self::default());
		}
		Self::from_toml(&io::read_file(path)?)
	}

	/// Loads the configuration from the platform config directory.
	pub fn load_default() -> Result<Self> {
		match Self::default_path() {
			Some(path) => Self::load(path),
			None => Ok(Self::default()),
		}
	}

	pub fn from_toml(contents: &str) -> Result<Self> {
		toml::from_str(contents).map_err(|e| KeywordError::Config(e.to_string()))
	}

	pub fn to_toml(&self) -> Result<String> {
		toml::to_string_pretty(self).map_err(|e| KeywordError::Config(e.to_string()))
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		io::write_file(path, self.to_toml()?)
	}

	/// Resolved snapshot location: the configured one, or `session.bin` in
	/// the config directory.
	pub fn snapshot_path(&self) -> Option<PathBuf> {
		self.snapshot_path.clone().or_else(|| Self::config_dir().map(|dir| dir.join(SNAPSHOT_FILE)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = AppConfig::default();
		assert!(config.restore_on_start);
		assert!(config.save_on_exit);
		assert_eq!(config.generation.total_count, 3);
		assert_eq!(config.generation.mode, GenerationMode::Uniform);
		assert_eq!(config.generation.output_format, OutputFormat::SingleLine);
	}

	#[test]
	fn test_partial_file_uses_defaults() {
		let config = AppConfig::from_toml(
			r#"
save_on_exit = false

[generation]
mode = "per_category_policy"
output_format = "comma_separated"
"#,
		)
		.unwrap();

		assert!(!config.save_on_exit);
		assert!(config.restore_on_start);
		assert_eq!(config.generation.total_count, 3);
		assert_eq!(config.generation.mode, GenerationMode::PerCategoryPolicy);
		assert_eq!(config.generation.output_format, OutputFormat::CommaSeparated);
	}

	#[test]
	fn test_invalid_file() {
		assert!(matches!(AppConfig::from_toml("save_on_exit = 3"), Err(KeywordError::Config(_))));
		assert!(matches!(
			AppConfig::from_toml("[generation]\nmode = \"sideways\""),
			Err(KeywordError::Config(_))
		));
	}

	#[test]
	fn test_toml_round_trip() {
		let config = AppConfig {
			default_document: Some(PathBuf::from("/tmp/keywords.json")),
			snapshot_path: Some(PathBuf::from("/tmp/session.bin")),
			restore_on_start: false,
			save_on_exit: true,
			generation: GenerationDefaults {
				total_count: 12,
				mode: GenerationMode::Balanced,
				output_format: OutputFormat::MultiLine,
			},
		};
		assert_eq!(AppConfig::from_toml(&config.to_toml().unwrap()).unwrap(), config);
	}

	#[test]
	fn test_configured_snapshot_path_wins() {
		let config = AppConfig { snapshot_path: Some(PathBuf::from("/tmp/s.bin")), ..AppConfig::default() };
		assert_eq!(config.snapshot_path(), Some(PathBuf::from("/tmp/s.bin")));
	}
}
