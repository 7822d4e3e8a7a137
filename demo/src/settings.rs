//! Demo settings
//!
//! Loaded from an optional TOML file, then overridden by `WAFF_`-prefixed
//! environment variables.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable naming the settings file.
pub const SETTINGS_FILE_VAR: &str = "WAFF_SETTINGS";

/// Settings file read when [`SETTINGS_FILE_VAR`] is unset and the file exists.
pub const DEFAULT_SETTINGS_FILE: &str = "waff.toml";

const ENV_PREFIX: &str = "WAFF_";

/// Default maximum request body size (1 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to read settings file {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("Invalid settings file: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("Invalid value for {key}: {value}")]
	InvalidValue { key: String, value: String },
	#[error("Validation error: {0}")]
	ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoSettings {
	/// Address the HTTP server listens on
	pub bind: SocketAddr,
	/// URL prefix static files are served under
	pub static_url: String,
	/// Maximum number of autocomplete results per response
	pub autocomplete_page_size: usize,
	/// Largest request body accepted, in bytes
	pub max_body_size: usize,
}

impl Default for DemoSettings {
	fn default() -> Self {
		Self {
			bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
			static_url: "/static/".to_string(),
			autocomplete_page_size: 10,
			max_body_size: DEFAULT_MAX_BODY_SIZE,
		}
	}
}

impl DemoSettings {
	/// Load settings the way the binary does: file, then environment
	pub fn load() -> Result<Self, SettingsError> {
		let path = match std::env::var(SETTINGS_FILE_VAR) {
			Ok(path) => Some(PathBuf::from(path)),
			Err(_) => {
				let default = PathBuf::from(DEFAULT_SETTINGS_FILE);
				default.exists().then_some(default)
			}
		};

		let settings = match path {
			Some(path) => Self::from_file(&path)?,
			None => Self::default(),
		};
		settings.with_overrides(|key| std::env::var(key).ok())
	}

	pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
		let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&text)
	}

	pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
		let settings: Self = toml::from_str(text)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Apply `WAFF_BIND`, `WAFF_STATIC_URL`, `WAFF_AUTOCOMPLETE_PAGE_SIZE` and
	/// `WAFF_MAX_BODY_SIZE`
	///
	/// `lookup` resolves a variable name to its value.
	pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, SettingsError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| {
			let key = format!("{}{}", ENV_PREFIX, name);
			lookup(&key).map(|value| (key, value))
		};

		if let Some((key, value)) = var("BIND") {
			self.bind = value
				.parse()
				.map_err(|_| SettingsError::InvalidValue { key, value })?;
		}
		if let Some((_, value)) = var("STATIC_URL") {
			self.static_url = value;
		}
		if let Some((key, value)) = var("AUTOCOMPLETE_PAGE_SIZE") {
			self.autocomplete_page_size = value
				.parse()
				.map_err(|_| SettingsError::InvalidValue { key, value })?;
		}
		if let Some((key, value)) = var("MAX_BODY_SIZE") {
			self.max_body_size = value
				.parse()
				.map_err(|_| SettingsError::InvalidValue { key, value })?;
		}

		self.validate()?;
		Ok(self)
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.autocomplete_page_size == 0 {
			return Err(SettingsError::ValidationError(
				"autocomplete_page_size must be at least 1".to_string(),
			));
		}
		if self.max_body_size == 0 {
			return Err(SettingsError::ValidationError(
				"max_body_size must be at least 1".to_string(),
			));
		}
		if !self.static_url.starts_with('/') && !self.static_url.contains("://") {
			return Err(SettingsError::ValidationError(
				"static_url must be absolute".to_string(),
			));
		}
		Ok(())
	}
}
