//! Registry configuration.
//!
//! Selects the population strategy from a TOML document:
//!
//! ```toml
//! [population]
//! strategy = "precomputed"     # or "scan" (default)
//! blob = "templates.bin"       # relative to the config file
//! modules = ["my_app"]         # scan filter, empty keeps everything
//! parallel_threshold = 64
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::populate::Populate;
use crate::populate::precomputed::PrecomputedUnit;
use crate::populate::scan::{DEFAULT_PARALLEL_THRESHOLD, ScanUnit};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	pub population: PopulationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationConfig {
	pub strategy: Strategy,
	/// Precomputed blob location.
	pub blob: Option<PathBuf>,
	/// Module paths the scan is restricted to.
	pub modules: Vec<String>,
	pub parallel_threshold: usize,
}

impl Default for PopulationConfig {
	fn default() -> Self {
		Self {
			strategy: Strategy::default(),
			blob: None,
			modules: Vec::new(),
			parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	#[default]
	Scan,
	Precomputed,
}

impl RegistryConfig {
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
		Ok(toml::from_str(content)?)
	}

	/// Loads `path`, falling back to defaults when the file does not exist.
	///
	/// A relative `blob` path is resolved against the file's directory.
	pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
		let content = match std::fs::read_to_string(path) {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "no registry config, using defaults");
				return Ok(Self::default());
			}
			Err(source) => {
				return Err(ConfigurationError::Io {
					path: path.to_path_buf(),
					source,
				});
			}
		};

		let mut config = Self::from_toml_str(&content)?;
		if let (Some(blob), Some(dir)) = (config.population.blob.as_mut(), path.parent())
			&& blob.is_relative()
		{
			*blob = dir.join(&*blob);
		}
		Ok(config)
	}

	/// Builds the population unit this configuration describes.
	pub fn unit(&self) -> Result<Box<dyn Populate>, ConfigurationError> {
		let population = &self.population;
		match population.strategy {
			Strategy::Scan => Ok(Box::new(
				ScanUnit::linked()
					.only_modules(population.modules.iter().cloned())
					.parallel_threshold(population.parallel_threshold),
			)),
			Strategy::Precomputed => {
				let blob = population.blob.as_ref().ok_or(ConfigurationError::MissingBlobPath)?;
				Ok(Box::new(PrecomputedUnit::from_file(blob)))
			}
		}
	}
}
