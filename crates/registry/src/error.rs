//! Population and configuration errors.

use std::path::PathBuf;

use crate::record::LocationKey;

/// Errors raised while configuring or populating a registry.
///
/// None of these alter the registry's one-shot state: after a failure the
/// registry stays unpopulated and a later `initialize` may succeed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
	#[error("no population unit supplied")]
	MissingUnit,
	#[error("precomputed table has bad magic bytes")]
	BadMagic,
	#[error("precomputed table schema {found} is not supported (expected {expected})")]
	UnsupportedSchema { found: u32, expected: u32 },
	#[error("precomputed table is truncated")]
	Truncated,
	#[error("failed to encode precomputed table: {0}")]
	Encode(#[source] postcard::Error),
	#[error("failed to decode precomputed table: {0}")]
	Decode(#[source] postcard::Error),
	#[error("invalid template record in {key}: {reason}")]
	InvalidRecord { key: LocationKey, reason: &'static str },
	#[error("failed to access {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid registry config: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("precomputed strategy requires a `blob` path")]
	MissingBlobPath,
}
