//! Precomputed table strategy.
//!
//! A build step can scan declarations ahead of time and emit the table as a
//! blob; at runtime the blob is decoded instead of walking the link-time
//! collection. Layout:
//!
//! ```text
//! MAGIC (8 bytes) | SCHEMA_VERSION (u32 LE) | postcard(Vec<TableEntry>)
//! ```
//!
//! Entries are written sorted by file then function, so equal tables encode
//! to equal bytes.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::populate::Populate;
use crate::record::{LocationKey, TemplateRecord};
use crate::table::RegistryTable;

/// Magic bytes identifying a precomputed template table.
pub const MAGIC: &[u8; 8] = b"INSCRTPL";

/// Schema version for blob format compatibility.
pub const SCHEMA_VERSION: u32 = 1;

const HEADER_LEN: usize = MAGIC.len() + size_of::<u32>();

#[derive(Serialize, Deserialize)]
struct TableEntry {
	file: String,
	function: String,
	templates: Vec<TemplateRecord>,
}

/// Serializes `table` into a precomputed blob.
pub fn encode_table(table: &RegistryTable) -> Result<Vec<u8>, ConfigurationError> {
	let entries: Vec<TableEntry> = table
		.sorted_entries()
		.into_iter()
		.map(|(file, function, templates)| TableEntry {
			file: file.to_string(),
			function: function.to_string(),
			templates: templates.to_vec(),
		})
		.collect();

	let payload = postcard::to_stdvec(&entries).map_err(ConfigurationError::Encode)?;
	let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
	out.extend_from_slice(MAGIC);
	out.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
	out.extend_from_slice(&payload);
	Ok(out)
}

/// Decodes and validates a precomputed blob.
pub fn decode_table(bytes: &[u8]) -> Result<RegistryTable, ConfigurationError> {
	if bytes.len() < MAGIC.len() {
		return Err(ConfigurationError::Truncated);
	}
	let (magic, rest) = bytes.split_at(MAGIC.len());
	if magic != MAGIC {
		return Err(ConfigurationError::BadMagic);
	}

	let Some((version, payload)) = rest.split_first_chunk::<4>() else {
		return Err(ConfigurationError::Truncated);
	};
	let found = u32::from_le_bytes(*version);
	if found != SCHEMA_VERSION {
		return Err(ConfigurationError::UnsupportedSchema {
			found,
			expected: SCHEMA_VERSION,
		});
	}

	let entries: Vec<TableEntry> = postcard::from_bytes(payload).map_err(|e| match e {
		postcard::Error::DeserializeUnexpectedEnd => ConfigurationError::Truncated,
		other => ConfigurationError::Decode(other),
	})?;

	RegistryTable::from_entries(
		entries
			.into_iter()
			.map(|entry| (LocationKey::new(entry.file, entry.function), entry.templates)),
	)
}

/// Encodes `table` and writes it to `path`, for use from build scripts.
pub fn write_blob(path: &Path, table: &RegistryTable) -> Result<(), ConfigurationError> {
	let bytes = encode_table(table)?;
	fs::write(path, bytes).map_err(|source| ConfigurationError::Io {
		path: path.to_path_buf(),
		source,
	})
}

#[derive(Debug, Clone)]
enum Source {
	Bytes(Cow<'static, [u8]>),
	File(PathBuf),
}

/// Precomputed strategy: a blob in memory or on disk.
#[derive(Debug, Clone)]
pub struct PrecomputedUnit {
	source: Source,
}

impl PrecomputedUnit {
	/// A blob embedded in the binary, typically via [`include_templates!`](crate::include_templates).
	pub const fn from_static(bytes: &'static [u8]) -> Self {
		Self {
			source: Source::Bytes(Cow::Borrowed(bytes)),
		}
	}

	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		Self {
			source: Source::Bytes(Cow::Owned(bytes)),
		}
	}

	/// A blob read from `path` when the registry is populated.
	pub fn from_file(path: impl Into<PathBuf>) -> Self {
		Self {
			source: Source::File(path.into()),
		}
	}
}

impl Populate for PrecomputedUnit {
	fn name(&self) -> &'static str {
		"precomputed"
	}

	fn populate(&self) -> Result<RegistryTable, ConfigurationError> {
		match &self.source {
			Source::Bytes(bytes) => decode_table(bytes),
			Source::File(path) => {
				let bytes = fs::read(path).map_err(|source| ConfigurationError::Io {
					path: path.clone(),
					source,
				})?;
				decode_table(&bytes)
			}
		}
	}
}

/// Embeds a blob written into `OUT_DIR` by a build script.
///
/// ```ignore
/// static TEMPLATES: PrecomputedUnit = include_templates!("templates.bin");
/// ```
#[macro_export]
macro_rules! include_templates {
	($name:literal) => {
		$crate::PrecomputedUnit::from_static(include_bytes!(concat!(env!("OUT_DIR"), "/", $name)))
	};
}
