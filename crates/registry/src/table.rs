//! The registry table: location keys mapped to ordered template lists.

use rustc_hash::FxHashMap;

use crate::error::ConfigurationError;
use crate::record::{LocationKey, TemplateRecord};

/// Templates grouped by declaration site.
///
/// Lists keep declaration order (ascending declared line). Tables are built by
/// population strategies and never mutated once handed to a registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryTable {
	files: FxHashMap<String, FxHashMap<String, Vec<TemplateRecord>>>,
	records: usize,
}

impl RegistryTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a table from pre-grouped entries, validating every record.
	pub fn from_entries<I>(entries: I) -> Result<Self, ConfigurationError>
	where
		I: IntoIterator<Item = (LocationKey, Vec<TemplateRecord>)>,
	{
		let mut table = Self::new();
		for (key, records) in entries {
			table.extend(&key, records)?;
		}
		Ok(table.finish())
	}

	/// Candidates declared at `(file, function)`, empty when none.
	pub fn candidates(&self, file: &str, function: &str) -> &[TemplateRecord] {
		self.files
			.get(file)
			.and_then(|functions| functions.get(function))
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	pub fn get(&self, key: &LocationKey) -> &[TemplateRecord] {
		self.candidates(key.file(), key.function())
	}

	/// Total number of records across all keys.
	pub fn len(&self) -> usize {
		self.records
	}

	pub fn is_empty(&self) -> bool {
		self.records == 0
	}

	pub fn key_count(&self) -> usize {
		self.files.values().map(FxHashMap::len).sum()
	}

	/// Iterates `(file, function, records)` in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[TemplateRecord])> {
		self.files.iter().flat_map(|(file, functions)| {
			functions
				.iter()
				.map(move |(function, records)| (file.as_str(), function.as_str(), records.as_slice()))
		})
	}

	/// Entries ordered by file, then function.
	pub fn sorted_entries(&self) -> Vec<(&str, &str, &[TemplateRecord])> {
		let mut entries: Vec<_> = self.iter().collect();
		entries.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
		entries
	}

	/// Keys holding more than one record with the same identifier, with the
	/// offending identifier.
	///
	/// Identifiers are expected to be unique per key. The registry does not
	/// reject violations; resolution falls back to line proximity for them.
	pub fn duplicate_identifiers(&self) -> Vec<(LocationKey, String)> {
		let mut out = Vec::new();
		for (file, function, records) in self.sorted_entries() {
			for (i, record) in records.iter().enumerate() {
				let first = records.iter().position(|r| r.identifier() == record.identifier());
				let repeated = records[i + 1..].iter().any(|r| r.identifier() == record.identifier());
				if first == Some(i) && repeated {
					out.push((LocationKey::new(file, function), record.identifier().to_string()));
				}
			}
		}
		out
	}

	pub(crate) fn push(&mut self, key: &LocationKey, record: TemplateRecord) -> Result<(), ConfigurationError> {
		validate(key, &record)?;
		self.files
			.entry(key.file().to_string())
			.or_default()
			.entry(key.function().to_string())
			.or_default()
			.push(record);
		self.records += 1;
		Ok(())
	}

	pub(crate) fn extend(&mut self, key: &LocationKey, records: impl IntoIterator<Item = TemplateRecord>) -> Result<(), ConfigurationError> {
		for record in records {
			self.push(key, record)?;
		}
		Ok(())
	}

	/// Appends every list of `other` onto the matching list of `self`.
	pub(crate) fn merge(&mut self, other: RegistryTable) {
		self.records += other.records;
		for (file, functions) in other.files {
			let target = self.files.entry(file).or_default();
			for (function, records) in functions {
				target.entry(function).or_default().extend(records);
			}
		}
	}

	/// Restores declaration order within every list.
	pub(crate) fn finish(mut self) -> Self {
		for functions in self.files.values_mut() {
			for records in functions.values_mut() {
				records.sort_by_key(TemplateRecord::line);
			}
		}
		self
	}
}

fn validate(key: &LocationKey, record: &TemplateRecord) -> Result<(), ConfigurationError> {
	let reason = if key.file().is_empty() {
		"empty file path"
	} else if key.function().is_empty() {
		"empty function name"
	} else if record.line() == 0 {
		"declared line must be positive"
	} else {
		return Ok(());
	};
	Err(ConfigurationError::InvalidRecord { key: key.clone(), reason })
}
