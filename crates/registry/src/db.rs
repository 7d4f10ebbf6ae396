//! Registry cell and the process-wide instance.
//!
//! A [`Registry`] owns a one-shot cell holding its [`RegistryTable`]. The
//! first `initialize` (or the first read, which falls back to scanning the
//! linked declarations) runs exactly one population; concurrent callers park
//! until it completes and then all observe the same frozen table. Reads after
//! that take no locks.
//!
//! A population that fails leaves the cell empty, whether it was started by
//! `initialize` or by an implicit first read. A later `initialize` with a
//! valid unit can still succeed.

use std::fmt::Display;
use std::time::Instant;

use once_cell::sync::{Lazy, OnceCell};

use crate::error::ConfigurationError;
use crate::format::{FormatError, Formatter, Locale, PositionalFormatter};
use crate::populate::Populate;
use crate::populate::scan::ScanUnit;
use crate::record::TemplateRecord;
use crate::request::LookupRequest;
use crate::resolver;
use crate::table::RegistryTable;

pub struct Registry {
	table: OnceCell<RegistryTable>,
	formatter: &'static dyn Formatter,
}

static GLOBAL: Registry = Registry::new();

/// The process-wide registry used by `request!()` lookups.
pub fn global() -> &'static Registry {
	&GLOBAL
}

/// Populates the process-wide registry from `unit`, blocking until it is ready.
///
/// Returns whether `unit` was the one that populated it.
pub fn initialize(unit: Option<&dyn Populate>) -> Result<bool, ConfigurationError> {
	GLOBAL.initialize(unit)
}

pub fn is_initialized() -> bool {
	GLOBAL.is_initialized()
}

pub fn template_count() -> usize {
	GLOBAL.template_count()
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	pub const fn new() -> Self {
		Self::with_formatter(&PositionalFormatter)
	}

	pub const fn with_formatter(formatter: &'static dyn Formatter) -> Self {
		Self {
			table: OnceCell::new(),
			formatter,
		}
	}

	/// Populates the registry from `unit` unless it is already populated.
	///
	/// Exactly one population runs no matter how many threads call this at
	/// once; every caller returns only after the table is complete. Once
	/// populated, further units are ignored and `Ok(false)` is returned, so a
	/// host can tell that an earlier read or call won.
	///
	/// # Errors
	///
	/// [`ConfigurationError::MissingUnit`] when `unit` is `None`, or whatever
	/// the unit's population returned. Neither leaves the registry populated.
	pub fn initialize(&self, unit: Option<&dyn Populate>) -> Result<bool, ConfigurationError> {
		let Some(unit) = unit else {
			return Err(ConfigurationError::MissingUnit);
		};

		let mut ran = false;
		self.table.get_or_try_init(|| {
			ran = true;
			populate_with(unit)
		})?;

		if !ran {
			tracing::warn!(strategy = unit.name(), "template registry already populated, ignoring unit");
		}
		Ok(ran)
	}

	/// Whether a population has completed. Never triggers one.
	pub fn is_initialized(&self) -> bool {
		self.table.get().is_some()
	}

	/// The populated table, scanning linked declarations on first access.
	pub fn table(&self) -> &RegistryTable {
		match self.table.get() {
			Some(table) => table,
			None => self.table_or(&ScanUnit::linked()),
		}
	}

	/// The populated table, populating from `fallback` if nothing has yet.
	///
	/// A failed fallback is not stored: the read sees an empty table and the
	/// registry stays open to `initialize`.
	fn table_or(&self, fallback: &dyn Populate) -> &RegistryTable {
		static EMPTY: Lazy<RegistryTable> = Lazy::new(RegistryTable::new);

		match self.table.get_or_try_init(|| populate_with(fallback)) {
			Ok(table) => table,
			Err(e) => {
				tracing::error!(strategy = fallback.name(), error = %e, "implicit template population failed, reading an empty registry");
				&*EMPTY
			}
		}
	}

	/// Number of templates in the table.
	pub fn template_count(&self) -> usize {
		self.table().len()
	}

	pub fn resolve(&self, request: &LookupRequest<'_>) -> Option<&TemplateRecord> {
		let found = resolver::resolve(self.table(), request);
		if found.is_none() {
			tracing::trace!(
				file = request.file(),
				function = request.function(),
				identifier = request.identifier(),
				line = request.line(),
				"no template matched"
			);
		}
		found
	}

	/// Formats the template `request` resolves to with the invariant locale.
	///
	/// A miss yields `Ok("")` without invoking the formatter.
	pub fn format(&self, request: &LookupRequest<'_>, args: &[&dyn Display]) -> Result<String, FormatError> {
		self.format_in(request, Some(&Locale::INVARIANT), args)
	}

	/// Formats for `locale`. An absent locale is rejected before resolution.
	pub fn format_in(&self, request: &LookupRequest<'_>, locale: Option<&Locale>, args: &[&dyn Display]) -> Result<String, FormatError> {
		let locale = locale.ok_or(FormatError::InvalidArgument { name: "locale" })?;
		match self.resolve(request) {
			Some(record) => self.formatter.format(record.template(), locale, args),
			None => Ok(String::new()),
		}
	}
}

fn populate_with(unit: &dyn Populate) -> Result<RegistryTable, ConfigurationError> {
	let started = Instant::now();
	let table = unit.populate().inspect_err(|e| {
		tracing::warn!(strategy = unit.name(), error = %e, "template registry population failed");
	})?;

	for (key, identifier) in table.duplicate_identifiers() {
		tracing::warn!(
			file = key.file(),
			function = key.function(),
			identifier = %identifier,
			"several templates share an identifier, resolution falls back to line proximity"
		);
	}

	tracing::info!(
		strategy = unit.name(),
		keys = table.key_count(),
		templates = table.len(),
		elapsed_us = started.elapsed().as_micros() as u64,
		"template registry populated"
	);
	Ok(table)
}
