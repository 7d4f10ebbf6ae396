//! Declaration scan strategy.
//!
//! Each `#[template]`-annotated function submits one [`TemplateSite`] via
//! `inventory::submit!`. At population time the linking step's collection is
//! walked, every site becomes a [`Declaration`], and declarations are grouped
//! by location key.

use crate::error::ConfigurationError;
use crate::populate::Populate;
use crate::record::{LocationKey, TemplateRecord};
use crate::table::RegistryTable;

/// Number of declarations from which a scan is split across worker threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// One `#[template(...)]` attribute as emitted by the macro.
#[derive(Debug)]
pub struct TemplateAnnotation {
	pub template: &'static str,
	pub identifier: &'static str,
	pub line: u32,
}

/// All templates declared on one function.
///
/// `function` is evaluated lazily: it returns the same path `request!()`
/// captures inside that function.
#[derive(Debug)]
pub struct TemplateSite {
	pub file: &'static str,
	pub function: fn() -> &'static str,
	pub templates: &'static [TemplateAnnotation],
}

/// Static site registration entry collected via `inventory`.
/// Wrapper for `inventory::collect!`.
pub struct TemplateSiteReg(pub &'static TemplateSite);

inventory::collect!(TemplateSiteReg);

/// A function and the templates declared on it, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	file: String,
	function: String,
	templates: Vec<TemplateRecord>,
}

impl Declaration {
	pub fn new(file: impl Into<String>, function: impl Into<String>) -> Self {
		Self {
			file: file.into(),
			function: function.into(),
			templates: Vec::new(),
		}
	}

	pub fn from_site(site: &TemplateSite) -> Self {
		let mut declaration = Self::new(site.file, (site.function)());
		for annotation in site.templates {
			declaration.push(TemplateRecord::new(annotation.template, annotation.line).with_identifier(annotation.identifier));
		}
		declaration
	}

	/// Adds an anonymous template declared on `line`.
	pub fn template(mut self, template: impl Into<String>, line: u32) -> Self {
		self.push(TemplateRecord::new(template, line));
		self
	}

	/// Adds a template tagged with `identifier`.
	pub fn tagged(mut self, identifier: impl Into<String>, template: impl Into<String>, line: u32) -> Self {
		self.push(TemplateRecord::new(template, line).with_identifier(identifier));
		self
	}

	pub fn push(&mut self, record: TemplateRecord) {
		self.templates.push(record);
	}

	pub fn key(&self) -> LocationKey {
		LocationKey::new(&self.file, &self.function)
	}

	pub fn function(&self) -> &str {
		&self.function
	}

	pub fn templates(&self) -> &[TemplateRecord] {
		&self.templates
	}
}

/// Scan strategy over a set of function declarations.
#[derive(Debug, Clone)]
pub struct ScanUnit {
	declarations: Vec<Declaration>,
	modules: Vec<String>,
	parallel_threshold: usize,
}

impl ScanUnit {
	/// Every site submitted by `#[template]` in the final binary.
	pub fn linked() -> Self {
		Self::from_declarations(
			inventory::iter::<TemplateSiteReg>
				.into_iter()
				.map(|reg| Declaration::from_site(reg.0)),
		)
	}

	pub fn from_declarations(declarations: impl IntoIterator<Item = Declaration>) -> Self {
		Self {
			declarations: declarations.into_iter().collect(),
			modules: Vec::new(),
			parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
		}
	}

	/// Restricts the scan to functions inside the given module paths.
	///
	/// An empty list keeps everything.
	pub fn only_modules<I, S>(mut self, modules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.modules = modules.into_iter().map(Into::into).collect();
		self
	}

	pub fn parallel_threshold(mut self, threshold: usize) -> Self {
		self.parallel_threshold = threshold;
		self
	}

	pub fn declarations(&self) -> &[Declaration] {
		&self.declarations
	}

	/// Groups the selected declarations into a table.
	pub fn build(&self) -> Result<RegistryTable, ConfigurationError> {
		let selected: Vec<&Declaration> = self.declarations.iter().filter(|d| self.selects(d)).collect();

		#[cfg(feature = "parallel")]
		if selected.len() >= self.parallel_threshold.max(1) {
			return scan_parallel(&selected).map(RegistryTable::finish);
		}

		scan_sequential(&selected).map(RegistryTable::finish)
	}

	fn selects(&self, declaration: &Declaration) -> bool {
		self.modules.is_empty() || self.modules.iter().any(|module| in_module(declaration.function(), module))
	}
}

impl Populate for ScanUnit {
	fn name(&self) -> &'static str {
		"scan"
	}

	fn populate(&self) -> Result<RegistryTable, ConfigurationError> {
		self.build()
	}
}

/// Whether `function` lives under `module`, matching whole path segments.
///
/// Trait-impl methods are captured as `<Self as Trait>::method`; they belong to
/// a module when either the self type or the trait does.
fn in_module(function: &str, module: &str) -> bool {
	let module = module.trim_end_matches("::");
	if let Some((self_ty, trait_path)) = qualified_self(function) {
		return in_module(self_ty, module) || trait_path.is_some_and(|path| in_module(path, module));
	}

	let path = function.trim_start_matches('&').trim_start_matches("mut ").trim_start_matches("dyn ");
	path.strip_prefix(module)
		.is_some_and(|rest| rest.is_empty() || rest.starts_with("::") || rest.starts_with('<'))
}

/// Splits a leading `<Self as Trait>` (or `<Self>`) into its parts.
fn qualified_self(path: &str) -> Option<(&str, Option<&str>)> {
	let inner = path.strip_prefix('<')?;
	let bytes = inner.as_bytes();
	let mut depth = 0usize;
	let mut split = None;

	for (i, &byte) in bytes.iter().enumerate() {
		match byte {
			b'<' => depth += 1,
			// `->` in fn pointer types
			b'>' if i > 0 && bytes[i - 1] == b'-' => {}
			b'>' if depth == 0 => {
				let qualified = &inner[..i];
				return Some(match split {
					Some(at) => (&qualified[..at], Some(&qualified[at + " as ".len()..])),
					None => (qualified, None),
				});
			}
			b'>' => depth -= 1,
			b' ' if depth == 0 && split.is_none() && inner[i..].starts_with(" as ") => split = Some(i),
			_ => {}
		}
	}
	None
}

fn scan_sequential(declarations: &[&Declaration]) -> Result<RegistryTable, ConfigurationError> {
	let mut table = RegistryTable::new();
	for declaration in declarations {
		table.extend(&declaration.key(), declaration.templates.iter().cloned())?;
	}
	Ok(table)
}

/// Scans contiguous sub-units on the rayon pool and merges the partial tables.
#[cfg(feature = "parallel")]
fn scan_parallel(declarations: &[&Declaration]) -> Result<RegistryTable, ConfigurationError> {
	use rayon::prelude::*;

	let chunk = declarations.len().div_ceil(rayon::current_num_threads()).max(1);
	tracing::debug!(declarations = declarations.len(), chunk, "scanning template declarations in parallel");

	declarations
		.par_chunks(chunk)
		.map(scan_sequential)
		.try_reduce(RegistryTable::new, |mut merged, part| {
			merged.merge(part);
			Ok(merged)
		})
}
