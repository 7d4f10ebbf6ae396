//! Lookup requests and call-site capture.
//!
//! A request names the declaration site a caller sits in and, optionally, which
//! of its templates it wants. `request!()` fills the location from `file!()`,
//! `line!()` and the enclosing function's path; explicit construction is there
//! for hosts that capture locations themselves.

use std::fmt::Display;

use crate::db::{self, Registry};
use crate::format::{FormatError, Locale};
use crate::record::TemplateRecord;

/// What a caller wants from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupRequest<'a> {
	file: &'a str,
	function: &'a str,
	line: u32,
	identifier: &'a str,
}

impl<'a> LookupRequest<'a> {
	/// Creates a request with the default (`""`) identifier.
	pub const fn new(file: &'a str, function: &'a str, line: u32) -> Self {
		Self {
			file,
			function,
			line,
			identifier: "",
		}
	}

	/// Returns a copy of this request tagged with `identifier`.
	pub const fn with_identifier(self, identifier: &'a str) -> Self {
		Self { identifier, ..self }
	}

	pub const fn with_line(self, line: u32) -> Self {
		Self { line, ..self }
	}

	pub const fn file(&self) -> &'a str {
		self.file
	}

	pub const fn function(&self) -> &'a str {
		self.function
	}

	pub const fn line(&self) -> u32 {
		self.line
	}

	pub const fn identifier(&self) -> &'a str {
		self.identifier
	}

	/// Resolves against `registry`, populating it on first access.
	pub fn resolve_in<'r>(&self, registry: &'r Registry) -> Option<&'r TemplateRecord> {
		registry.resolve(self)
	}

	/// Template text from the process-wide registry, or `None` when nothing
	/// declared at this location matches.
	pub fn resolve_template(&self) -> Option<&'static str> {
		db::global().resolve(self).map(TemplateRecord::template)
	}

	/// Formats the matching template with positional `args`.
	///
	/// A miss yields an empty string without invoking the formatter.
	pub fn format(&self, args: &[&dyn Display]) -> Result<String, FormatError> {
		db::global().format(self, args)
	}

	/// Formats the matching template for `locale`.
	pub fn format_in(&self, locale: Option<&Locale>, args: &[&dyn Display]) -> Result<String, FormatError> {
		db::global().format_in(self, locale, args)
	}
}

/// Strips a marker item's type name down to the path of the function it is
/// declared in.
///
/// `app::handlers::open::__inscribe_here` becomes `app::handlers::open`; closure
/// and async-body segments are dropped so that captures inside them report the
/// enclosing function.
pub fn enclosing_function(marker_path: &'static str) -> &'static str {
	let mut path = marker_path.rsplit_once("::").map_or(marker_path, |(parent, _)| parent);
	while let Some(parent) = path.strip_suffix("::{{closure}}") {
		path = parent;
	}
	path
}

/// Expands to the path of the enclosing function, as a `&'static str`.
#[macro_export]
macro_rules! function_name {
	() => {{
		fn __inscribe_here() {}
		$crate::request::enclosing_function(::core::any::type_name_of_val(&__inscribe_here))
	}};
}

/// Captures the current call site as a [`LookupRequest`].
///
/// ```ignore
/// request!()              // default identifier
/// request!("denied")      // tagged
/// ```
#[macro_export]
macro_rules! request {
	() => {
		$crate::LookupRequest::new(::core::file!(), $crate::function_name!(), ::core::line!())
	};
	($identifier:expr) => {
		$crate::request!().with_identifier($identifier)
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_marker_segment() {
		assert_eq!(enclosing_function("app::handlers::open::__inscribe_here"), "app::handlers::open");
	}

	#[test]
	fn strips_closure_segments() {
		assert_eq!(enclosing_function("app::run::{{closure}}::{{closure}}::__inscribe_here"), "app::run");
	}

	#[test]
	fn keeps_bare_names() {
		assert_eq!(enclosing_function("__inscribe_here"), "__inscribe_here");
	}

	#[test]
	fn captures_enclosing_function() {
		let here = crate::function_name!();
		assert!(here.ends_with("request::tests::captures_enclosing_function"), "{here}");
	}

	#[test]
	fn closures_report_their_function() {
		let outer = crate::function_name!();
		let inner = (|| crate::function_name!())();
		assert_eq!(outer, inner);
	}

	#[test]
	fn request_captures_file_and_line() {
		let line = line!() + 1;
		let request = crate::request!();
		assert_eq!(request.file(), file!());
		assert_eq!(request.line(), line);
		assert_eq!(request.identifier(), "");
	}

	#[test]
	fn identifier_is_applied_to_a_copy() {
		let base = LookupRequest::new("src/a.rs", "app::run", 4);
		let tagged = base.with_identifier("denied");
		assert_eq!(base.identifier(), "");
		assert_eq!(tagged.identifier(), "denied");
		assert_eq!(tagged.file(), base.file());
		assert_eq!(tagged.line(), base.line());
	}
}
