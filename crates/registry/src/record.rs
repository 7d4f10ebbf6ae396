//! Template records and the location keys they are filed under.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A template declared on a function.
///
/// An absent identifier is stored as `""`. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateRecord {
	template: String,
	identifier: String,
	line: u32,
}

impl TemplateRecord {
	pub fn new(template: impl Into<String>, line: u32) -> Self {
		Self {
			template: template.into(),
			identifier: String::new(),
			line,
		}
	}

	pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
		self.identifier = identifier.into();
		self
	}

	pub fn template(&self) -> &str {
		&self.template
	}

	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	/// Line the template was declared on.
	pub fn line(&self) -> u32 {
		self.line
	}

	/// Distance in lines between this declaration and `line`.
	pub fn distance(&self, line: u32) -> u32 {
		self.line.abs_diff(line)
	}
}

/// Declaration site of a group of templates: a source file and a function path.
///
/// Comparison is exact and case-sensitive on both parts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationKey {
	file: String,
	function: String,
}

impl LocationKey {
	pub fn new(file: impl Into<String>, function: impl Into<String>) -> Self {
		Self {
			file: file.into(),
			function: function.into(),
		}
	}

	pub fn file(&self) -> &str {
		&self.file
	}

	pub fn function(&self) -> &str {
		&self.function
	}
}

impl fmt::Display for LocationKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.function, self.file)
	}
}
