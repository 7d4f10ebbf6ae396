//! Formatter boundary.
//!
//! A resolved template is handed to a [`Formatter`] together with positional
//! arguments and a [`Locale`]. The built-in [`PositionalFormatter`] substitutes
//! `{0}`, `{1}`, ... and understands `{{` / `}}` escapes; hosts with richer
//! needs plug in their own implementation.

use std::borrow::Cow;
use std::fmt::Display;

/// Errors raised while formatting a resolved template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
	#[error("malformed template at byte {offset}: {reason}")]
	Malformed { offset: usize, reason: &'static str },
	#[error("template references argument {index} but only {provided} were supplied")]
	MissingArgument { index: usize, provided: usize },
	#[error("invalid argument: {name} is absent")]
	InvalidArgument { name: &'static str },
}

/// Turns template text plus arguments into final text.
pub trait Formatter: Send + Sync {
	fn format(&self, template: &str, locale: &Locale, args: &[&dyn Display]) -> Result<String, FormatError>;
}

/// `{N}` placeholder substitution.
///
/// Locale-invariant: arguments render through their `Display` impls.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalFormatter;

impl Formatter for PositionalFormatter {
	fn format(&self, template: &str, _locale: &Locale, args: &[&dyn Display]) -> Result<String, FormatError> {
		let mut out = String::with_capacity(template.len() + args.len() * 8);
		let mut chars = template.char_indices().peekable();

		while let Some((offset, ch)) = chars.next() {
			match ch {
				'{' if chars.next_if(|&(_, c)| c == '{').is_some() => out.push('{'),
				'}' if chars.next_if(|&(_, c)| c == '}').is_some() => out.push('}'),
				'{' => {
					let index = placeholder_index(&mut chars, offset)?;
					let arg = args.get(index).ok_or(FormatError::MissingArgument {
						index,
						provided: args.len(),
					})?;
					out.push_str(&arg.to_string());
				}
				'}' => {
					return Err(FormatError::Malformed {
						offset,
						reason: "unmatched `}`",
					});
				}
				c => out.push(c),
			}
		}

		Ok(out)
	}
}

/// Reads the digits after an opening brace up to and including `}`.
fn placeholder_index(chars: &mut impl Iterator<Item = (usize, char)>, open: usize) -> Result<usize, FormatError> {
	let malformed = |reason| FormatError::Malformed { offset: open, reason };
	let mut index: Option<usize> = None;

	loop {
		match chars.next() {
			Some((_, '}')) => return index.ok_or(malformed("empty placeholder")),
			Some((_, c)) => {
				let digit = c.to_digit(10).ok_or(malformed("placeholder must be an argument index"))?;
				let next = index
					.unwrap_or(0)
					.checked_mul(10)
					.and_then(|v| v.checked_add(digit as usize))
					.ok_or(malformed("argument index overflows"))?;
				index = Some(next);
			}
			None => return Err(malformed("unterminated placeholder")),
		}
	}
}

/// A language tag forwarded to formatters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
	tag: Cow<'static, str>,
}

impl Locale {
	/// Culture-neutral locale used when the caller does not pick one.
	pub const INVARIANT: Locale = Locale {
		tag: Cow::Borrowed("und"),
	};

	/// Parses a tag such as `en`, `pt-BR` or a POSIX value like `ja_JP.UTF-8`.
	pub fn parse(tag: &str) -> Result<Self, FormatError> {
		let tag = tag.trim();
		let tag = tag.split(['.', '@']).next().unwrap_or_default();
		if tag.is_empty() {
			return Err(FormatError::InvalidArgument { name: "locale" });
		}
		if tag == "C" || tag == "POSIX" {
			return Ok(Self::INVARIANT);
		}
		Ok(Self {
			tag: Cow::Owned(tag.replace('_', "-")),
		})
	}

	/// Locale from the environment.
	///
	/// Priority: `INSCRIBE_LANG` > `LANG` > `en`.
	pub fn from_env() -> Self {
		["INSCRIBE_LANG", "LANG"]
			.into_iter()
			.filter_map(|var| std::env::var(var).ok())
			.find_map(|value| Self::parse(&value).ok())
			.unwrap_or_else(|| Self {
				tag: Cow::Borrowed("en"),
			})
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Primary language subtag (`pt` for `pt-BR`).
	pub fn language(&self) -> &str {
		self.tag.split('-').next().unwrap_or_default()
	}

	pub fn is_invariant(&self) -> bool {
		*self == Self::INVARIANT
	}
}

impl Default for Locale {
	fn default() -> Self {
		Self::INVARIANT
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn format(template: &str, args: &[&dyn Display]) -> Result<String, FormatError> {
		PositionalFormatter.format(template, &Locale::INVARIANT, args)
	}

	#[test]
	fn substitutes_positional_arguments() {
		assert_eq!(format("Hello, {0}!", &[&"World"]).unwrap(), "Hello, World!");
		assert_eq!(format("{1} before {0}, {1} again", &[&1, &"two"]).unwrap(), "two before 1, two again");
	}

	#[test]
	fn plain_text_passes_through() {
		assert_eq!(format("no placeholders", &[]).unwrap(), "no placeholders");
		assert_eq!(format("", &[]).unwrap(), "");
		assert_eq!(format("ünïcødé {0}", &[&'✓']).unwrap(), "ünïcødé ✓");
	}

	#[test]
	fn braces_escape_by_doubling() {
		assert_eq!(format("{{0}} is {0}", &[&7]).unwrap(), "{0} is 7");
	}

	#[test]
	fn unused_arguments_are_allowed() {
		assert_eq!(format("{0}", &[&"a", &"b"]).unwrap(), "a");
	}

	#[test]
	fn missing_argument_fails() {
		assert_eq!(format("{0} and {2}", &[&"a", &"b"]), Err(FormatError::MissingArgument { index: 2, provided: 2 }));
	}

	#[test]
	fn malformed_placeholders_fail() {
		assert!(matches!(format("open {", &[]), Err(FormatError::Malformed { offset: 5, .. })));
		assert!(matches!(format("{}", &[&1]), Err(FormatError::Malformed { reason: "empty placeholder", .. })));
		assert!(matches!(format("{name}", &[&1]), Err(FormatError::Malformed { .. })));
		assert!(matches!(format("close }", &[]), Err(FormatError::Malformed { offset: 6, .. })));
		assert!(matches!(
			format("{99999999999999999999999}", &[]),
			Err(FormatError::Malformed { reason: "argument index overflows", .. })
		));
	}

	#[test]
	fn locale_parsing() {
		assert_eq!(Locale::parse("pt_BR.UTF-8").unwrap().tag(), "pt-BR");
		assert_eq!(Locale::parse("pt-BR").unwrap().language(), "pt");
		assert!(Locale::parse("C").unwrap().is_invariant());
		assert_eq!(Locale::parse("  "), Err(FormatError::InvalidArgument { name: "locale" }));
	}
}
