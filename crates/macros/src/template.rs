//! `#[template]` attribute implementation.

use std::collections::HashSet;

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Ident, ItemFn, LitStr, Stmt, Token};

/// Parsed arguments of one `#[template(...)]` attribute.
struct TemplateArgs {
	text: LitStr,
	identifier: Option<LitStr>,
}

impl TemplateArgs {
	fn identifier(&self) -> String {
		self.identifier.as_ref().map(LitStr::value).unwrap_or_default()
	}
}

impl Parse for TemplateArgs {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let text: LitStr = input.parse()?;
		let mut identifier = None;

		if input.parse::<Option<Token![,]>>()?.is_some() && !input.is_empty() {
			let key: Ident = input.parse()?;
			if key != "id" {
				return Err(syn::Error::new(key.span(), "unknown template argument, expected `id = \"...\"`"));
			}
			input.parse::<Token![=]>()?;
			identifier = Some(input.parse()?);
			input.parse::<Option<Token![,]>>()?;
		}

		if !input.is_empty() {
			return Err(input.error("unexpected tokens in #[template(...)]"));
		}

		Ok(Self { text, identifier })
	}
}

fn is_template_attr(attr: &Attribute) -> bool {
	attr.path().segments.last().is_some_and(|segment| segment.ident == "template")
}

fn check_unique(declared: &[TemplateArgs]) -> syn::Result<()> {
	let mut seen = HashSet::with_capacity(declared.len());
	for args in declared {
		let identifier = args.identifier();
		if !seen.insert(identifier.clone()) {
			let span = args.identifier.as_ref().map_or(args.text.span(), LitStr::span);
			let message = if identifier.is_empty() {
				"more than one #[template] without an `id` on this function".to_string()
			} else {
				format!("duplicate template identifier `{identifier}` on this function")
			};
			return Err(syn::Error::new(span, message));
		}
	}
	Ok(())
}

/// Source line of the attribute carrying `span`.
fn line_of(span: Span) -> u32 {
	u32::try_from(span.unwrap().line()).unwrap_or(u32::MAX)
}

/// Entry point for `#[template]`.
///
/// The outermost attribute absorbs every remaining `#[template]` on the item,
/// then inserts a registration block as the first statement of the body:
///
/// ```ignore
/// fn open_error(..) -> String {
///     {
///         fn __inscribe_here() {}
///         fn __inscribe_function() -> &'static str { /* path of open_error */ }
///         static __INSCRIBE_SITE: TemplateSite = TemplateSite { .. };
///         inventory::submit!(TemplateSiteReg(&__INSCRIBE_SITE));
///     }
///     /* statements of the annotated body */
/// }
/// ```
///
/// The body's own braces stay the function's braces, so no lint sees an
/// extra block around user code.
///
/// The marker function lives in the body so its type name carries the same
/// path prefix that `request!()` observes at runtime.
pub fn expand(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
	let first: TemplateArgs = syn::parse2(attr)?;
	let mut function: ItemFn =
		syn::parse2(item).map_err(|e| syn::Error::new(e.span(), "#[template] can only be applied to functions with a body"))?;

	let mut declared = vec![first];
	let mut kept = Vec::with_capacity(function.attrs.len());
	for attr in std::mem::take(&mut function.attrs) {
		if is_template_attr(&attr) {
			declared.push(attr.parse_args()?);
		} else {
			kept.push(attr);
		}
	}
	function.attrs = kept;

	check_unique(&declared)?;

	let annotations = declared.iter().map(|args| {
		let text = &args.text;
		let identifier = args.identifier();
		let line = line_of(text.span());
		quote! {
			::inscribe_registry::TemplateAnnotation {
				template: #text,
				identifier: #identifier,
				line: #line,
			}
		}
	});

	let registration = quote! {
		{
			fn __inscribe_here() {}

			fn __inscribe_function() -> &'static str {
				::inscribe_registry::request::enclosing_function(::core::any::type_name_of_val(&__inscribe_here))
			}

			static __INSCRIBE_SITE: ::inscribe_registry::TemplateSite = ::inscribe_registry::TemplateSite {
				file: ::core::file!(),
				function: __inscribe_function,
				templates: &[#(#annotations),*],
			};

			::inscribe_registry::__private::inventory::submit!(::inscribe_registry::TemplateSiteReg(&__INSCRIBE_SITE));
		}
	};

	let registration: Stmt = syn::parse_quote!(#registration);
	function.block.stmts.insert(0, registration);

	Ok(quote!(#function))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(tokens: &str) -> syn::Result<TemplateArgs> {
		syn::parse_str(tokens)
	}

	#[test]
	fn parses_text_only() {
		let args = parse(r#""Hello, {0}!""#).unwrap();
		assert_eq!(args.text.value(), "Hello, {0}!");
		assert_eq!(args.identifier(), "");
	}

	#[test]
	fn parses_identifier() {
		let args = parse(r#""denied: {0}", id = "denied""#).unwrap();
		assert_eq!(args.identifier(), "denied");
	}

	#[test]
	fn accepts_trailing_comma() {
		assert!(parse(r#""a","#).is_ok());
		assert!(parse(r#""a", id = "b","#).is_ok());
	}

	#[test]
	fn rejects_unknown_argument() {
		let err = parse(r#""a", name = "b""#).err().unwrap();
		assert!(err.to_string().contains("expected `id"));
	}

	#[test]
	fn rejects_missing_text() {
		assert!(parse(r#"id = "b""#).is_err());
	}

	#[test]
	fn duplicate_identifiers_are_rejected() {
		let declared = vec![parse(r#""a", id = "x""#).unwrap(), parse(r#""b", id = "x""#).unwrap()];
		let err = check_unique(&declared).unwrap_err();
		assert!(err.to_string().contains("`x`"));
	}

	#[test]
	fn two_anonymous_templates_are_rejected() {
		let declared = vec![parse(r#""a""#).unwrap(), parse(r#""b""#).unwrap()];
		assert!(check_unique(&declared).is_err());
	}

	#[test]
	fn distinct_identifiers_pass() {
		let declared = vec![parse(r#""a""#).unwrap(), parse(r#""b", id = "x""#).unwrap()];
		assert!(check_unique(&declared).is_ok());
	}

	#[test]
	fn recognizes_qualified_attribute_paths() {
		let attr: Attribute = syn::parse_quote!(#[inscribe_registry::template("a")]);
		assert!(is_template_attr(&attr));
		let other: Attribute = syn::parse_quote!(#[inline]);
		assert!(!is_template_attr(&other));
	}
}
