//! Procedural macros for inscribe.
//!
//! Provides attribute macros:
//! * `#[template(...)]` - declares a message template on a function

use proc_macro::TokenStream;

/// Template attribute implementation.
mod template;

/// Declares a message template on the annotated function.
///
/// The attribute is repeatable. Every `#[template]` on one function is
/// collected into a single link-time site submitted via `inventory`, keyed by
/// `file!()` and the function's path so that `request!()` inside the body
/// resolves to it.
///
/// ```ignore
/// #[template("cannot open {0}")]
/// #[template("cannot open {0}: permission denied", id = "denied")]
/// fn open_error(path: &Path, denied: bool) -> String {
///     let id = if denied { "denied" } else { "" };
///     request!(id).format(&[&path.display()]).unwrap_or_default()
/// }
/// ```
///
/// # Arguments
///
/// * First argument - Required: template text (string literal)
/// * `id = "name"` - Optional: identifier used to disambiguate templates on the
///   same function (defaults to `""`)
///
/// Two templates on one function sharing an identifier are rejected.
#[proc_macro_attribute]
pub fn template(attr: TokenStream, item: TokenStream) -> TokenStream {
	template::expand(attr.into(), item.into())
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}
