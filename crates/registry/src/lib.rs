//! Call-site message templates.
//!
//! Functions declare short templates with `#[template]`; code inside them asks
//! for "the template declared here" with `request!()` and formats it. The
//! registry behind that is a process-wide table keyed by (file, function),
//! filled exactly once by a pluggable population strategy and read without
//! locks afterwards.
//!
//! ```ignore
//! use inscribe_registry::{request, template};
//!
//! #[template("cannot open {0}")]
//! #[template("cannot open {0}: permission denied", id = "denied")]
//! fn open_error(path: &str, denied: bool) -> String {
//!     let id = if denied { "denied" } else { "" };
//!     request!(id).format(&[&path]).unwrap_or_default()
//! }
//! ```
//!
//! # Modules
//!
//! - [`record`] - Template records and location keys
//! - [`request`] - Lookup requests and call-site capture
//! - [`table`] - The frozen registry table
//! - [`resolver`] - Candidate disambiguation
//! - [`populate`] - Population strategies (link-time scan, precomputed blob)
//! - [`db`] - One-shot registry cell and the process-wide instance
//! - [`format`] - Formatter boundary and locales
//! - [`config`] - TOML configuration of the population strategy

extern crate self as inscribe_registry;

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod populate;
pub mod record;
pub mod request;
pub mod resolver;
pub mod table;

pub use config::{PopulationConfig, RegistryConfig, Strategy};
pub use db::{Registry, global, initialize, is_initialized, template_count};
pub use error::ConfigurationError;
pub use format::{FormatError, Formatter, Locale, PositionalFormatter};
pub use inscribe_macros::template;
pub use populate::precomputed::{MAGIC, PrecomputedUnit, SCHEMA_VERSION, decode_table, encode_table, write_blob};
pub use populate::scan::{Declaration, ScanUnit, TemplateAnnotation, TemplateSite, TemplateSiteReg};
pub use populate::Populate;
pub use record::{LocationKey, TemplateRecord};
pub use request::LookupRequest;
pub use resolver::resolve;
pub use table::RegistryTable;

#[doc(hidden)]
pub mod __private {
	pub use inventory;
}
