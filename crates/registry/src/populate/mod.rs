//! Population strategies.
//!
//! A strategy turns a source unit into a complete [`RegistryTable`]. Two are
//! provided and must resolve identically for the same declarations:
//!
//! - [`scan::ScanUnit`] - walks function declarations collected at link time
//!   (or supplied explicitly)
//! - [`precomputed::PrecomputedUnit`] - decodes a table emitted ahead of time

use crate::error::ConfigurationError;
use crate::table::RegistryTable;

pub mod precomputed;
pub mod scan;

/// A source unit able to produce a registry table.
///
/// Implementations run at most once per successful registry population and
/// may block for as long as they need; every concurrent caller waits.
pub trait Populate: Send + Sync {
	/// Short strategy name used in logs.
	fn name(&self) -> &'static str;

	fn populate(&self) -> Result<RegistryTable, ConfigurationError>;
}

impl<P: Populate + ?Sized> Populate for Box<P> {
	fn name(&self) -> &'static str {
		(**self).name()
	}

	fn populate(&self) -> Result<RegistryTable, ConfigurationError> {
		(**self).populate()
	}
}
