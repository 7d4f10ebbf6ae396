//! Candidate disambiguation.
//!
//! Given a request and a populated table:
//!
//! 1. Look up the candidates filed under the request's `(file, function)`.
//!    None means no match.
//! 2. A single candidate always matches; the requested identifier and line
//!    are ignored.
//! 3. Otherwise keep the candidates whose identifier equals the requested one.
//! 4. Of those, the one declared closest to the requested line wins. On equal
//!    distance the earliest declared wins.
//!
//! A miss is a normal outcome, not an error.

use crate::record::TemplateRecord;
use crate::request::LookupRequest;
use crate::table::RegistryTable;

/// Picks the template `request` refers to, if any.
pub fn resolve<'t>(table: &'t RegistryTable, request: &LookupRequest<'_>) -> Option<&'t TemplateRecord> {
	match table.candidates(request.file(), request.function()) {
		[] => None,
		[only] => Some(only),
		candidates => closest_match(candidates, request.identifier(), request.line()),
	}
}

/// `min_by_key` returns the first of several equal minima, which makes
/// declaration order the tie-break.
fn closest_match<'t>(candidates: &'t [TemplateRecord], identifier: &str, line: u32) -> Option<&'t TemplateRecord> {
	candidates
		.iter()
		.filter(|record| record.identifier() == identifier)
		.min_by_key(|record| record.distance(line))
}
