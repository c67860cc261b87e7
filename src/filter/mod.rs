//! Filter engine
//!
//! Narrows the canonical dataset by location and inclusive date range. A request is
//! compiled into composable `RecordFilter` predicates and applied as a stable
//! filter, so identical requests on the same snapshot yield identical output.

pub mod date;
pub mod generic;
pub mod location;

use std::time::Instant;

pub use date::DateRangeFilter;
pub use generic::{AndFilter, IncludeAllFilter, RecordFilter, apply_filter};
pub use location::LocationFilter;

use crate::dataset::CanonicalDataset;
use crate::models::{FilterRequest, JoinedRecord, LocationSelector};

/// Build the predicate for a filter request
#[must_use]
pub fn compile(request: &FilterRequest) -> AndFilter<JoinedRecord> {
    let filter = AndFilter::default();
    let filter = match request.location() {
        LocationSelector::All => filter,
        selector @ LocationSelector::Exact(_) => filter.with(LocationFilter::new(selector.clone())),
    };
    filter.with(DateRangeFilter::between(
        request.start_date(),
        request.end_date(),
    ))
}

/// Records of `dataset` matching `request`, in dataset order
///
/// An empty result is a valid outcome, not an error.
#[must_use]
pub fn filter(dataset: &CanonicalDataset, request: &FilterRequest) -> Vec<JoinedRecord> {
    filter_records(dataset.records(), request)
}

/// Records of `records` matching `request`, in input order
#[must_use]
pub fn filter_records(records: &[JoinedRecord], request: &FilterRequest) -> Vec<JoinedRecord> {
    let start = Instant::now();
    let predicate = compile(request);
    let filtered = apply_filter(records, &predicate);

    if filtered.is_empty() {
        log::info!(
            "No data available for location {} between {} and {}",
            request.location(),
            request.start_date(),
            request.end_date()
        );
    } else {
        log::debug!(
            "Filtered {} of {} records for location {} between {} and {} in {:?}",
            filtered.len(),
            records.len(),
            request.location(),
            request.start_date(),
            request.end_date(),
            start.elapsed()
        );
    }

    filtered
}

/// The request covering the whole dataset: every location, earliest to latest date
///
/// Returns `None` for an empty dataset, which has no date range.
#[must_use]
pub fn covering_request(dataset: &CanonicalDataset) -> Option<FilterRequest> {
    let (start, end) = dataset.date_bounds()?;
    FilterRequest::new(LocationSelector::All, start, end).ok()
}
