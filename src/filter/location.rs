//! Location filtering

use std::collections::HashSet;

use crate::filter::generic::RecordFilter;
use crate::models::schema::columns;
use crate::models::{JoinedRecord, LocationSelector};

/// A filter that includes records at one location, or every location for the wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFilter {
    selector: LocationSelector,
}

impl LocationFilter {
    #[must_use]
    pub fn new(selector: impl Into<LocationSelector>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl RecordFilter<JoinedRecord> for LocationFilter {
    fn matches(&self, item: &JoinedRecord) -> bool {
        self.selector.matches(&item.location)
    }

    fn required_fields(&self) -> HashSet<&'static str> {
        match self.selector {
            LocationSelector::All => HashSet::new(),
            LocationSelector::Exact(_) => HashSet::from([columns::LOCATION]),
        }
    }
}
