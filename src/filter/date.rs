//! Date range filtering
//!
//! Both bounds are inclusive; a missing bound leaves that side open.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::filter::generic::RecordFilter;
use crate::models::JoinedRecord;
use crate::models::schema::columns;

/// A filter that includes only records observed within a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeFilter {
    /// The start date (inclusive)
    start_date: Option<NaiveDate>,

    /// The end date (inclusive)
    end_date: Option<NaiveDate>,
}

impl DateRangeFilter {
    /// Create a new date range filter
    ///
    /// # Arguments
    /// * `start_date` - Optional start date (inclusive)
    /// * `end_date` - Optional end date (inclusive)
    #[must_use]
    pub const fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// A range with both bounds set
    #[must_use]
    pub const fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self::new(Some(start_date), Some(end_date))
    }

    /// Whether `date` falls within the range
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }
}

impl RecordFilter<JoinedRecord> for DateRangeFilter {
    fn matches(&self, item: &JoinedRecord) -> bool {
        self.contains(item.observed_date)
    }

    fn required_fields(&self) -> HashSet<&'static str> {
        HashSet::from([columns::DATE])
    }
}
