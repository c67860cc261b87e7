//! Filter requests issued by the front end

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Location part of a filter request: every location, or one exact name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationSelector {
    /// Matches every location
    All,
    /// Matches a single location by exact, case-sensitive name
    Exact(String),
}

impl LocationSelector {
    /// Whether a record at `location` passes this selector
    #[must_use]
    pub fn matches(&self, location: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(name) => name == location,
        }
    }

    /// Label used in chart titles
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Exact(name) => name,
        }
    }
}

impl From<&str> for LocationSelector {
    fn from(s: &str) -> Self {
        match s {
            "All" | "all" | "*" => Self::All,
            other => Self::Exact(other.to_string()),
        }
    }
}

impl From<String> for LocationSelector {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for LocationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A location plus an inclusive date range
///
/// Construction guarantees `start_date <= end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterRequest {
    location: LocationSelector,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl FilterRequest {
    /// Create a new filter request
    pub fn new(
        location: impl Into<LocationSelector>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        if start_date > end_date {
            return Err(PipelineError::invalid_request(format!(
                "start date {start_date} is after end date {end_date}"
            )));
        }
        Ok(Self {
            location: location.into(),
            start_date,
            end_date,
        })
    }

    /// Create a filter request from ISO-8601 (`YYYY-MM-DD`) date strings
    pub fn parse(location: &str, start_date: &str, end_date: &str) -> Result<Self> {
        Self::new(location, parse_iso_date(start_date)?, parse_iso_date(end_date)?)
    }

    #[must_use]
    pub const fn location(&self) -> &LocationSelector {
        &self.location
    }

    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Whether `date` lies within the inclusive range
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Parse an ISO-8601 calendar date; a trailing time component is ignored
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
        PipelineError::invalid_request(format!("'{value}' is not an ISO-8601 date: {e}"))
    })
}
