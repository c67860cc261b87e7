//! View selectors and the data shapes they produce

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::records::JoinedRecord;
use crate::models::summary::SummaryRow;

/// Which summary or chart variant a request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewSelector {
    /// The filtered records themselves
    RawTable,
    /// How often each symptom was reported
    SymptomDistribution,
    /// High-risk case count per location
    RiskBySite,
    /// Bacterial count against age, one point per record
    ScatterView,
    /// The aggregated per-location summary
    SummaryTable,
}

impl ViewSelector {
    /// Every view, in front-end tab order
    pub const ALL: [Self; 5] = [
        Self::RawTable,
        Self::SymptomDistribution,
        Self::RiskBySite,
        Self::ScatterView,
        Self::SummaryTable,
    ];

    /// File name stem used for exported artifacts of this view
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::RawTable => "raw_table",
            Self::SymptomDistribution => "symptoms_chart",
            Self::RiskBySite => "risk_chart",
            Self::ScatterView => "scatter_chart",
            Self::SummaryTable => "summary_table",
        }
    }

    /// Human readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RawTable => "Raw Records",
            Self::SymptomDistribution => "Symptoms Distribution",
            Self::RiskBySite => "High-Risk Cases",
            Self::ScatterView => "Bacterial Count vs Age",
            Self::SummaryTable => "Village Summary Table",
        }
    }
}

impl fmt::Display for ViewSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

impl FromStr for ViewSelector {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|view| view.file_stem() == s)
            .ok_or_else(|| PipelineError::invalid_request(format!("unknown view '{s}'")))
    }
}

/// Count of one symptom across a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomCount {
    pub symptom: String,
    pub count: u64,
}

/// High-risk case count at one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRisk {
    pub location: String,
    pub high_risk_cases: u64,
}

/// One point of the bacterial count against age view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposurePoint {
    pub patient_id: u32,
    pub location: String,
    pub bacterial_count: u32,
    pub age: u8,
    pub risk: bool,
}

/// Data shaped for one view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    RawTable(Vec<JoinedRecord>),
    SymptomDistribution(Vec<SymptomCount>),
    RiskBySite(Vec<SiteRisk>),
    ScatterView(Vec<ExposurePoint>),
    SummaryTable(Vec<SummaryRow>),
}

impl ViewData {
    /// The selector this data was shaped for
    #[must_use]
    pub const fn selector(&self) -> ViewSelector {
        match self {
            Self::RawTable(_) => ViewSelector::RawTable,
            Self::SymptomDistribution(_) => ViewSelector::SymptomDistribution,
            Self::RiskBySite(_) => ViewSelector::RiskBySite,
            Self::ScatterView(_) => ViewSelector::ScatterView,
            Self::SummaryTable(_) => ViewSelector::SummaryTable,
        }
    }

    /// Whether the view has nothing to show
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::RawTable(rows) => rows.is_empty(),
            Self::SymptomDistribution(counts) => counts.is_empty(),
            Self::RiskBySite(sites) => sites.is_empty(),
            Self::ScatterView(points) => points.is_empty(),
            Self::SummaryTable(rows) => rows.is_empty(),
        }
    }
}
