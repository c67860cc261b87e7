//! Per-location summary rows produced by the aggregator

use serde::{Deserialize, Serialize};

/// Aggregated statistics for one location
///
/// Serialized field names match the summary export's column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "Location")]
    pub location: String,
    /// Number of records at the location
    #[serde(rename = "Total_Cases")]
    pub total_cases: u64,
    /// Number of records flagged as high risk
    #[serde(rename = "High_Risk_Cases")]
    pub high_risk_cases: u64,
    /// Mean bacterial count over the location's records
    #[serde(rename = "Avg_Bacterial_Count")]
    pub avg_bacterial_count: f64,
    /// Mean pH over the location's records
    #[serde(rename = "Avg_pH")]
    pub avg_ph: f64,
}
