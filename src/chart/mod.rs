//! Chart descriptions and their renderers
//!
//! A `ChartSpec` is a complete, serializable description of a chart. The front end
//! decides which chart type to use for a view; `ChartSpec::for_view` provides the
//! default mapping used by the bundled binary. Renderers turn a `ChartSpec` into
//! PNG or HTML and embed its JSON so the artifact can be read back losslessly.

pub mod html;
pub mod png;

use serde::{Deserialize, Serialize};

use crate::models::schema::columns;
use crate::models::{ArrowRecord, JoinedRecord, LocationSelector, SummaryRow, ViewData, ViewSelector};

/// One point in a scatter chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Drawn with emphasis (larger, alert colour)
    pub highlighted: bool,
    /// Hover label
    pub label: String,
}

/// The geometry and data of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    Pie {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Bar {
        categories: Vec<String>,
        values: Vec<f64>,
        x_label: String,
        y_label: String,
    },
    Scatter {
        points: Vec<ScatterPoint>,
        x_label: String,
        y_label: String,
    },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl ChartKind {
    /// Number of data points (slices, bars, points or table rows)
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Pie { values, .. } | Self::Bar { values, .. } => values.len(),
            Self::Scatter { points, .. } => points.len(),
            Self::Table { rows, .. } => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A titled chart description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
}

impl ChartSpec {
    #[must_use]
    pub fn new(title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            title: title.into(),
            kind,
        }
    }

    /// Default chart for shaped view data
    #[must_use]
    pub fn for_view(data: &ViewData, title: impl Into<String>) -> Self {
        let kind = match data {
            ViewData::RawTable(records) => ChartKind::Table {
                header: JoinedRecord::column_names(),
                rows: records.iter().map(raw_row_cells).collect(),
            },
            ViewData::SymptomDistribution(counts) => ChartKind::Pie {
                labels: counts.iter().map(|c| c.symptom.clone()).collect(),
                values: counts.iter().map(|c| c.count as f64).collect(),
            },
            ViewData::RiskBySite(sites) => ChartKind::Bar {
                categories: sites.iter().map(|s| s.location.clone()).collect(),
                values: sites.iter().map(|s| s.high_risk_cases as f64).collect(),
                x_label: columns::LOCATION.to_string(),
                y_label: columns::RISK.to_string(),
            },
            ViewData::ScatterView(points) => ChartKind::Scatter {
                points: points
                    .iter()
                    .map(|p| ScatterPoint {
                        x: f64::from(p.bacterial_count),
                        y: f64::from(p.age),
                        highlighted: p.risk,
                        label: format!("Patient {} ({})", p.patient_id, p.location),
                    })
                    .collect(),
                x_label: columns::BACTERIAL_COUNT.to_string(),
                y_label: columns::AGE.to_string(),
            },
            ViewData::SummaryTable(rows) => ChartKind::Table {
                header: SummaryRow::column_names(),
                rows: rows.iter().map(summary_row_cells).collect(),
            },
        };
        Self::new(title, kind)
    }
}

/// Default chart title for a view filtered to `location`
#[must_use]
pub fn default_title(view: ViewSelector, location: &LocationSelector) -> String {
    match view {
        ViewSelector::RawTable => format!("Raw Records ({location})"),
        ViewSelector::SymptomDistribution => format!("Symptom Distribution ({location})"),
        ViewSelector::RiskBySite => format!("High-Risk Cases ({location})"),
        ViewSelector::ScatterView => format!("Bacterial Count vs Age ({location})"),
        ViewSelector::SummaryTable => format!("Village Summary ({location})"),
    }
}

fn raw_row_cells(record: &JoinedRecord) -> Vec<String> {
    vec![
        record.patient_id.to_string(),
        record.age.to_string(),
        record.symptoms_field(),
        record.location.clone(),
        record.observed_date.format("%Y-%m-%d").to_string(),
        record.ph.to_string(),
        record.turbidity.to_string(),
        record.bacterial_count.to_string(),
        record.risk.to_string(),
    ]
}

fn summary_row_cells(row: &SummaryRow) -> Vec<String> {
    vec![
        row.location.clone(),
        row.total_cases.to_string(),
        row.high_risk_cases.to_string(),
        format!("{:.2}", row.avg_bacterial_count),
        format!("{:.2}", row.avg_ph),
    ]
}
