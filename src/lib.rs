//! Joins per-patient health records with per-location water-quality samples,
//! flags high-risk cases and serves filtered views, per-location summaries and
//! CSV, PNG and HTML exports.
//!
//! The canonical dataset is built once (generate or ingest, join, classify) and
//! shared read-only; every request filters, aggregates and exports from a
//! snapshot of it.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod generator;
pub mod ingest;
pub mod join;
pub mod models;
pub mod pipeline;
pub mod risk;
pub mod utils;

// Core types
pub use config::{ChartConfig, PipelineConfig, RiskRuleConfig};
pub use dataset::{CanonicalDataset, DatasetStore};
pub use error::{PipelineError, Result};
pub use models::{
    ArrowRecord, FilterRequest, HealthRecord, JoinedRecord, LocationSelector, SummaryRow, ViewData,
    ViewSelector, WaterSample,
};
pub use pipeline::{Pipeline, build_canonical};

// Pipeline stages
pub use aggregate::{aggregate, shape_view};
pub use filter::filter;
pub use join::join;
pub use risk::{RiskClassifier, SymptomThresholdClassifier, classify_all};

// Charts and exports
pub use chart::{ChartKind, ChartSpec};
pub use export::{Artifact, ChartJob, ExportFormat, ExportPool, export_chart, export_table};
