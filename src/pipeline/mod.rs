//! Pipeline facade
//!
//! `Pipeline` owns the dataset store and exposes the four request-level entry
//! points (`filter`, `aggregate`, `export_table`, `export_chart`) plus view
//! shaping. Each request works from the snapshot current when it starts.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;

use crate::aggregate::{aggregate, shape_view};
use crate::chart::ChartSpec;
use crate::config::{ChartConfig, PipelineConfig};
use crate::dataset::{CanonicalDataset, DatasetStore};
use crate::error::Result;
use crate::export::{ExportFormat, export_chart, export_table};
use crate::filter::{covering_request, filter};
use crate::generator::RecordGenerator;
use crate::ingest;
use crate::models::{
    ArrowRecord, FilterRequest, HealthRecord, JoinedRecord, SummaryRow, ViewData, ViewSelector,
    WaterSample,
};
use crate::risk::{RiskClassifier, SymptomThresholdClassifier};

/// Generate synthetic inputs and build the canonical dataset from them
pub fn build_canonical(config: &PipelineConfig, as_of: NaiveDate) -> Result<CanonicalDataset> {
    let start = Instant::now();
    let (health, water) = RecordGenerator::new(config).generate(as_of);
    let classifier = SymptomThresholdClassifier::from_config(&config.risk);
    let dataset = CanonicalDataset::build(&health, &water, &classifier)?;

    log::info!(
        "Built canonical dataset: {} records across {} locations in {:?}",
        dataset.len(),
        dataset.locations().len(),
        start.elapsed()
    );
    Ok(dataset)
}

/// Request-level entry points over a shared, replaceable dataset
#[derive(Debug)]
pub struct Pipeline {
    store: DatasetStore,
    chart: ChartConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(dataset: CanonicalDataset, chart: ChartConfig) -> Self {
        Self {
            store: DatasetStore::new(dataset),
            chart,
        }
    }

    /// Build from synthetic data generated as of `as_of`
    pub fn synthetic(config: &PipelineConfig, as_of: NaiveDate) -> Result<Self> {
        Ok(Self::new(build_canonical(config, as_of)?, config.chart))
    }

    /// Build from CSV or Parquet input files, classified with `classifier`
    pub fn from_files(
        health_path: &Path,
        water_path: &Path,
        classifier: &dyn RiskClassifier,
        chart: ChartConfig,
    ) -> Result<Self> {
        let health: Vec<HealthRecord> = ingest::read_records(health_path)?;
        let water: Vec<WaterSample> = ingest::read_records(water_path)?;
        Ok(Self::new(CanonicalDataset::build(&health, &water, classifier)?, chart))
    }

    /// Build from Parquet input files read on the async runtime
    pub async fn from_parquet_async(
        health_path: &Path,
        water_path: &Path,
        classifier: &dyn RiskClassifier,
        chart: ChartConfig,
    ) -> Result<Self> {
        let (health, water) = futures::try_join!(
            ingest::read_parquet_async::<HealthRecord>(health_path),
            ingest::read_parquet_async::<WaterSample>(water_path),
        )?;
        Ok(Self::new(CanonicalDataset::build(&health, &water, classifier)?, chart))
    }

    /// Handle to the current dataset snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<CanonicalDataset> {
        self.store.snapshot()
    }

    /// Swap in a new dataset; requests already running keep their snapshot
    pub fn reload(&self, dataset: CanonicalDataset) -> u64 {
        self.store.replace(dataset)
    }

    /// Rebuild the dataset from CSV or Parquet input files and swap it in
    pub fn reload_from_files(
        &self,
        health_path: &Path,
        water_path: &Path,
        classifier: &dyn RiskClassifier,
    ) -> Result<u64> {
        let health: Vec<HealthRecord> = ingest::read_records(health_path)?;
        let water: Vec<WaterSample> = ingest::read_records(water_path)?;
        Ok(self.reload(CanonicalDataset::build(&health, &water, classifier)?))
    }

    #[must_use]
    pub const fn chart_config(&self) -> &ChartConfig {
        &self.chart
    }

    /// The request covering the whole current dataset
    #[must_use]
    pub fn covering_request(&self) -> Option<FilterRequest> {
        covering_request(&self.snapshot())
    }

    /// Records of the current snapshot matching `request`
    #[must_use]
    pub fn filter(&self, request: &FilterRequest) -> Vec<JoinedRecord> {
        filter(&self.snapshot(), request)
    }

    /// Per-location summary of `records`
    #[must_use]
    pub fn aggregate(&self, records: &[JoinedRecord]) -> Vec<SummaryRow> {
        aggregate(records)
    }

    /// Filter and shape the current snapshot for `view`
    #[must_use]
    pub fn view(&self, request: &FilterRequest, view: ViewSelector) -> ViewData {
        shape_view(view, &self.filter(request))
    }

    pub fn export_table<T: ArrowRecord>(&self, rows: &[T], format: ExportFormat) -> Result<Vec<u8>> {
        export_table(rows, format)
    }

    pub fn export_chart(
        &self,
        view: ViewSelector,
        spec: &ChartSpec,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        export_chart(view, spec, format, &self.chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationSelector;

    fn config() -> PipelineConfig {
        PipelineConfig {
            seed: Some(7),
            ..PipelineConfig::default()
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_synthetic_pipeline() {
        let pipeline = Pipeline::synthetic(&config(), as_of()).unwrap();
        let request = pipeline.covering_request().unwrap();
        assert_eq!(request.location(), &LocationSelector::All);

        let records = pipeline.filter(&request);
        assert_eq!(records.len(), 50);

        let summary = pipeline.aggregate(&records);
        assert_eq!(summary.iter().map(|r| r.total_cases).sum::<u64>(), 50);
    }

    #[test]
    fn test_reload_keeps_old_snapshot() {
        let pipeline = Pipeline::synthetic(&config(), as_of()).unwrap();
        let before = pipeline.snapshot();

        let version = pipeline.reload(CanonicalDataset::from_records(Vec::new()));
        assert_eq!(version, 2);
        assert_eq!(before.len(), 50);
        assert!(pipeline.covering_request().is_none());
    }
}
