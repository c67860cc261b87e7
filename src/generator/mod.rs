//! Synthetic health and water-quality data
//!
//! Stands in for a real ingestion adapter during demos and tests; the output has
//! the same shape the `ingest` readers produce.

use std::time::Instant;

use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::config::PipelineConfig;
use crate::models::{HealthRecord, WaterSample};
use crate::utils::logging::log_warning;

/// Patient ages are drawn from this range (inclusive)
pub const AGE_BOUNDS: (u8, u8) = (1, 70);

/// At most this many distinct symptoms are drawn per record
pub const MAX_SYMPTOMS_PER_RECORD: usize = 2;

/// pH values are drawn from this range
pub const PH_BOUNDS: (f64, f64) = (5.0, 9.0);

/// Turbidity values are drawn from this range
pub const TURBIDITY_BOUNDS: (f64, f64) = (0.0, 100.0);

/// Bacterial counts are drawn from this range (inclusive)
pub const BACTERIAL_COUNT_BOUNDS: (u32, u32) = (50, 600);

/// Generates synthetic health records and one water sample per location
#[derive(Debug)]
pub struct RecordGenerator {
    record_count: usize,
    locations: Vec<String>,
    symptoms: Vec<String>,
    lookback_days: u32,
    rng: StdRng,
}

impl RecordGenerator {
    /// Create a generator from the pipeline configuration
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        // Water samples must be unique per location for the join
        let locations = config.locations.iter().unique().cloned().collect_vec();
        if locations.len() != config.locations.len() {
            log_warning(
                &format!(
                    "Collapsed {} duplicate location(s) in the generator configuration",
                    config.locations.len() - locations.len()
                ),
                None,
            );
        }

        Self {
            record_count: config.record_count,
            locations,
            symptoms: config.symptoms.iter().unique().cloned().collect_vec(),
            lookback_days: config.lookback_days,
            rng,
        }
    }

    /// Generate the health records and water samples, dating observations back from `as_of`
    pub fn generate(&mut self, as_of: NaiveDate) -> (Vec<HealthRecord>, Vec<WaterSample>) {
        let start = Instant::now();
        let health = self.health_records(as_of);
        let water = self.water_samples();
        log::info!(
            "Generated {} health records and {} water samples in {:?}",
            health.len(),
            water.len(),
            start.elapsed()
        );
        (health, water)
    }

    /// Generate `record_count` health records with patient ids starting at 1
    pub fn health_records(&mut self, as_of: NaiveDate) -> Vec<HealthRecord> {
        if self.locations.is_empty() || self.symptoms.is_empty() {
            log_warning("No locations or symptoms configured; generating no health records", None);
            return Vec::new();
        }

        (1..=self.record_count)
            .map(|i| {
                let patient_id = u32::try_from(i).unwrap_or(u32::MAX);
                self.health_record(patient_id, as_of)
            })
            .collect()
    }

    fn health_record(&mut self, patient_id: u32, as_of: NaiveDate) -> HealthRecord {
        let rng = &mut self.rng;

        let location = self.locations[rng.random_range(0..self.locations.len())].clone();
        let age = rng.random_range(AGE_BOUNDS.0..=AGE_BOUNDS.1);

        let max_symptoms = MAX_SYMPTOMS_PER_RECORD.min(self.symptoms.len());
        let symptom_count = rng.random_range(1..=max_symptoms);
        let symptoms = rand::seq::index::sample(&mut *rng, self.symptoms.len(), symptom_count)
            .into_iter()
            .map(|idx| self.symptoms[idx].clone())
            .collect();

        let offset = rng.random_range(0..=self.lookback_days);
        let observed_date = as_of - Duration::days(i64::from(offset));

        HealthRecord {
            patient_id,
            age,
            symptoms,
            location,
            observed_date,
        }
    }

    /// Generate one water sample per configured location
    pub fn water_samples(&mut self) -> Vec<WaterSample> {
        let rng = &mut self.rng;
        self.locations
            .iter()
            .map(|location| WaterSample {
                location: location.clone(),
                ph: round2(rng.random_range(PH_BOUNDS.0..=PH_BOUNDS.1)),
                turbidity: round2(rng.random_range(TURBIDITY_BOUNDS.0..=TURBIDITY_BOUNDS.1)),
                bacterial_count: rng
                    .random_range(BACTERIAL_COUNT_BOUNDS.0..=BACTERIAL_COUNT_BOUNDS.1),
            })
            .collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
