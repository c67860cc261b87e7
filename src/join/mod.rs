//! Inner equijoin of health records with water samples on location

use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{PipelineError, Result};
use crate::models::{HealthRecord, LinkedRecord, WaterSample};

/// Index water samples by location, rejecting duplicate locations
///
/// # Errors
/// Returns a schema error if two samples share a location, since the join target
/// would be ambiguous.
pub fn index_water_samples(samples: &[WaterSample]) -> Result<FxHashMap<&str, &WaterSample>> {
    let mut index = FxHashMap::default();
    index.reserve(samples.len());

    for sample in samples {
        if index.insert(sample.location.as_str(), sample).is_some() {
            return Err(PipelineError::schema(format!(
                "duplicate water sample location '{}'",
                sample.location
            )));
        }
    }

    Ok(index)
}

/// Reject health records that reuse a patient id
pub fn check_unique_patients(records: &[HealthRecord]) -> Result<()> {
    let mut seen = FxHashSet::default();
    seen.reserve(records.len());

    for record in records {
        if !seen.insert(record.patient_id) {
            return Err(PipelineError::schema(format!(
                "duplicate patient id {}",
                record.patient_id
            )));
        }
    }
    Ok(())
}

/// Attach the water sample of each health record's location
///
/// Health records whose location has no water sample are dropped; output order
/// follows the health records.
pub fn join(health: &[HealthRecord], water: &[WaterSample]) -> Result<Vec<LinkedRecord>> {
    let start = Instant::now();
    check_unique_patients(health)?;
    let index = index_water_samples(water)?;

    let mut linked = Vec::with_capacity(health.len());
    let mut dropped = 0usize;

    for record in health {
        match index.get(record.location.as_str()) {
            Some(sample) => linked.push(LinkedRecord {
                health: record.clone(),
                water: (*sample).clone(),
            }),
            None => {
                dropped += 1;
                log::debug!(
                    "Dropping patient {}: no water sample for '{}'",
                    record.patient_id,
                    record.location
                );
            }
        }
    }

    log::info!(
        "Joined {} of {} health records with {} water samples in {:?} ({} without water data)",
        linked.len(),
        health.len(),
        water.len(),
        start.elapsed(),
        dropped
    );

    Ok(linked)
}
