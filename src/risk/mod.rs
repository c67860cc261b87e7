//! Rule-based risk classification
//!
//! The flag is a fixed, auditable rule rather than a statistical model. Other rules
//! can be plugged in through `RiskClassifier` without touching downstream code.

use std::fmt::Debug;

use crate::config::RiskRuleConfig;
use crate::models::{JoinedRecord, LinkedRecord};

/// Decides whether a joined record is high risk
pub trait RiskClassifier: Debug + Send + Sync {
    /// Classify a single record
    fn classify(&self, record: &LinkedRecord) -> bool;
}

/// High risk when a marker symptom is reported or the bacterial count exceeds a threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomThresholdClassifier {
    marker_symptom: String,
    bacterial_threshold: u32,
}

impl SymptomThresholdClassifier {
    #[must_use]
    pub fn new(marker_symptom: impl Into<String>, bacterial_threshold: u32) -> Self {
        Self {
            marker_symptom: marker_symptom.into(),
            bacterial_threshold,
        }
    }

    #[must_use]
    pub fn from_config(config: &RiskRuleConfig) -> Self {
        Self::new(config.marker_symptom.clone(), config.bacterial_threshold)
    }
}

impl Default for SymptomThresholdClassifier {
    fn default() -> Self {
        Self::from_config(&RiskRuleConfig::default())
    }
}

impl RiskClassifier for SymptomThresholdClassifier {
    fn classify(&self, record: &LinkedRecord) -> bool {
        record.health.has_symptom(&self.marker_symptom)
            || record.water.bacterial_count > self.bacterial_threshold
    }
}

/// Classify every linked record, keeping input order
#[must_use]
pub fn classify_all(linked: Vec<LinkedRecord>, classifier: &dyn RiskClassifier) -> Vec<JoinedRecord> {
    let records: Vec<JoinedRecord> = linked
        .into_iter()
        .map(|record| {
            let risk = classifier.classify(&record);
            record.with_risk(risk)
        })
        .collect();

    log::debug!(
        "Classified {} records, {} high risk",
        records.len(),
        records.iter().filter(|r| r.risk).count()
    );

    records
}
