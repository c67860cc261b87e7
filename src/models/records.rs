//! Health records, water samples and the records derived by joining them
//!
//! A `HealthRecord` describes one patient observation at a location, a `WaterSample`
//! the water quality measured at a location. Joining the two on location yields a
//! `LinkedRecord`; attaching the risk flag yields the `JoinedRecord` every request
//! reads from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{PipelineError, Result};

/// Separator used when a symptom list is written into a single delimited field
pub const SYMPTOM_SEPARATOR: &str = ";";

/// Ordered list of symptom names; almost always one or two entries
pub type Symptoms = SmallVec<[String; 2]>;

/// Valid patient age range (inclusive)
pub const AGE_RANGE: std::ops::RangeInclusive<u8> = 1..=120;

/// Valid pH range (inclusive)
pub const PH_RANGE: std::ops::RangeInclusive<f64> = 0.0..=14.0;

/// Join a symptom list into one field using `SYMPTOM_SEPARATOR`
#[must_use]
pub fn join_symptoms(symptoms: &[String]) -> String {
    symptoms.join(SYMPTOM_SEPARATOR)
}

/// Split a `;`-delimited symptom field back into its entries
///
/// Empty entries are dropped. Commas belong to the symptom name.
#[must_use]
pub fn split_symptoms(field: &str) -> Symptoms {
    split_on(field, &[';'])
}

/// Split a symptom field from an input file, accepting `,` as well as `;`
///
/// Older exports separated symptoms with commas, so input files are read leniently.
#[must_use]
pub fn split_symptoms_legacy(field: &str) -> Symptoms {
    split_on(field, &[';', ','])
}

fn split_on(field: &str, separators: &[char]) -> Symptoms {
    field
        .split(separators)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// A single patient observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// Unique patient identifier
    pub patient_id: u32,
    /// Age in years
    pub age: u8,
    /// Reported symptoms, in reporting order
    pub symptoms: Symptoms,
    /// Location (village) the patient was observed in
    pub location: String,
    /// Date of the observation
    pub observed_date: NaiveDate,
}

impl HealthRecord {
    /// Create a new health record
    #[must_use]
    pub fn new(
        patient_id: u32,
        age: u8,
        symptoms: impl IntoIterator<Item = impl Into<String>>,
        location: impl Into<String>,
        observed_date: NaiveDate,
    ) -> Self {
        Self {
            patient_id,
            age,
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            location: location.into(),
            observed_date,
        }
    }

    /// Check the record against the data model's value ranges
    pub fn validate(&self) -> Result<()> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(PipelineError::schema(format!(
                "patient {} has age {} outside [1, 120]",
                self.patient_id, self.age
            )));
        }
        if self.symptoms.is_empty() {
            return Err(PipelineError::schema(format!(
                "patient {} has no symptoms",
                self.patient_id
            )));
        }
        if let Some(symptom) = self
            .symptoms
            .iter()
            .find(|s| s.is_empty() || s.contains(SYMPTOM_SEPARATOR) || s.trim() != s.as_str())
        {
            return Err(PipelineError::schema(format!(
                "patient {} has malformed symptom '{symptom}'",
                self.patient_id
            )));
        }
        Ok(())
    }

    /// Whether the given symptom was reported
    #[must_use]
    pub fn has_symptom(&self, symptom: &str) -> bool {
        self.symptoms.iter().any(|s| s == symptom)
    }
}

/// Water quality measured at one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSample {
    /// Location the sample was taken at; unique within a sample set
    pub location: String,
    /// Acidity
    pub ph: f64,
    /// Turbidity in NTU
    pub turbidity: f64,
    /// Bacterial colony count
    pub bacterial_count: u32,
}

impl WaterSample {
    /// Create a new water sample
    #[must_use]
    pub fn new(location: impl Into<String>, ph: f64, turbidity: f64, bacterial_count: u32) -> Self {
        Self {
            location: location.into(),
            ph,
            turbidity,
            bacterial_count,
        }
    }

    /// Check the sample against the data model's value ranges
    pub fn validate(&self) -> Result<()> {
        if !PH_RANGE.contains(&self.ph) {
            return Err(PipelineError::schema(format!(
                "water sample for '{}' has pH {} outside [0, 14]",
                self.location, self.ph
            )));
        }
        if !(self.turbidity.is_finite() && self.turbidity >= 0.0) {
            return Err(PipelineError::schema(format!(
                "water sample for '{}' has invalid turbidity {}",
                self.location, self.turbidity
            )));
        }
        Ok(())
    }
}

/// A health record paired with the water sample of its location, before classification
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedRecord {
    /// The patient observation
    pub health: HealthRecord,
    /// The water sample taken at the observation's location
    pub water: WaterSample,
}

impl LinkedRecord {
    /// Attach a risk flag, producing the flattened joined record
    #[must_use]
    pub fn with_risk(self, risk: bool) -> JoinedRecord {
        let Self { health, water } = self;
        JoinedRecord {
            patient_id: health.patient_id,
            age: health.age,
            symptoms: health.symptoms,
            location: health.location,
            observed_date: health.observed_date,
            ph: water.ph,
            turbidity: water.turbidity,
            bacterial_count: water.bacterial_count,
            risk,
        }
    }
}

/// A classified patient observation with the water metrics of its location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub patient_id: u32,
    pub age: u8,
    pub symptoms: Symptoms,
    pub location: String,
    pub observed_date: NaiveDate,
    pub ph: f64,
    pub turbidity: f64,
    pub bacterial_count: u32,
    /// Whether the record is flagged as high risk
    pub risk: bool,
}

impl JoinedRecord {
    /// Whether the given symptom was reported
    #[must_use]
    pub fn has_symptom(&self, symptom: &str) -> bool {
        self.symptoms.iter().any(|s| s == symptom)
    }

    /// Symptoms as a single `;`-separated field
    #[must_use]
    pub fn symptoms_field(&self) -> String {
        join_symptoms(&self.symptoms)
    }
}
