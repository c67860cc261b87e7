//! Configuration for the pipeline.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Default number of synthetic health records
pub const DEFAULT_RECORD_COUNT: usize = 50;

/// Default number of days the synthetic observation dates reach back
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Locations used by the synthetic data set
pub const DEFAULT_LOCATIONS: [&str; 5] = ["Tripura", "Assam", "Megalaya", "Manipur", "sikkim"];

/// Symptom vocabulary used by the synthetic data set
pub const DEFAULT_SYMPTOMS: [&str; 5] =
    ["Diarrhea", "Fever", "Vomiting", "Stomach Pain", "Hepatitis"];

/// Parameters of the rule-based risk flag
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RiskRuleConfig {
    /// A record reporting this symptom is high risk
    pub marker_symptom: String,
    /// A record whose location exceeds this bacterial count is high risk
    pub bacterial_threshold: u32,
}

impl Default for RiskRuleConfig {
    fn default() -> Self {
        Self {
            marker_symptom: "Diarrhea".to_string(),
            bacterial_threshold: 300,
        }
    }
}

/// Raster dimensions for still-image chart exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Configuration for building and serving the canonical dataset
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of synthetic health records to generate
    pub record_count: usize,
    /// Locations that receive a water sample and patients
    pub locations: Vec<String>,
    /// Symptom vocabulary the generator draws from
    pub symptoms: Vec<String>,
    /// Seed for reproducible generation; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Maximum age of an observation in days
    pub lookback_days: u32,
    /// Risk rule parameters
    pub risk: RiskRuleConfig,
    /// Chart raster dimensions
    pub chart: ChartConfig,
    /// Worker threads used for chart exports
    pub export_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            record_count: DEFAULT_RECORD_COUNT,
            locations: DEFAULT_LOCATIONS.iter().map(ToString::to_string).collect(),
            symptoms: DEFAULT_SYMPTOMS.iter().map(ToString::to_string).collect(),
            seed: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            risk: RiskRuleConfig::default(),
            chart: ChartConfig::default(),
            export_workers: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; missing keys take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        log::info!("Loaded pipeline configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `HYDRO_*` environment overrides on top of this configuration
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(count) = parse_override::<usize>(&lookup, "HYDRO_RECORD_COUNT") {
            self.record_count = count;
        }
        if let Some(seed) = parse_override::<u64>(&lookup, "HYDRO_SEED") {
            self.seed = Some(seed);
        }
        if let Some(workers) = parse_override::<usize>(&lookup, "HYDRO_EXPORT_WORKERS") {
            self.export_workers = workers.max(1);
        }
        self
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparseable {key}={raw}");
            None
        }
    }
}
