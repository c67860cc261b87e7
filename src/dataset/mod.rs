//! The canonical dataset and its copy-on-write store
//!
//! The dataset is built once (join + classification) and never mutated. Requests
//! take a snapshot handle and compute from it; a reload swaps in a whole new
//! snapshot so in-flight requests keep a consistent view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::error::Result;
use crate::join::join;
use crate::models::{HealthRecord, JoinedRecord, WaterSample};
use crate::risk::{RiskClassifier, classify_all};

/// Immutable, joined and classified record set shared by all requests
#[derive(Debug, Clone)]
pub struct CanonicalDataset {
    version: u64,
    records: Arc<[JoinedRecord]>,
}

impl CanonicalDataset {
    /// Join and classify health records and water samples into a dataset
    pub fn build(
        health: &[HealthRecord],
        water: &[WaterSample],
        classifier: &dyn RiskClassifier,
    ) -> Result<Self> {
        let linked = join(health, water)?;
        Ok(Self::from_records(classify_all(linked, classifier)))
    }

    /// Wrap already classified records
    #[must_use]
    pub fn from_records(records: Vec<JoinedRecord>) -> Self {
        Self {
            version: 0,
            records: records.into(),
        }
    }

    /// Snapshot version; bumped by `DatasetStore::replace`
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn records(&self) -> &[JoinedRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct locations in first-seen order
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.location.as_str())
            .unique()
            .collect()
    }

    /// Earliest and latest observation date, if there are any records
    #[must_use]
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.records
            .iter()
            .map(|r| r.observed_date)
            .minmax()
            .into_option()
    }
}

/// Holds the current dataset snapshot and swaps it atomically on reload
#[derive(Debug)]
pub struct DatasetStore {
    current: RwLock<Arc<CanonicalDataset>>,
    next_version: AtomicU64,
}

impl DatasetStore {
    #[must_use]
    pub fn new(dataset: CanonicalDataset) -> Self {
        let dataset = CanonicalDataset {
            version: 1,
            ..dataset
        };
        Self {
            current: RwLock::new(Arc::new(dataset)),
            next_version: AtomicU64::new(2),
        }
    }

    /// Handle to the current snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<CanonicalDataset> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            // A writer only ever stores a complete Arc, so the value is still consistent
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Install a new snapshot and return its version
    pub fn replace(&self, dataset: CanonicalDataset) -> u64 {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let dataset = Arc::new(CanonicalDataset { version, ..dataset });

        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = dataset;

        log::info!("Installed dataset version {version}");
        version
    }
}
