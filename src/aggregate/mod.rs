//! Per-location aggregation and view shaping
//!
//! Groups appear in the order their location first appears in the input. Only
//! locations present in the input produce rows; there are no zero rows for the
//! rest of the location universe.

pub mod views;

use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::models::{JoinedRecord, SummaryRow};

pub use views::{risk_by_site, scatter_points, shape_view, symptom_distribution};

/// Running sums for one location
#[derive(Debug, Default)]
struct GroupAccumulator {
    total_cases: u64,
    high_risk_cases: u64,
    bacterial_sum: f64,
    ph_sum: f64,
}

impl GroupAccumulator {
    fn add(&mut self, record: &JoinedRecord) {
        self.total_cases += 1;
        self.high_risk_cases += u64::from(record.risk);
        self.bacterial_sum += f64::from(record.bacterial_count);
        self.ph_sum += record.ph;
    }

    fn finish(self, location: String) -> SummaryRow {
        // Every group holds at least one record
        let n = self.total_cases as f64;
        SummaryRow {
            location,
            total_cases: self.total_cases,
            high_risk_cases: self.high_risk_cases,
            avg_bacterial_count: self.bacterial_sum / n,
            avg_ph: self.ph_sum / n,
        }
    }
}

/// Group records by location into one summary row per location, in first-seen order
#[must_use]
pub fn aggregate(records: &[JoinedRecord]) -> Vec<SummaryRow> {
    let start = Instant::now();

    let mut order: Vec<&str> = Vec::new();
    let mut groups: FxHashMap<&str, GroupAccumulator> = FxHashMap::default();

    for record in records {
        let location = record.location.as_str();
        groups
            .entry(location)
            .or_insert_with(|| {
                order.push(location);
                GroupAccumulator::default()
            })
            .add(record);
    }

    let rows: Vec<SummaryRow> = order
        .into_iter()
        .filter_map(|location| {
            groups
                .remove(location)
                .map(|group| group.finish(location.to_string()))
        })
        .collect();

    log::debug!(
        "Aggregated {} records into {} locations in {:?}",
        records.len(),
        rows.len(),
        start.elapsed()
    );

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(location: &str, symptom: &str, bacterial_count: u32, ph: f64, risk: bool) -> JoinedRecord {
        JoinedRecord {
            patient_id: 1,
            age: 30,
            symptoms: [symptom.to_string()].into_iter().collect(),
            location: location.to_string(),
            observed_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ph,
            turbidity: 1.0,
            bacterial_count,
            risk,
        }
    }

    #[test]
    fn test_first_seen_order_and_means() {
        let records = vec![
            record("Tripura", "Fever", 100, 6.0, false),
            record("Assam", "Diarrhea", 350, 7.0, true),
            record("Tripura", "Fever", 200, 7.0, true),
            record("Assam", "Fever", 350, 8.0, true),
        ];
        let rows = aggregate(&records);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].location, "Tripura");
        assert_eq!(rows[0].total_cases, 2);
        assert_eq!(rows[0].high_risk_cases, 1);
        assert!((rows[0].avg_bacterial_count - 150.0).abs() < 1e-9);
        assert!((rows[0].avg_ph - 6.5).abs() < 1e-9);

        assert_eq!(rows[1].location, "Assam");
        assert_eq!(rows[1].total_cases, 2);
        assert_eq!(rows[1].high_risk_cases, 2);
        assert!((rows[1].avg_ph - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_has_no_rows() {
        assert!(aggregate(&[]).is_empty());
    }
}
