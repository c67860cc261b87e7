//! Data shaping for each view selector

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::aggregate::aggregate;
use crate::models::{
    ExposurePoint, JoinedRecord, SiteRisk, SymptomCount, ViewData, ViewSelector,
};

/// Shape filtered records for a view
#[must_use]
pub fn shape_view(view: ViewSelector, records: &[JoinedRecord]) -> ViewData {
    match view {
        ViewSelector::RawTable => ViewData::RawTable(records.to_vec()),
        ViewSelector::SymptomDistribution => {
            ViewData::SymptomDistribution(symptom_distribution(records))
        }
        ViewSelector::RiskBySite => ViewData::RiskBySite(risk_by_site(records)),
        ViewSelector::ScatterView => ViewData::ScatterView(scatter_points(records)),
        ViewSelector::SummaryTable => ViewData::SummaryTable(aggregate(records)),
    }
}

/// How often each symptom was reported, most frequent first
///
/// Ties keep the order in which the symptoms first appear.
#[must_use]
pub fn symptom_distribution(records: &[JoinedRecord]) -> Vec<SymptomCount> {
    let mut counts: FxHashMap<&str, u64> = FxHashMap::default();
    let mut order: Vec<&str> = Vec::new();

    for symptom in records.iter().flat_map(|r| r.symptoms.iter()) {
        let count = counts.entry(symptom.as_str()).or_insert_with(|| {
            order.push(symptom.as_str());
            0
        });
        *count += 1;
    }

    order
        .into_iter()
        .map(|symptom| SymptomCount {
            symptom: symptom.to_string(),
            count: counts.get(symptom).copied().unwrap_or_default(),
        })
        .sorted_by(|a, b| b.count.cmp(&a.count))
        .collect()
}

/// High-risk case count per location, in first-seen order
#[must_use]
pub fn risk_by_site(records: &[JoinedRecord]) -> Vec<SiteRisk> {
    aggregate(records)
        .into_iter()
        .map(|row| SiteRisk {
            location: row.location,
            high_risk_cases: row.high_risk_cases,
        })
        .collect()
}

/// One point per record: bacterial count against age, highlighted when high risk
#[must_use]
pub fn scatter_points(records: &[JoinedRecord]) -> Vec<ExposurePoint> {
    records
        .iter()
        .map(|r| ExposurePoint {
            patient_id: r.patient_id,
            location: r.location.clone(),
            bacterial_count: r.bacterial_count,
            age: r.age,
            risk: r.risk,
        })
        .collect()
}
