use chrono::NaiveDate;
use hydro_health::{
    CanonicalDataset, HealthRecord, PipelineConfig, SymptomThresholdClassifier, WaterSample,
    build_canonical,
};

#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Fixed generation date so seeded datasets are reproducible
#[must_use]
pub fn as_of() -> NaiveDate {
    date(2024, 6, 30)
}

/// Three Assam records (one reporting Diarrhea) against a 350 count sample and two
/// Tripura records against a 100 count sample
#[must_use]
pub fn scenario_inputs() -> (Vec<HealthRecord>, Vec<WaterSample>) {
    let health = vec![
        HealthRecord::new(1, 34, ["Diarrhea", "Fever"], "Assam", date(2024, 5, 2)),
        HealthRecord::new(2, 8, ["Fever"], "Tripura", date(2024, 5, 3)),
        HealthRecord::new(3, 61, ["Vomiting"], "Assam", date(2024, 5, 10)),
        HealthRecord::new(4, 25, ["Stomach Pain"], "Tripura", date(2024, 5, 11)),
        HealthRecord::new(5, 47, ["Hepatitis", "Fever"], "Assam", date(2024, 5, 20)),
    ];
    let water = vec![
        WaterSample::new("Assam", 7.4, 12.5, 350),
        WaterSample::new("Tripura", 6.6, 30.0, 100),
    ];
    (health, water)
}

#[must_use]
pub fn scenario_dataset() -> CanonicalDataset {
    let (health, water) = scenario_inputs();
    CanonicalDataset::build(&health, &water, &SymptomThresholdClassifier::default())
        .expect("scenario inputs join cleanly")
}

/// A larger seeded synthetic dataset
#[must_use]
pub fn seeded_dataset(seed: u64, record_count: usize) -> CanonicalDataset {
    let config = PipelineConfig {
        seed: Some(seed),
        record_count,
        ..PipelineConfig::default()
    };
    build_canonical(&config, as_of()).expect("synthetic data joins cleanly")
}
