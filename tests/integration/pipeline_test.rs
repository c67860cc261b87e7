use crate::utils::{date, scenario_dataset, seeded_dataset};
use hydro_health::export::csv::read_table;
use hydro_health::filter::covering_request;
use hydro_health::{
    CanonicalDataset, ExportFormat, FilterRequest, HealthRecord, JoinedRecord, LocationSelector,
    PipelineError, SummaryRow, SymptomThresholdClassifier, WaterSample, aggregate, export_table,
    filter,
};

/// Every filtered record matches the location and lies in the inclusive date range
#[test]
fn test_filter_output_within_request() -> hydro_health::Result<()> {
    let dataset = seeded_dataset(11, 200);

    for location in ["All", "Assam", "Tripura", "Megalaya", "Manipur", "sikkim"] {
        let request = FilterRequest::new(location, date(2024, 6, 5), date(2024, 6, 20))?;
        let records = filter(&dataset, &request);

        for record in &records {
            assert!(request.location().matches(&record.location));
            if location != "All" {
                assert_eq!(record.location, location);
            }
            assert!(record.observed_date >= request.start_date());
            assert!(record.observed_date <= request.end_date());
        }

        // Nothing that should match was left out
        let expected = dataset
            .records()
            .iter()
            .filter(|r| request.location().matches(&r.location) && request.contains_date(r.observed_date))
            .count();
        assert_eq!(records.len(), expected);
    }
    Ok(())
}

/// Summary totals add up to the number of filtered records
#[test]
fn test_aggregate_totals_match_filter() -> hydro_health::Result<()> {
    let dataset = seeded_dataset(3, 500);
    let request = covering_request(&dataset).expect("non-empty dataset");

    for location in ["All", "Assam", "sikkim", "Nowhere"] {
        let request = FilterRequest::new(location, request.start_date(), request.end_date())?;
        let records = filter(&dataset, &request);
        let summary = aggregate(&records);
        let total: u64 = summary.iter().map(|row| row.total_cases).sum();
        assert_eq!(total, records.len() as u64);
        assert!(summary.iter().all(|row| row.high_risk_cases <= row.total_cases));
    }
    Ok(())
}

#[test]
fn test_filter_is_idempotent() -> hydro_health::Result<()> {
    let dataset = seeded_dataset(5, 300);
    let request = FilterRequest::new("Manipur", date(2024, 6, 1), date(2024, 6, 30))?;

    let first = filter(&dataset, &request);
    let second = filter(&dataset, &request);
    assert_eq!(first, second);
    assert_eq!(
        export_table(&first, ExportFormat::Csv)?,
        export_table(&second, ExportFormat::Csv)?
    );
    Ok(())
}

#[test]
fn test_csv_round_trip() -> hydro_health::Result<()> {
    let dataset = seeded_dataset(17, 120);
    let records = dataset.records().to_vec();

    let parsed: Vec<JoinedRecord> = read_table(&export_table(&records, ExportFormat::Csv)?)?;
    assert_eq!(parsed, records);

    let summary = aggregate(&records);
    let parsed: Vec<SummaryRow> = read_table(&export_table(&summary, ExportFormat::Csv)?)?;
    assert_eq!(parsed, summary);
    Ok(())
}

/// Commas inside symptom names survive a CSV round trip through standard quoting
#[test]
fn test_csv_round_trip_with_commas() -> hydro_health::Result<()> {
    let health = vec![
        HealthRecord::new(1, 30, ["Pain, abdominal"], "Assam", date(2024, 5, 2)),
        HealthRecord::new(2, 45, ["Fever", "Pain, abdominal"], "", date(2024, 5, 3)),
    ];
    let water = vec![
        WaterSample::new("Assam", 7.4, 12.5, 350),
        WaterSample::new("", 6.9, 3.0, 40),
    ];
    let dataset = CanonicalDataset::build(&health, &water, &SymptomThresholdClassifier::default())?;
    let records = dataset.records().to_vec();

    let bytes = export_table(&records, ExportFormat::Csv)?;
    assert!(String::from_utf8_lossy(&bytes).contains("\"Pain, abdominal\""));
    let parsed: Vec<JoinedRecord> = read_table(&bytes)?;
    assert_eq!(parsed, records);
    Ok(())
}

#[test]
fn test_date_bounds_are_inclusive() -> hydro_health::Result<()> {
    let dataset = scenario_dataset();
    let observed = date(2024, 5, 10);

    let same_day = FilterRequest::new("All", observed, observed)?;
    let ids: Vec<u32> = filter(&dataset, &same_day).iter().map(|r| r.patient_id).collect();
    assert_eq!(ids, vec![3]);

    let day_after = observed.succ_opt().expect("valid date");
    let later = FilterRequest::new("Assam", day_after, day_after)?;
    assert!(filter(&dataset, &later).is_empty());
    Ok(())
}

#[test]
fn test_reversed_range_is_rejected() {
    let err = FilterRequest::new("All", date(2024, 5, 2), date(2024, 5, 1)).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidRequest(_)));
}

#[test]
fn test_assam_tripura_scenario() -> hydro_health::Result<()> {
    let dataset = scenario_dataset();
    let request = covering_request(&dataset).expect("non-empty dataset");
    assert_eq!(request.location(), &LocationSelector::All);

    let summary = aggregate(&filter(&dataset, &request));
    assert_eq!(summary.len(), 2);

    let assam = &summary[0];
    assert_eq!(assam.location, "Assam");
    assert_eq!(assam.total_cases, 3);
    assert!(assam.high_risk_cases >= 1);
    assert_eq!(assam.high_risk_cases, 3);
    assert!((assam.avg_bacterial_count - 350.0).abs() < 1e-9);

    let tripura = &summary[1];
    assert_eq!(tripura.location, "Tripura");
    assert_eq!(tripura.total_cases, 2);
    assert_eq!(tripura.high_risk_cases, 0);
    assert!((tripura.avg_ph - 6.6).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_unknown_location_scenario() -> hydro_health::Result<()> {
    let dataset = scenario_dataset();
    let request = FilterRequest::new("Sikkim", date(2024, 1, 1), date(2024, 12, 31))?;

    let records = filter(&dataset, &request);
    assert!(records.is_empty());

    let summary = aggregate(&records);
    assert!(summary.is_empty());

    let csv = String::from_utf8(export_table(&records, ExportFormat::Csv)?).expect("utf-8 csv");
    assert_eq!(
        csv.trim_end(),
        "Patient_ID,Age,Symptoms,Location,Date,pH,Turbidity,Bacterial_Count,Risk"
    );

    let csv = String::from_utf8(export_table(&summary, ExportFormat::Csv)?).expect("utf-8 csv");
    assert_eq!(csv.lines().count(), 1);
    Ok(())
}

#[test]
fn test_seeded_generation_is_reproducible() {
    let first = seeded_dataset(42, 50);
    let second = seeded_dataset(42, 50);
    assert_eq!(first.records(), second.records());
    assert_eq!(first.len(), 50);
}
