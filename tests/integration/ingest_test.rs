use std::fs;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;

use crate::utils::{date, scenario_inputs};
use hydro_health::ingest::{
    read_health_csv, read_health_parquet, read_health_parquet_async, read_water_csv,
    read_water_parquet, read_water_parquet_async, write_parquet,
};
use hydro_health::{
    CanonicalDataset, ChartConfig, HealthRecord, Pipeline, PipelineError, SymptomThresholdClassifier,
    aggregate,
};

#[test]
fn test_health_csv() -> hydro_health::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("health.csv");
    fs::write(
        &path,
        "Patient_ID,Age,Symptoms,Location,Date\n\
         1,34,Diarrhea;Fever,Assam,2024-05-02\n\
         2,8,\"Fever,Vomiting\",Tripura,2024-05-03\n",
    )?;

    let records = read_health_csv(&path)?;
    assert_eq!(
        records,
        vec![
            HealthRecord::new(1, 34, ["Diarrhea", "Fever"], "Assam", date(2024, 5, 2)),
            HealthRecord::new(2, 8, ["Fever", "Vomiting"], "Tripura", date(2024, 5, 3)),
        ]
    );
    Ok(())
}

#[test]
fn test_csv_schema_errors() -> hydro_health::Result<()> {
    let dir = tempfile::tempdir()?;

    let missing = dir.path().join("missing.csv");
    fs::write(&missing, "Patient_ID,Age,Location,Date\n1,34,Assam,2024-05-02\n")?;
    let err = read_health_csv(&missing).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(ref m) if m.contains("Symptoms")), "{err}");

    let bad_age = dir.path().join("bad_age.csv");
    fs::write(
        &bad_age,
        "Patient_ID,Age,Symptoms,Location,Date\n1,34,Fever,Assam,2024-05-02\n2,0,Fever,Assam,2024-05-02\n",
    )?;
    let err = read_health_csv(&bad_age).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(ref m) if m.contains("row 2")), "{err}");

    let bad_date = dir.path().join("bad_date.csv");
    fs::write(&bad_date, "Patient_ID,Age,Symptoms,Location,Date\n1,34,Fever,Assam,yesterday\n")?;
    assert!(matches!(read_health_csv(&bad_date), Err(PipelineError::Schema(_))));
    Ok(())
}

#[test]
fn test_parquet_round_trip() -> hydro_health::Result<()> {
    let (health, water) = scenario_inputs();
    let dir = tempfile::tempdir()?;
    let health_path = dir.path().join("health.parquet");
    let water_path = dir.path().join("water.parquet");

    write_parquet(&health_path, &health)?;
    write_parquet(&water_path, &water)?;

    assert_eq!(read_health_parquet(&health_path)?, health);
    assert_eq!(read_water_parquet(&water_path)?, water);
    Ok(())
}

/// Parquet written by other tools may use wider types and a different column order
#[test]
fn test_parquet_with_foreign_types() -> hydro_health::Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Bacterial_Count", DataType::Int64, true),
        Field::new("pH", DataType::Float64, true),
        Field::new("Location", DataType::Utf8, true),
        Field::new("Turbidity", DataType::Float64, true),
        Field::new("Notes", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![350, 100])),
        Arc::new(Float64Array::from(vec![7.4, 6.6])),
        Arc::new(StringArray::from(vec!["Assam", "Tripura"])),
        Arc::new(Float64Array::from(vec![12.5, 30.0])),
        Arc::new(StringArray::from(vec!["river", "well"])),
    ];
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("water.parquet");
    let mut writer = ArrowWriter::try_new(fs::File::create(&path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    let (_, expected) = scenario_inputs();
    assert_eq!(read_water_parquet(&path)?, expected);
    Ok(())
}

#[tokio::test]
async fn test_async_parquet() -> hydro_health::Result<()> {
    let (health, water) = scenario_inputs();
    let dir = tempfile::tempdir()?;
    let health_path = dir.path().join("health.parquet");
    let water_path = dir.path().join("water.parquet");
    write_parquet(&health_path, &health)?;
    write_parquet(&water_path, &water)?;

    assert_eq!(read_health_parquet_async(&health_path).await?, health);
    assert_eq!(read_water_parquet_async(&water_path).await?, water);

    let pipeline = Pipeline::from_parquet_async(
        &health_path,
        &water_path,
        &SymptomThresholdClassifier::default(),
        ChartConfig::default(),
    )
    .await?;
    assert_eq!(pipeline.snapshot().len(), 5);
    Ok(())
}

#[test]
fn test_pipeline_from_mixed_files() -> hydro_health::Result<()> {
    let (health, _) = scenario_inputs();
    let dir = tempfile::tempdir()?;
    let health_path = dir.path().join("health.parquet");
    let water_path = dir.path().join("water.csv");
    write_parquet(&health_path, &health)?;
    fs::write(&water_path, "Location,pH,Turbidity,Bacterial_Count\nAssam,7.4,12.5,350\n")?;

    let pipeline = Pipeline::from_files(
        &health_path,
        &water_path,
        &SymptomThresholdClassifier::default(),
        ChartConfig::default(),
    )?;

    // Tripura has no water sample, so its records drop out of the join
    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.locations(), vec!["Assam"]);
    let summary = aggregate(snapshot.records());
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total_cases, 3);

    let duplicate = dir.path().join("duplicate.csv");
    fs::write(&duplicate, "Location,pH,Turbidity,Bacterial_Count\nAssam,7.4,12.5,350\nAssam,7.0,1,60\n")?;
    assert_eq!(read_water_csv(&duplicate)?.len(), 2);
    let err = pipeline
        .reload_from_files(&health_path, &duplicate, &SymptomThresholdClassifier::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
    assert_eq!(pipeline.snapshot().version(), 1);
    Ok(())
}

#[test]
fn test_duplicate_patient_ids_rejected() -> hydro_health::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("health.csv");
    fs::write(
        &path,
        "Patient_ID,Age,Symptoms,Location,Date\n\
         1,34,Fever,Assam,2024-05-02\n\
         1,40,Vomiting,Assam,2024-05-03\n",
    )?;

    let err = read_health_csv(&path).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(ref m) if m.contains("duplicate patient id 1")), "{err}");

    let health = vec![
        HealthRecord::new(1, 34, ["Fever"], "Assam", date(2024, 5, 2)),
        HealthRecord::new(1, 40, ["Vomiting"], "Assam", date(2024, 5, 3)),
    ];
    let (_, water) = scenario_inputs();
    let built = CanonicalDataset::build(&health, &water, &SymptomThresholdClassifier::default());
    assert!(matches!(built, Err(PipelineError::Schema(_))));
    Ok(())
}

/// Semicolon-separated fields keep commas inside symptom names
#[test]
fn test_symptom_names_with_commas() -> hydro_health::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("health.csv");
    fs::write(
        &path,
        "Patient_ID,Age,Symptoms,Location,Date\n\
         1,34,\"Pain, abdominal;Fever\",Assam,2024-05-02\n",
    )?;

    let records = read_health_csv(&path)?;
    assert_eq!(records[0].symptoms.as_slice(), ["Pain, abdominal", "Fever"]);
    Ok(())
}
