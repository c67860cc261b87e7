//! File ingestion
//!
//! Reads health records and water samples from CSV or Parquet files and returns
//! them in the same shape the synthetic generator produces. Every row is checked
//! against the data model before it is handed on.

pub mod adapt;

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use std::time::Instant;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;

use crate::error::{PipelineError, Result};
use crate::ingest::adapt::{adapt_batch, text_schema};
use crate::join::check_unique_patients;
use crate::models::records::split_symptoms_legacy;
use crate::models::{ArrowRecord, HealthRecord, WaterSample};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Default number of rows per record batch
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Batch size, overridable through `HYDRO_BATCH_SIZE`
#[must_use]
pub fn batch_size() -> usize {
    std::env::var("HYDRO_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_BATCH_SIZE)
}

/// Records that can be read from an input file
pub trait IngestRecord: ArrowRecord {
    /// Plural noun used in log lines
    const KIND: &'static str;

    /// Check one decoded row against the data model
    fn check(&self) -> Result<()>;

    /// Rewrite a decoded row written by older tools into canonical form
    fn normalize(self) -> Self {
        self
    }

    /// Check constraints that span the whole file
    fn check_all(_records: &[Self]) -> Result<()> {
        Ok(())
    }
}

impl IngestRecord for HealthRecord {
    const KIND: &'static str = "health records";

    fn check(&self) -> Result<()> {
        self.validate()
    }

    /// A field without `;` but with commas is a comma-separated list
    fn normalize(mut self) -> Self {
        if self.symptoms.len() == 1 && self.symptoms[0].contains(',') {
            self.symptoms = split_symptoms_legacy(&self.symptoms[0]);
        }
        self
    }

    fn check_all(records: &[Self]) -> Result<()> {
        check_unique_patients(records)
    }
}

impl IngestRecord for WaterSample {
    const KIND: &'static str = "water samples";

    fn check(&self) -> Result<()> {
        self.validate()
    }
}

/// Input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Parquet,
}

impl InputFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") => Ok(Self::Parquet),
            _ => Err(PipelineError::UnsupportedFormat(format!(
                "cannot ingest {}",
                path.display()
            ))),
        }
    }
}

pub fn read_health_csv(path: &Path) -> Result<Vec<HealthRecord>> {
    read_csv(path)
}

pub fn read_water_csv(path: &Path) -> Result<Vec<WaterSample>> {
    read_csv(path)
}

pub fn read_health_parquet(path: &Path) -> Result<Vec<HealthRecord>> {
    read_parquet(path)
}

pub fn read_water_parquet(path: &Path) -> Result<Vec<WaterSample>> {
    read_parquet(path)
}

pub async fn read_health_parquet_async(path: &Path) -> Result<Vec<HealthRecord>> {
    read_parquet_async(path).await
}

pub async fn read_water_parquet_async(path: &Path) -> Result<Vec<WaterSample>> {
    read_parquet_async(path).await
}

/// Read a CSV or Parquet file, chosen by extension
pub fn read_records<T: IngestRecord>(path: &Path) -> Result<Vec<T>> {
    match InputFormat::from_path(path)? {
        InputFormat::Csv => read_csv(path),
        InputFormat::Parquet => read_parquet(path),
    }
}

/// Read a CSV file with a header row; columns are matched by name
pub fn read_csv<T: IngestRecord>(path: &Path) -> Result<Vec<T>> {
    let start = Instant::now();
    log_operation_start(&format!("Reading {} from CSV", T::KIND), path);

    let mut file = File::open(path)?;
    let (header, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(0))?;
    file.rewind()?;

    let reader = ReaderBuilder::new(text_schema(&header))
        .with_header(true)
        .with_batch_size(batch_size())
        .build(file)?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let records = decode(path, &batches)?;

    log_operation_complete(
        &format!("Read {}", T::KIND),
        path,
        records.len(),
        Some(start.elapsed()),
    );
    Ok(records)
}

/// Read a Parquet file; columns are matched by name
pub fn read_parquet<T: IngestRecord>(path: &Path) -> Result<Vec<T>> {
    let start = Instant::now();
    log_operation_start(&format!("Reading {} from Parquet", T::KIND), path);

    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size())
        .build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let records = decode(path, &batches)?;

    log_operation_complete(
        &format!("Read {}", T::KIND),
        path,
        records.len(),
        Some(start.elapsed()),
    );
    Ok(records)
}

/// Read a Parquet file without blocking the runtime
pub async fn read_parquet_async<T: IngestRecord>(path: &Path) -> Result<Vec<T>> {
    let start = Instant::now();
    log_operation_start(&format!("Reading {} from Parquet asynchronously", T::KIND), path);

    let file = tokio::fs::File::open(path).await?;
    let stream = ParquetRecordBatchStreamBuilder::new(file)
        .await?
        .with_batch_size(batch_size())
        .build()?;

    let batches = stream.try_collect::<Vec<_>>().await?;
    let records = decode(path, &batches)?;

    log_operation_complete(
        &format!("Read {}", T::KIND),
        path,
        records.len(),
        Some(start.elapsed()),
    );
    Ok(records)
}

/// Write rows to a Parquet file with the canonical schema
pub fn write_parquet<T: ArrowRecord>(path: &Path, rows: &[T]) -> Result<()> {
    let start = Instant::now();
    log_operation_start("Writing Parquet", path);

    let batch = T::to_record_batch(rows)?;
    let mut file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(&mut file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    file.flush()?;

    log_operation_complete("Wrote Parquet", path, rows.len(), Some(start.elapsed()));
    Ok(())
}

/// Adapt, decode and check every batch, naming the offending row on failure
fn decode<T: IngestRecord>(path: &Path, batches: &[RecordBatch]) -> Result<Vec<T>> {
    let schema = T::schema();
    let mut records = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());

    for batch in batches {
        let adapted = adapt_batch(batch, &schema).map_err(|e| in_file(path, e))?;
        let decoded = T::from_record_batch(&adapted).map_err(|e| in_file(path, e))?;
        records.extend(decoded.into_iter().map(IngestRecord::normalize));
    }

    for (row, record) in records.iter().enumerate() {
        record.check().map_err(|e| match e {
            PipelineError::Schema(message) => PipelineError::Schema(format!(
                "{} row {}: {message}",
                path.display(),
                row + 1
            )),
            other => other,
        })?;
    }
    T::check_all(&records).map_err(|e| in_file(path, e))?;
    Ok(records)
}

fn in_file(path: &Path, error: PipelineError) -> PipelineError {
    match error {
        PipelineError::Schema(message) => {
            PipelineError::Schema(format!("{}: {message}", path.display()))
        }
        other => other,
    }
}
