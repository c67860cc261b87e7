//! Arrow schemas and record batch conversions for the pipeline's entities
//!
//! Column names and order follow the export formats: raw records are written as
//! `Patient_ID,Age,Symptoms,Location,Date,pH,Turbidity,Bacterial_Count,Risk` and
//! summaries as `Location,Total_Cases,High_Risk_Cases,Avg_Bacterial_Count,Avg_pH`.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float64Array, StringArray, UInt8Array,
    UInt32Array,
};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, FieldRef, Schema, SchemaRef};
use chrono::{Datelike, NaiveDate};

use crate::error::{PipelineError, Result};
use crate::models::records::{HealthRecord, JoinedRecord, WaterSample, join_symptoms, split_symptoms};
use crate::models::summary::SummaryRow;

/// Column names shared by the schemas
pub mod columns {
    pub const PATIENT_ID: &str = "Patient_ID";
    pub const AGE: &str = "Age";
    pub const SYMPTOMS: &str = "Symptoms";
    pub const LOCATION: &str = "Location";
    pub const DATE: &str = "Date";
    pub const PH: &str = "pH";
    pub const TURBIDITY: &str = "Turbidity";
    pub const BACTERIAL_COUNT: &str = "Bacterial_Count";
    pub const RISK: &str = "Risk";
    pub const TOTAL_CASES: &str = "Total_Cases";
    pub const HIGH_RISK_CASES: &str = "High_Risk_Cases";
    pub const AVG_BACTERIAL_COUNT: &str = "Avg_Bacterial_Count";
    pub const AVG_PH: &str = "Avg_pH";
}

use columns::*;

/// Days between 0001-01-01 and the Unix epoch
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a calendar date to Arrow's `Date32` representation
#[must_use]
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Convert an Arrow `Date32` value back to a calendar date
#[must_use]
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// An entity with a fixed Arrow schema that converts to and from record batches
pub trait ArrowRecord: Sized {
    /// The canonical schema, columns in declared order
    fn schema() -> SchemaRef;

    /// Convert a slice of entities to a record batch with `schema()`
    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch>;

    /// Convert a record batch with `schema()` back to entities
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>>;

    /// Column names in declared order
    #[must_use]
    fn column_names() -> Vec<String> {
        Self::schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }
}

/// Look up a non-null column by name and downcast it to its concrete array type
fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::schema(format!("missing column '{name}'")))?;

    if array.null_count() > 0 {
        return Err(PipelineError::schema(format!(
            "column '{name}' contains {} null value(s)",
            array.null_count()
        )));
    }

    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        PipelineError::schema(format!(
            "column '{name}' has unexpected type {}",
            array.data_type()
        ))
    })
}

fn date_at(dates: &Date32Array, row: usize) -> Result<NaiveDate> {
    days_to_date(dates.value(row))
        .ok_or_else(|| PipelineError::schema(format!("row {row} has an out-of-range date")))
}

impl ArrowRecord for HealthRecord {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new(PATIENT_ID, DataType::UInt32, false),
            Field::new(AGE, DataType::UInt8, false),
            Field::new(SYMPTOMS, DataType::Utf8, false),
            Field::new(LOCATION, DataType::Utf8, false),
            Field::new(DATE, DataType::Date32, false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.patient_id))),
            Arc::new(UInt8Array::from_iter_values(rows.iter().map(|r| r.age))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| join_symptoms(&r.symptoms)),
            )),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.location.as_str()))),
            Arc::new(Date32Array::from_iter_values(
                rows.iter().map(|r| date_to_days(r.observed_date)),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let ids = column::<UInt32Array>(batch, PATIENT_ID)?;
        let ages = column::<UInt8Array>(batch, AGE)?;
        let symptoms = column::<StringArray>(batch, SYMPTOMS)?;
        let locations = column::<StringArray>(batch, LOCATION)?;
        let dates = column::<Date32Array>(batch, DATE)?;

        (0..batch.num_rows())
            .map(|row| {
                Ok(Self {
                    patient_id: ids.value(row),
                    age: ages.value(row),
                    symptoms: split_symptoms(symptoms.value(row)),
                    location: locations.value(row).to_string(),
                    observed_date: date_at(dates, row)?,
                })
            })
            .collect()
    }
}

impl ArrowRecord for WaterSample {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new(LOCATION, DataType::Utf8, false),
            Field::new(PH, DataType::Float64, false),
            Field::new(TURBIDITY, DataType::Float64, false),
            Field::new(BACTERIAL_COUNT, DataType::UInt32, false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.location.as_str()))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.ph))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.turbidity))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.bacterial_count))),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let locations = column::<StringArray>(batch, LOCATION)?;
        let ph = column::<Float64Array>(batch, PH)?;
        let turbidity = column::<Float64Array>(batch, TURBIDITY)?;
        let bacteria = column::<UInt32Array>(batch, BACTERIAL_COUNT)?;

        Ok((0..batch.num_rows())
            .map(|row| Self {
                location: locations.value(row).to_string(),
                ph: ph.value(row),
                turbidity: turbidity.value(row),
                bacterial_count: bacteria.value(row),
            })
            .collect())
    }
}

impl ArrowRecord for JoinedRecord {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new(PATIENT_ID, DataType::UInt32, false),
            Field::new(AGE, DataType::UInt8, false),
            Field::new(SYMPTOMS, DataType::Utf8, false),
            Field::new(LOCATION, DataType::Utf8, false),
            Field::new(DATE, DataType::Date32, false),
            Field::new(PH, DataType::Float64, false),
            Field::new(TURBIDITY, DataType::Float64, false),
            Field::new(BACTERIAL_COUNT, DataType::UInt32, false),
            Field::new(RISK, DataType::Boolean, false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.patient_id))),
            Arc::new(UInt8Array::from_iter_values(rows.iter().map(|r| r.age))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(JoinedRecord::symptoms_field),
            )),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.location.as_str()))),
            Arc::new(Date32Array::from_iter_values(
                rows.iter().map(|r| date_to_days(r.observed_date)),
            )),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.ph))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.turbidity))),
            Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.bacterial_count))),
            Arc::new(rows.iter().map(|r| Some(r.risk)).collect::<BooleanArray>()),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let ids = column::<UInt32Array>(batch, PATIENT_ID)?;
        let ages = column::<UInt8Array>(batch, AGE)?;
        let symptoms = column::<StringArray>(batch, SYMPTOMS)?;
        let locations = column::<StringArray>(batch, LOCATION)?;
        let dates = column::<Date32Array>(batch, DATE)?;
        let ph = column::<Float64Array>(batch, PH)?;
        let turbidity = column::<Float64Array>(batch, TURBIDITY)?;
        let bacteria = column::<UInt32Array>(batch, BACTERIAL_COUNT)?;
        let risk = column::<BooleanArray>(batch, RISK)?;

        (0..batch.num_rows())
            .map(|row| {
                Ok(Self {
                    patient_id: ids.value(row),
                    age: ages.value(row),
                    symptoms: split_symptoms(symptoms.value(row)),
                    location: locations.value(row).to_string(),
                    observed_date: date_at(dates, row)?,
                    ph: ph.value(row),
                    turbidity: turbidity.value(row),
                    bacterial_count: bacteria.value(row),
                    risk: risk.value(row),
                })
            })
            .collect()
    }
}

impl ArrowRecord for SummaryRow {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new(LOCATION, DataType::Utf8, false),
            Field::new(TOTAL_CASES, DataType::UInt64, false),
            Field::new(HIGH_RISK_CASES, DataType::UInt64, false),
            Field::new(AVG_BACTERIAL_COUNT, DataType::Float64, false),
            Field::new(AVG_PH, DataType::Float64, false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        // Use the predefined schema so column types do not depend on the sample rows
        let fields: Vec<FieldRef> = Self::schema().fields().iter().map(Arc::clone).collect();
        Ok(serde_arrow::to_record_batch(&fields, &rows)?)
    }

    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        Ok(serde_arrow::from_record_batch::<Vec<Self>>(batch)?)
    }
}
