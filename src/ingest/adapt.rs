//! Adapting input batches to the canonical schemas
//!
//! Input files may order columns differently, carry extra columns or store values
//! with wider types (e.g. Int64 ages, string dates). Columns are matched by name
//! and cast to the canonical type; a missing column or a value that does not fit
//! is a schema error.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::compute::{CastOptions, can_cast_types, cast_with_options};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::error::{PipelineError, Result};

/// A schema with the same column names as `schema`, every column nullable Utf8
///
/// Used to read delimited text without trusting column positions.
#[must_use]
pub fn text_schema(schema: &Schema) -> SchemaRef {
    Arc::new(Schema::new(
        schema
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

/// Project and cast `batch` onto `target` by column name
pub fn adapt_batch(batch: &RecordBatch, target: &SchemaRef) -> Result<RecordBatch> {
    let source = batch.schema();
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };

    let columns = target
        .fields()
        .iter()
        .map(|field| {
            let name = field.name();
            let index = source
                .index_of(name)
                .map_err(|_| PipelineError::schema(format!("missing column '{name}'")))?;
            let array = batch.column(index);

            if array.null_count() > 0 {
                return Err(PipelineError::schema(format!(
                    "column '{name}' contains {} empty value(s)",
                    array.null_count()
                )));
            }
            if array.data_type() == field.data_type() {
                return Ok(Arc::clone(array));
            }
            if !can_cast_types(array.data_type(), field.data_type()) {
                return Err(PipelineError::schema(format!(
                    "column '{name}' has type {} which cannot be read as {}",
                    array.data_type(),
                    field.data_type()
                )));
            }
            cast_with_options(array, field.data_type(), &options).map_err(|e| {
                PipelineError::schema(format!("column '{name}' holds an invalid value: {e}"))
            })
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(Arc::clone(target), columns)?)
}
