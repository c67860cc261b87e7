//! CSV table serialization through the Arrow CSV writer

use std::io::Cursor;

use arrow::csv::{ReaderBuilder, WriterBuilder};
use regex::Regex;

use crate::error::{PipelineError, Result};
use crate::models::ArrowRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Matches nothing, so empty fields read back as empty strings instead of nulls
const NO_NULLS: &str = r"^\b$";

/// Write rows as CSV with a header in canonical column order
pub fn write_table<T: ArrowRecord>(rows: &[T]) -> Result<Vec<u8>> {
    let batch = T::to_record_batch(rows)?;

    let mut buffer = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_date_format(DATE_FORMAT.to_string())
            .build(&mut buffer);
        // The header is written even when the batch holds no rows
        writer.write(&batch)?;
    }
    Ok(buffer)
}

/// Parse CSV written by [`write_table`] back into rows
pub fn read_table<T: ArrowRecord>(bytes: &[u8]) -> Result<Vec<T>> {
    let no_nulls = Regex::new(NO_NULLS).map_err(|e| PipelineError::schema(e.to_string()))?;
    let reader = ReaderBuilder::new(T::schema())
        .with_header(true)
        .with_null_regex(no_nulls)
        .build(Cursor::new(bytes))?;

    let mut rows = Vec::new();
    for batch in reader {
        rows.extend(T::from_record_batch(&batch?)?);
    }
    Ok(rows)
}
