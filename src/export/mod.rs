//! Exporter
//!
//! Serializes record tables to CSV and chart descriptions to PNG or HTML. Empty
//! inputs still serialize: a table without rows becomes a header-only CSV and a
//! chart without data points renders an empty plot.

pub mod csv;
pub mod pool;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use crate::chart::{self, ChartSpec};
use crate::config::ChartConfig;
use crate::error::{PipelineError, Result};
use crate::models::{ArrowRecord, ViewSelector};
use crate::utils::logging::{log_operation_complete, log_operation_start};

pub use pool::{ChartJob, ExportPool};

/// Target format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Delimited text, tables only
    Csv,
    /// Still image, charts only
    Png,
    /// Interactive chart markup, charts only
    Html,
}

impl ExportFormat {
    pub const ALL: [Self; 3] = [Self::Csv, Self::Png, Self::Html];

    /// File extension without the leading dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Png => "png",
            Self::Html => "html",
        }
    }

    /// Whether this format holds a chart rather than a table
    #[must_use]
    pub const fn is_chart(self) -> bool {
        matches!(self, Self::Png | Self::Html)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == normalized)
            .ok_or_else(|| PipelineError::UnsupportedFormat(s.to_string()))
    }
}

/// A serialized export ready to be written or served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl Artifact {
    #[must_use]
    pub fn new(stem: &str, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("{stem}.{}", format.extension()),
            format,
            bytes,
        }
    }

    /// Write the artifact into `dir` under its file name
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        log_operation_start("Writing export", &path);
        fs::write(&path, &self.bytes)?;
        log::debug!("Wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

/// Serialize table rows; only CSV is a table format
pub fn export_table<T: ArrowRecord>(rows: &[T], format: ExportFormat) -> Result<Vec<u8>> {
    if format.is_chart() {
        return Err(PipelineError::UnsupportedFormat(format!(
            "tables export as csv, not {format}"
        )));
    }
    csv::write_table(rows)
}

/// Serialize a chart description; only PNG and HTML are chart formats
pub fn export_chart(
    view: ViewSelector,
    spec: &ChartSpec,
    format: ExportFormat,
    config: &ChartConfig,
) -> Result<Vec<u8>> {
    let start = Instant::now();
    let bytes = match format {
        ExportFormat::Png => chart::png::render(view, spec, config)?,
        ExportFormat::Html => chart::html::render(view, spec)?,
        ExportFormat::Csv => {
            return Err(PipelineError::UnsupportedFormat(format!(
                "charts export as png or html, not {format}"
            )));
        }
    };

    log_operation_complete(
        &format!("Rendered {format} chart"),
        Path::new(view.file_stem()),
        spec.kind.len(),
        Some(start.elapsed()),
    );
    Ok(bytes)
}
