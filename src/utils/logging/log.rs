//! Uniform log lines for reads and writes

use std::path::Path;
use std::time::Duration;

/// Log that `operation` is starting on `target`
pub fn log_operation_start(operation: &str, target: &Path) {
    log::info!("{operation}: {}", target.display());
}

/// Log that `operation` finished on `target` after handling `rows` rows
///
/// # Arguments
/// * `operation` - Past-tense description, e.g. "Read health records"
/// * `target` - File the operation read or wrote
/// * `rows` - Number of rows (or artifacts) handled
/// * `elapsed` - Wall time, when measured
pub fn log_operation_complete(operation: &str, target: &Path, rows: usize, elapsed: Option<Duration>) {
    match elapsed {
        Some(elapsed) => log::info!(
            "{operation}: {rows} rows, {} ({elapsed:?})",
            target.display()
        ),
        None => log::info!("{operation}: {rows} rows, {}", target.display()),
    }
}

/// Log a recoverable problem, optionally tied to a file
pub fn log_warning(message: &str, target: Option<&Path>) {
    match target {
        Some(target) => log::warn!("{message}: {}", target.display()),
        None => log::warn!("{message}"),
    }
}
