//! Logging helpers for file-backed operations
//!
//! Ingestion and export report their start and completion through these so that
//! every stage logs in the same shape.

pub mod log;

pub use log::{log_operation_complete, log_operation_start, log_warning};
