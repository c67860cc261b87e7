//! Shared helpers used across the pipeline stages

pub mod logging;
