//! Domain models for the pipeline
//!
//! - `records`: health records, water samples and the joined records built from them
//! - `summary`: per-location aggregates
//! - `request`: filter requests and location selectors
//! - `view`: view selectors and view-shaped data
//! - `schema`: Arrow schemas and record batch conversions

pub mod records;
pub mod request;
pub mod schema;
pub mod summary;
pub mod view;

pub use records::{HealthRecord, JoinedRecord, LinkedRecord, Symptoms, WaterSample};
pub use request::{FilterRequest, LocationSelector};
pub use schema::ArrowRecord;
pub use summary::SummaryRow;
pub use view::{ExposurePoint, SiteRisk, SymptomCount, ViewData, ViewSelector};
