//! Bounded worker pool for chart rendering
//!
//! Rasterising charts is the only CPU-heavy step of a request. Jobs run on a
//! dedicated rayon pool so concurrent exports cannot starve the rest of the
//! process, and results come back in job order.

use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::chart::ChartSpec;
use crate::config::{ChartConfig, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::export::{Artifact, ExportFormat, export_chart};
use crate::models::ViewSelector;

/// One chart to render
#[derive(Debug, Clone, PartialEq)]
pub struct ChartJob {
    pub view: ViewSelector,
    pub spec: ChartSpec,
    pub format: ExportFormat,
}

impl ChartJob {
    #[must_use]
    pub fn new(view: ViewSelector, spec: ChartSpec, format: ExportFormat) -> Self {
        Self { view, spec, format }
    }

    fn render(&self, config: &ChartConfig) -> Result<Artifact> {
        let bytes = export_chart(self.view, &self.spec, self.format, config)?;
        Ok(Artifact::new(self.view.file_stem(), self.format, bytes))
    }
}

/// Renders batches of chart jobs on a fixed number of threads
#[derive(Debug)]
pub struct ExportPool {
    pool: ThreadPool,
    chart: ChartConfig,
}

impl ExportPool {
    /// Create a pool with `workers` threads (at least one)
    pub fn new(workers: usize, chart: ChartConfig) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|index| format!("chart-export-{index}"))
            .build()
            .map_err(|e| PipelineError::Render(format!("failed to start export workers: {e}")))?;

        log::debug!("Started export pool with {} workers", pool.current_num_threads());
        Ok(Self { pool, chart })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.export_workers, config.chart)
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Render every job, returning one result per job in the same order
    ///
    /// A failing job does not affect the others.
    pub fn render_all(&self, jobs: &[ChartJob]) -> Vec<Result<Artifact>> {
        let start = Instant::now();
        let chart = &self.chart;
        let results: Vec<Result<Artifact>> = self
            .pool
            .install(|| jobs.par_iter().map(|job| job.render(chart)).collect());

        log::info!(
            "Rendered {} of {} charts on {} workers in {:?}",
            results.iter().filter(|r| r.is_ok()).count(),
            jobs.len(),
            self.workers(),
            start.elapsed()
        );
        results
    }
}
