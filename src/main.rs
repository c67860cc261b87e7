use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use hydro_health::chart::default_title;
use hydro_health::{
    Artifact, ChartJob, ChartSpec, ExportFormat, ExportPool, Pipeline, PipelineConfig,
    ViewSelector, shape_view,
};
use log::{error, info, warn};

const CHART_FORMATS: [ExportFormat; 2] = [ExportFormat::Png, ExportFormat::Html];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let start = Instant::now();

    let output_dir = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("output"), PathBuf::from);

    let config = match std::env::var_os("HYDRO_CONFIG") {
        Some(path) => PipelineConfig::from_json_file(Path::new(&path))
            .with_context(|| format!("Failed to load config from {}", Path::new(&path).display()))?,
        None => PipelineConfig::default(),
    }
    .with_env_overrides();

    let as_of = chrono::Local::now().date_naive();
    let pipeline = Pipeline::synthetic(&config, as_of).context("Failed to build dataset")?;

    let Some(request) = pipeline.covering_request() else {
        warn!("Dataset is empty, nothing to export");
        return Ok(());
    };
    info!(
        "Exporting {} to {} for {} .. {}",
        request.location(),
        output_dir.display(),
        request.start_date(),
        request.end_date()
    );

    let records = pipeline.filter(&request);
    let summary = pipeline.aggregate(&records);

    let mut artifacts = vec![
        Artifact::new(
            "filtered_raw_data",
            ExportFormat::Csv,
            pipeline.export_table(&records, ExportFormat::Csv)?,
        ),
        Artifact::new(
            "summary_data",
            ExportFormat::Csv,
            pipeline.export_table(&summary, ExportFormat::Csv)?,
        ),
    ];

    let jobs: Vec<ChartJob> = ViewSelector::ALL
        .into_iter()
        .flat_map(|view| {
            let data = shape_view(view, &records);
            let spec = ChartSpec::for_view(&data, default_title(view, request.location()));
            CHART_FORMATS.map(|format| ChartJob::new(view, spec.clone(), format))
        })
        .collect();

    let pool = ExportPool::from_config(&config).context("Failed to start export workers")?;
    let results = tokio::task::spawn_blocking(move || pool.render_all(&jobs)).await?;

    let mut failures = 0;
    for result in results {
        match result {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                error!("Chart export failed: {e}");
                failures += 1;
            }
        }
    }

    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    for artifact in &artifacts {
        artifact
            .write_to(&output_dir)
            .with_context(|| format!("Failed to write {}", artifact.file_name))?;
    }

    info!(
        "Wrote {} artifacts to {} in {:?}",
        artifacts.len(),
        output_dir.display(),
        start.elapsed()
    );

    if failures > 0 {
        anyhow::bail!("{failures} chart export(s) failed");
    }
    Ok(())
}
