use crate::utils::{date, scenario_dataset, seeded_dataset};
use hydro_health::chart::{default_title, html, png};
use hydro_health::filter::covering_request;
use hydro_health::{
    ChartConfig, ChartJob, ChartKind, ChartSpec, ExportFormat, ExportPool, FilterRequest,
    PipelineError, ViewSelector, export_chart, export_table, filter, shape_view,
};

fn specs_for_all_views(request: &FilterRequest) -> Vec<(ViewSelector, ChartSpec)> {
    let dataset = seeded_dataset(23, 80);
    let records = filter(&dataset, request);
    ViewSelector::ALL
        .into_iter()
        .map(|view| {
            let data = shape_view(view, &records);
            (view, ChartSpec::for_view(&data, default_title(view, request.location())))
        })
        .collect()
}

/// The chart description embedded in PNG and HTML exports reads back unchanged
#[test]
fn test_chart_exports_are_lossless() -> hydro_health::Result<()> {
    let request = FilterRequest::new("All", date(2024, 6, 1), date(2024, 6, 30))?;
    let config = ChartConfig { width: 320, height: 240 };

    for (view, spec) in specs_for_all_views(&request) {
        let bytes = export_chart(view, &spec, ExportFormat::Png, &config)?;
        assert_eq!(png::read_embedded_spec(&bytes)?, Some(spec.clone()), "{view}");

        let bytes = export_chart(view, &spec, ExportFormat::Html, &config)?;
        let page = String::from_utf8(bytes).expect("utf-8 html");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert_eq!(html::read_embedded_spec(&page)?, Some(spec), "{view}");
    }
    Ok(())
}

/// Charts with no data points still serialize
#[test]
fn test_empty_charts_serialize() -> hydro_health::Result<()> {
    let request = FilterRequest::new("Sikkim", date(2024, 6, 1), date(2024, 6, 30))?;

    for (view, spec) in specs_for_all_views(&request) {
        assert!(spec.kind.is_empty());
        for format in [ExportFormat::Png, ExportFormat::Html] {
            let bytes = export_chart(view, &spec, format, &ChartConfig::default())?;
            assert!(!bytes.is_empty());
        }
    }
    Ok(())
}

#[test]
fn test_chart_kinds_per_view() -> hydro_health::Result<()> {
    let dataset = scenario_dataset();
    let request = covering_request(&dataset).expect("non-empty dataset");
    let records = filter(&dataset, &request);

    let spec = ChartSpec::for_view(&shape_view(ViewSelector::RiskBySite, &records), "risk");
    match spec.kind {
        ChartKind::Bar { categories, values, .. } => {
            assert_eq!(categories, vec!["Assam", "Tripura"]);
            assert_eq!(values, vec![3.0, 0.0]);
        }
        other => panic!("expected a bar chart, got {other:?}"),
    }

    let spec = ChartSpec::for_view(&shape_view(ViewSelector::SymptomDistribution, &records), "symptoms");
    match spec.kind {
        ChartKind::Pie { labels, values } => {
            assert_eq!(labels[0], "Fever");
            assert_eq!(values[0], 3.0);
            assert_eq!(values.iter().sum::<f64>(), 7.0);
        }
        other => panic!("expected a pie chart, got {other:?}"),
    }

    let spec = ChartSpec::for_view(&shape_view(ViewSelector::ScatterView, &records), "scatter");
    match spec.kind {
        ChartKind::Scatter { points, .. } => {
            assert_eq!(points.len(), 5);
            assert_eq!(points.iter().filter(|p| p.highlighted).count(), 3);
        }
        other => panic!("expected a scatter chart, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unsupported_formats() -> hydro_health::Result<()> {
    for name in ["pdf", "xlsx", "", "svg"] {
        let err = name.parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
    }

    let records = scenario_dataset().records().to_vec();
    for format in [ExportFormat::Png, ExportFormat::Html] {
        assert!(matches!(
            export_table(&records, format),
            Err(PipelineError::UnsupportedFormat(_))
        ));
    }

    let spec = ChartSpec::new("Raw Records (All)", ChartKind::Table { header: Vec::new(), rows: Vec::new() });
    assert!(matches!(
        export_chart(ViewSelector::RawTable, &spec, ExportFormat::Csv, &ChartConfig::default()),
        Err(PipelineError::UnsupportedFormat(_))
    ));
    Ok(())
}

#[test]
fn test_export_pool_renders_in_order() -> hydro_health::Result<()> {
    let request = FilterRequest::new("Assam", date(2024, 6, 1), date(2024, 6, 30))?;
    let jobs: Vec<ChartJob> = specs_for_all_views(&request)
        .into_iter()
        .flat_map(|(view, spec)| {
            [ExportFormat::Png, ExportFormat::Html].map(|format| ChartJob::new(view, spec.clone(), format))
        })
        .collect();

    let pool = ExportPool::new(3, ChartConfig { width: 200, height: 150 })?;
    let results = pool.render_all(&jobs);
    assert_eq!(results.len(), jobs.len());

    for (job, result) in jobs.iter().zip(results) {
        let artifact = result?;
        assert_eq!(
            artifact.file_name,
            format!("{}.{}", job.view.file_stem(), job.format.extension())
        );
        let recovered = match job.format {
            ExportFormat::Png => png::read_embedded_spec(&artifact.bytes)?,
            _ => html::read_embedded_spec(&String::from_utf8(artifact.bytes).expect("utf-8 html"))?,
        };
        assert_eq!(recovered.as_ref(), Some(&job.spec));
    }
    Ok(())
}
