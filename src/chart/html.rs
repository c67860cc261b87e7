//! Interactive HTML chart rendering
//!
//! The page draws the chart with plotly.js from a JSON copy of the chart
//! description embedded in a `<script type="application/json">` element, which
//! [`read_embedded_spec`] reads back. The page itself is the `chart.html` template.

use askama::Template;

use crate::chart::ChartSpec;
use crate::error::{PipelineError, Result};
use crate::models::ViewSelector;

const SPEC_OPEN_TAG: &str = r#"<script type="application/json" id="chart-spec">"#;
const SCRIPT_CLOSE_TAG: &str = "</script>";

/// Standalone chart page; `json` keeps `<`, `>` and `&` out of the embedded script
#[derive(Template)]
#[template(path = "chart.html")]
struct ChartPage<'a> {
    title: &'a str,
    view: &'a str,
    spec: &'a ChartSpec,
}

/// Render a chart as a standalone HTML page
pub fn render(view: ViewSelector, spec: &ChartSpec) -> Result<Vec<u8>> {
    let page = ChartPage {
        title: &spec.title,
        view: view.file_stem(),
        spec,
    };
    Ok(page.render()?.into_bytes())
}

/// Recover the chart description embedded by [`render`], if present
pub fn read_embedded_spec(html: &str) -> Result<Option<ChartSpec>> {
    let Some(start) = html.find(SPEC_OPEN_TAG) else {
        return Ok(None);
    };
    let body = &html[start + SPEC_OPEN_TAG.len()..];
    let end = body
        .find(SCRIPT_CLOSE_TAG)
        .ok_or_else(|| PipelineError::Render("unterminated chart description".to_string()))?;

    Ok(Some(serde_json::from_str(&body[..end])?))
}
