//! Still-image chart rendering
//!
//! Charts are rasterised onto an RGB canvas and encoded as PNG. The image carries
//! no text of its own; the chart description is stored as an `iTXt` chunk so the
//! exact data behind the picture can be recovered with [`read_embedded_spec`].

use std::f64::consts::TAU;
use std::io::Cursor;

use image::{Rgb, RgbImage};

use crate::chart::{ChartKind, ChartSpec, ScatterPoint};
use crate::config::ChartConfig;
use crate::error::{PipelineError, Result};
use crate::models::ViewSelector;

/// `iTXt` keyword holding the chart description as JSON
pub const SPEC_KEYWORD: &str = "hydro-health:chart";
/// `iTXt` keyword holding the view the chart was rendered for
pub const VIEW_KEYWORD: &str = "hydro-health:view";

const MIN_DIMENSION: u32 = 64;
const MAX_DIMENSION: u32 = 8192;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([64, 64, 64]);
const GRID: Rgb<u8> = Rgb([200, 200, 200]);
const TABLE_HEADER: Rgb<u8> = Rgb([175, 238, 238]);
const TABLE_CELL: Rgb<u8> = Rgb([230, 230, 250]);
const POINT: Rgb<u8> = Rgb([31, 119, 180]);
const HIGHLIGHT: Rgb<u8> = Rgb([214, 39, 40]);

const PALETTE: [Rgb<u8>; 8] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
    Rgb([127, 127, 127]),
];

/// Pixel rectangle the data is drawn into, inside the canvas margins
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl PlotArea {
    fn new(canvas_width: u32, canvas_height: u32) -> Self {
        let margin_x = canvas_width / 10;
        let margin_y = canvas_height / 10;
        Self {
            left: margin_x,
            top: margin_y,
            width: canvas_width - 2 * margin_x,
            height: canvas_height - 2 * margin_y,
        }
    }

    const fn right(self) -> u32 {
        self.left + self.width
    }

    const fn bottom(self) -> u32 {
        self.top + self.height
    }
}

/// Render a chart to PNG bytes
pub fn render(view: ViewSelector, spec: &ChartSpec, config: &ChartConfig) -> Result<Vec<u8>> {
    for (name, value) in [("width", config.width), ("height", config.height)] {
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
            return Err(PipelineError::Render(format!(
                "chart {name} {value} is outside {MIN_DIMENSION}..={MAX_DIMENSION}"
            )));
        }
    }

    let mut canvas = RgbImage::from_pixel(config.width, config.height, BACKGROUND);
    let area = PlotArea::new(config.width, config.height);

    match &spec.kind {
        ChartKind::Pie { values, .. } => draw_pie(&mut canvas, area, values),
        ChartKind::Bar { values, .. } => draw_bars(&mut canvas, area, values),
        ChartKind::Scatter { points, .. } => draw_scatter(&mut canvas, area, points),
        ChartKind::Table { header, rows } => draw_table(&mut canvas, area, header.len(), rows.len()),
    }

    encode(&canvas, view, serde_json::to_string(spec)?)
}

/// Recover the chart description embedded by [`render`], if present
pub fn read_embedded_spec(bytes: &[u8]) -> Result<Option<ChartSpec>> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let reader = decoder
        .read_info()
        .map_err(|e| PipelineError::Render(format!("invalid PNG: {e}")))?;

    let Some(chunk) = reader
        .info()
        .utf8_text
        .iter()
        .find(|chunk| chunk.keyword == SPEC_KEYWORD)
    else {
        return Ok(None);
    };

    let text = chunk
        .get_text()
        .map_err(|e| PipelineError::Render(format!("unreadable chart chunk: {e}")))?;
    Ok(Some(serde_json::from_str(&text)?))
}

fn encode(canvas: &RgbImage, view: ViewSelector, spec_json: String) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.add_itxt_chunk(VIEW_KEYWORD.to_string(), view.file_stem().to_string())?;
        encoder.add_itxt_chunk(SPEC_KEYWORD.to_string(), spec_json)?;

        let mut writer = encoder.write_header()?;
        writer.write_image_data(canvas.as_raw())?;
        writer.finish()?;
    }
    Ok(bytes)
}

fn fill_rect(canvas: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let x1 = x1.min(canvas.width());
    let y1 = y1.min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

fn draw_axes(canvas: &mut RgbImage, area: PlotArea) {
    fill_rect(canvas, area.left, area.top, area.left + 2, area.bottom(), AXIS);
    fill_rect(canvas, area.left, area.bottom() - 2, area.right(), area.bottom(), AXIS);
}

fn draw_pie(canvas: &mut RgbImage, area: PlotArea, values: &[f64]) {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return;
    }

    // Cumulative slice boundaries as fractions of a full turn
    let bounds: Vec<f64> = values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v.max(0.0) / total;
            Some(*acc)
        })
        .collect();

    let cx = f64::from(area.left) + f64::from(area.width) / 2.0;
    let cy = f64::from(area.top) + f64::from(area.height) / 2.0;
    let radius = f64::from(area.width.min(area.height)) / 2.0;

    for y in area.top..area.bottom() {
        for x in area.left..area.right() {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            if dx.hypot(dy) > radius {
                continue;
            }
            // Clockwise from twelve o'clock
            let turn = (dx.atan2(-dy) + TAU) % TAU / TAU;
            let slice = bounds
                .iter()
                .position(|bound| turn < *bound)
                .unwrap_or(bounds.len() - 1);
            canvas.put_pixel(x, y, PALETTE[slice % PALETTE.len()]);
        }
    }
}

fn draw_bars(canvas: &mut RgbImage, area: PlotArea, values: &[f64]) {
    draw_axes(canvas, area);

    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if values.is_empty() || max <= 0.0 {
        return;
    }

    let slot = area.width / values.len() as u32;
    let gap = slot / 5;
    for (i, value) in values.iter().enumerate() {
        let bar_height = (value.max(0.0) / max * f64::from(area.height - 2)).round() as u32;
        let x0 = area.left + 2 + i as u32 * slot + gap;
        let x1 = area.left + 2 + (i as u32 + 1) * slot - gap;
        let y0 = area.bottom() - 2 - bar_height;
        fill_rect(canvas, x0, y0, x1.max(x0 + 1), area.bottom() - 2, PALETTE[i % PALETTE.len()]);
    }
}

/// Map `value` from `[min, max]` onto `[0, 1]`, padding a degenerate range
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        0.5
    } else {
        (value - min) / (max - min)
    }
}

fn draw_scatter(canvas: &mut RgbImage, area: PlotArea, points: &[ScatterPoint]) {
    draw_axes(canvas, area);

    let (min_x, max_x) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let (min_y, max_y) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));

    // Highlighted points last so they stay visible
    let ordered = points
        .iter()
        .filter(|p| !p.highlighted)
        .chain(points.iter().filter(|p| p.highlighted));

    for point in ordered {
        let (radius, color) = if point.highlighted { (6.0, HIGHLIGHT) } else { (4.0, POINT) };
        let cx = f64::from(area.left) + normalize(point.x, min_x, max_x) * f64::from(area.width);
        let cy = f64::from(area.bottom()) - normalize(point.y, min_y, max_y) * f64::from(area.height);
        draw_disc(canvas, cx, cy, radius, color);
    }
}

fn draw_disc(canvas: &mut RgbImage, cx: f64, cy: f64, radius: f64, color: Rgb<u8>) {
    let x0 = (cx - radius).floor().max(0.0) as u32;
    let y0 = (cy - radius).floor().max(0.0) as u32;
    let x1 = ((cx + radius).ceil() as u32).min(canvas.width());
    let y1 = ((cy + radius).ceil() as u32).min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            if dx.hypot(dy) <= radius {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

fn draw_table(canvas: &mut RgbImage, area: PlotArea, column_count: usize, row_count: usize) {
    let column_count = column_count.max(1) as u32;
    let band_count = row_count as u32 + 1;
    let row_height = (area.height / band_count).clamp(1, 24);
    let column_width = area.width / column_count;

    for band in 0..band_count {
        let y0 = area.top + band * row_height;
        if y0 >= area.bottom() {
            break;
        }
        let color = if band == 0 { TABLE_HEADER } else { TABLE_CELL };
        fill_rect(canvas, area.left, y0, area.right(), y0 + row_height, color);
        fill_rect(canvas, area.left, y0, area.right(), y0 + 1, GRID);
    }

    let table_bottom = (area.top + band_count * row_height).min(area.bottom());
    for column in 0..=column_count {
        let x = area.left + column * column_width;
        fill_rect(canvas, x, area.top, x + 1, table_bottom, GRID);
    }
}
