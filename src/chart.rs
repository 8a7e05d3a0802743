//! Chart projection - filtered rows to a Plotly 3D scatter figure
//!
//! One point per surviving row:
//! - x/y/z: sensor type, signal technique, track parameter (categorical)
//! - marker size and colour: shared references (linear)
//! - hover: all five columns verbatim
//!
//! `render` is pure; the figure serialises to the JSON `Plotly.react` expects.

use serde::Serialize;

use crate::dataset::{Dimension, Row, Table, COL_REFERENCES, COL_SHARED};
use crate::filter::{filter_rows, Selection};

/// Largest marker diameter in px, Plotly Express default
const MAX_MARKER_SIZE: f64 = 20.0;
const COLORSCALE: &str = "Plasma";
const AXIS_TITLE_SIZE: u32 = 14;
const TICK_SIZE: u32 = 10;
const TICK_ANGLE: i32 = 45;
const MARGIN_TOP: u32 = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Scatter3d>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter3d {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub mode: &'static str,
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub z: Vec<String>,
    pub marker: Marker,
    /// Per point: [sensor, signal, track, shared references, references]
    pub customdata: Vec<HoverData>,
    pub hovertemplate: String,
}

/// Hover payload, serialised as a 5-element array
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverData(pub String, pub String, pub String, pub f64, pub String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: Vec<f64>,
    pub sizemode: &'static str,
    pub sizeref: f64,
    pub sizemin: f64,
    pub color: Vec<f64>,
    pub colorscale: &'static str,
    pub showscale: bool,
    pub colorbar: ColorBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub scene: Scene,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
    pub tickfont: Font,
    pub tickangle: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
}

impl ChartSpec {
    pub fn point_count(&self) -> usize {
        self.data.iter().map(|trace| trace.x.len()).sum()
    }
}

/// Filter `table` by `selection` and project the survivors into a figure
pub fn render(table: &Table, selection: &Selection) -> ChartSpec {
    let rows = filter_rows(table, selection);
    tracing::debug!("render: {} of {} rows pass selection", rows.len(), table.len());
    ChartSpec {
        data: vec![project(&rows)],
        layout: layout(),
    }
}

fn project(rows: &[&Row]) -> Scatter3d {
    let shared: Vec<f64> = rows.iter().map(|r| r.shared_references).collect();

    Scatter3d {
        trace_type: "scatter3d",
        mode: "markers",
        x: column(rows, Dimension::Sensor),
        y: column(rows, Dimension::Signal),
        z: column(rows, Dimension::Track),
        marker: Marker {
            size: shared.clone(),
            sizemode: "area",
            sizeref: size_ref(&shared),
            sizemin: 0.0,
            color: shared,
            colorscale: COLORSCALE,
            showscale: true,
            colorbar: ColorBar {
                title: Title { text: COL_SHARED.to_string(), font: None },
            },
        },
        customdata: rows
            .iter()
            .map(|r| {
                HoverData(
                    r.sensor_type.clone(),
                    r.signal_technique.clone(),
                    r.track_parameter.clone(),
                    r.shared_references,
                    r.references.clone(),
                )
            })
            .collect(),
        hovertemplate: hover_template(),
    }
}

fn column(rows: &[&Row], dimension: Dimension) -> Vec<String> {
    rows.iter().map(|r| dimension.value(r).to_string()).collect()
}

/// Area sizing: the largest value maps to `MAX_MARKER_SIZE` px
fn size_ref(sizes: &[f64]) -> f64 {
    let max = sizes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() && max > 0.0 {
        2.0 * max / (MAX_MARKER_SIZE * MAX_MARKER_SIZE)
    } else {
        1.0
    }
}

fn hover_template() -> String {
    let labels = [
        Dimension::Sensor.column(),
        Dimension::Signal.column(),
        Dimension::Track.column(),
        COL_SHARED,
        COL_REFERENCES,
    ];
    let mut lines: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{}=%{{customdata[{}]}}", label, i))
        .collect();
    if let Some(last) = lines.last_mut() {
        last.push_str("<extra></extra>");
    }
    lines.join("<br>")
}

fn layout() -> Layout {
    Layout {
        scene: Scene {
            xaxis: axis(Dimension::Sensor),
            yaxis: axis(Dimension::Signal),
            zaxis: axis(Dimension::Track),
        },
        margin: Margin { l: 0, r: 0, b: 0, t: MARGIN_TOP },
    }
}

fn axis(dimension: Dimension) -> Axis {
    Axis {
        title: Title {
            text: dimension.column().to_string(),
            font: Some(Font { size: AXIS_TITLE_SIZE }),
        },
        tickfont: Font { size: TICK_SIZE },
        tickangle: TICK_ANGLE,
    }
}
