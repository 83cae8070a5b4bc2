//! Chart-spec building.
//!
//! Figures are assembled here, server-side, as Plotly-style JSON; the
//! dashboard page hands them to the rendering library unchanged and the
//! Visualization agent only writes captions. A kind whose data
//! requirements are unmet is skipped.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::profile::correlation_matrix;
use crate::domain::dataset::Dataset;

/// Histograms are built for at most this many numeric columns
const MAX_DISTRIBUTION_COLUMNS: usize = 3;

/// Bar charts are built for at most this many categorical columns
const MAX_BAR_COLUMNS: usize = 2;

/// Bar charts keep the most frequent values up to this count
const TOP_BAR_VALUES: usize = 10;

/// Trend lines are capped at this many points
const MAX_TREND_POINTS: usize = 100;

/// The chart kinds the dashboard can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    Heatmap,
    Distribution,
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Line => write!(f, "line"),
            ChartKind::Bar => write!(f, "bar"),
            ChartKind::Scatter => write!(f, "scatter"),
            ChartKind::Heatmap => write!(f, "heatmap"),
            ChartKind::Distribution => write!(f, "distribution"),
        }
    }
}

/// One renderable chart
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub id: Uuid,
    pub kind: ChartKind,
    pub title: String,
    /// Plotly-style figure: `{"data": [...], "layout": {...}}`
    pub figure: serde_json::Value,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: impl Into<String>, figure: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            figure,
        }
    }

    /// A spec is well-formed when its figure carries at least one trace.
    pub fn is_well_formed(&self) -> bool {
        self.figure
            .get("data")
            .and_then(|data| data.as_array())
            .map(|traces| !traces.is_empty())
            .unwrap_or(false)
    }
}

/// Build every requested chart the dataset can support, in a fixed order.
pub fn build_charts(dataset: &Dataset, kinds: &[ChartKind]) -> Vec<ChartSpec> {
    let mut charts = Vec::new();

    if kinds.contains(&ChartKind::Heatmap) {
        charts.extend(heatmap(dataset));
    }
    if kinds.contains(&ChartKind::Distribution) {
        charts.extend(distributions(dataset));
    }
    if kinds.contains(&ChartKind::Bar) {
        charts.extend(bars(dataset));
    }
    if kinds.contains(&ChartKind::Scatter) {
        charts.extend(scatter(dataset));
    }
    if kinds.contains(&ChartKind::Line) {
        charts.extend(trend_line(dataset));
    }

    charts
}

/// Correlation heatmap; needs at least two numeric columns
fn heatmap(dataset: &Dataset) -> Option<ChartSpec> {
    let (names, matrix) = correlation_matrix(dataset);
    if names.len() < 2 {
        return None;
    }

    let figure = json!({
        "data": [{
            "type": "heatmap",
            "x": names.clone(),
            "y": names,
            "z": matrix,
            "colorscale": "RdBu",
            "zmin": -1.0,
            "zmax": 1.0,
        }],
        "layout": { "title": "Correlation Matrix" }
    });

    Some(ChartSpec::new(ChartKind::Heatmap, "Correlation Matrix", figure))
}

/// Histograms for the first few numeric columns
fn distributions(dataset: &Dataset) -> Vec<ChartSpec> {
    dataset
        .numeric_columns()
        .take(MAX_DISTRIBUTION_COLUMNS)
        .map(|column| {
            let title = format!("Distribution of {}", column.name());
            let figure = json!({
                "data": [{
                    "type": "histogram",
                    "x": column.numbers(),
                    "nbinsx": 30,
                }],
                "layout": { "title": title.clone(), "xaxis": { "title": column.name() } }
            });
            ChartSpec::new(ChartKind::Distribution, title, figure)
        })
        .collect()
}

/// Top-value bar charts for the first few categorical columns
fn bars(dataset: &Dataset) -> Vec<ChartSpec> {
    dataset
        .categorical_columns()
        .take(MAX_BAR_COLUMNS)
        .filter_map(|column| {
            let mut counts: std::collections::HashMap<&str, usize> =
                std::collections::HashMap::new();
            for label in column.labels() {
                *counts.entry(label).or_insert(0) += 1;
            }
            if counts.is_empty() {
                return None;
            }

            let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            ranked.truncate(TOP_BAR_VALUES);

            let labels: Vec<&str> = ranked.iter().map(|(value, _)| *value).collect();
            let values: Vec<usize> = ranked.iter().map(|(_, count)| *count).collect();

            let title = format!("Top Values in {}", column.name());
            let figure = json!({
                "data": [{
                    "type": "bar",
                    "x": labels,
                    "y": values,
                }],
                "layout": { "title": title.clone(), "xaxis": { "title": column.name() } }
            });
            Some(ChartSpec::new(ChartKind::Bar, title, figure))
        })
        .collect()
}

/// Scatter of the first two numeric columns
fn scatter(dataset: &Dataset) -> Option<ChartSpec> {
    let columns: Vec<_> = dataset.numeric_columns().take(2).collect();
    if columns.len() < 2 {
        return None;
    }

    let title = format!("{} vs {}", columns[0].name(), columns[1].name());
    let figure = json!({
        "data": [{
            "type": "scatter",
            "mode": "markers",
            "x": columns[0].numbers(),
            "y": columns[1].numbers(),
        }],
        "layout": {
            "title": title.clone(),
            "xaxis": { "title": columns[0].name() },
            "yaxis": { "title": columns[1].name() },
        }
    });

    Some(ChartSpec::new(ChartKind::Scatter, title, figure))
}

/// Trend of the first numeric column over row order, capped
fn trend_line(dataset: &Dataset) -> Option<ChartSpec> {
    let column = dataset.numeric_columns().next()?;
    let values: Vec<f64> = column.numbers().into_iter().take(MAX_TREND_POINTS).collect();
    let index: Vec<usize> = (0..values.len()).collect();

    let title = format!("Trend Analysis: {}", column.name());
    let figure = json!({
        "data": [{
            "type": "scatter",
            "mode": "lines",
            "x": index,
            "y": values,
        }],
        "layout": { "title": title.clone(), "yaxis": { "title": column.name() } }
    });

    Some(ChartSpec::new(ChartKind::Line, title, figure))
}
