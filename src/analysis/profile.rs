//! Dataset profiling.
//!
//! Computes the statistical snapshot that is embedded in the response for
//! the preview panel and rendered as text context for the agent crew.

use serde::Serialize;

use super::AnalysisDepth;
use crate::domain::dataset::{ColumnData, Dataset};

/// Correlation coefficients at or above this magnitude are called out
pub const CORRELATION_THRESHOLD: f64 = 0.7;

/// How many top categorical values are kept per column
const TOP_VALUES: usize = 10;

/// Descriptive statistics for one numeric column
#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Values outside `[q1 - 1.5*IQR, q3 + 1.5*IQR]`
    pub outliers: usize,
    pub skewness: f64,
    /// Rough normality note: `|skewness| < 0.5`
    pub is_normal: bool,
}

/// One correlated column pair
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub coefficient: f64,
}

/// A categorical value and how often it occurs
#[derive(Debug, Clone, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Frequency summary for one categorical column
#[derive(Debug, Clone, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub distinct: usize,
    pub top_values: Vec<ValueCount>,
}

/// Statistical snapshot of one uploaded dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub datetime_columns: Vec<String>,
    pub missing_cells: usize,
    pub completeness_pct: f64,
    pub numeric_summaries: Vec<NumericSummary>,
    /// Pairwise correlations; empty below Detailed depth
    pub correlations: Vec<CorrelationPair>,
    pub strong_correlations: Vec<CorrelationPair>,
    pub categorical_summaries: Vec<CategoricalSummary>,
}

impl DatasetProfile {
    /// Profile a dataset at the requested depth.
    pub fn build(dataset: &Dataset, depth: AnalysisDepth) -> Self {
        let numeric_summaries: Vec<NumericSummary> = dataset
            .numeric_columns()
            .map(|column| summarize_numeric(column.name(), &column.numbers(), column.missing()))
            .collect();

        let (correlations, strong_correlations) = if depth >= AnalysisDepth::Detailed {
            let pairs = correlation_pairs(dataset);
            let strong = pairs
                .iter()
                .filter(|pair| pair.coefficient.abs() >= CORRELATION_THRESHOLD)
                .cloned()
                .collect();
            (pairs, strong)
        } else {
            (Vec::new(), Vec::new())
        };

        let categorical_summaries = dataset
            .categorical_columns()
            .map(|column| summarize_categorical(column.name(), &column.labels()))
            .collect();

        Self {
            name: dataset.name().to_string(),
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            numeric_columns: dataset
                .numeric_columns()
                .map(|c| c.name().to_string())
                .collect(),
            categorical_columns: dataset
                .categorical_columns()
                .map(|c| c.name().to_string())
                .collect(),
            datetime_columns: dataset
                .datetime_columns()
                .map(|c| c.name().to_string())
                .collect(),
            missing_cells: dataset.missing_cells(),
            completeness_pct: dataset.completeness(),
            numeric_summaries,
            correlations,
            strong_correlations,
            categorical_summaries,
        }
    }

    /// Data-quality observations derived from the profile.
    ///
    /// These are deterministic seeds handed to the Business Intelligence
    /// agent alongside the raw numbers.
    pub fn observations(&self) -> Vec<String> {
        let mut observations = Vec::new();

        if self.completeness_pct > 95.0 {
            observations.push(format!(
                "Excellent data quality with {:.1}% completeness",
                self.completeness_pct
            ));
        } else if self.completeness_pct > 80.0 {
            observations.push(format!(
                "Good data quality with {:.1}% completeness",
                self.completeness_pct
            ));
        } else {
            observations.push(format!(
                "Data quality needs attention - only {:.1}% complete",
                self.completeness_pct
            ));
        }

        if self.row_count > 10_000 {
            observations
                .push("Large dataset detected - suitable for robust statistical analysis".into());
        } else if self.row_count > 1_000 {
            observations.push("Medium-sized dataset - good for trend analysis".into());
        } else {
            observations.push(
                "Small dataset - consider collecting more data for stronger insights".into(),
            );
        }

        if !self.strong_correlations.is_empty() {
            observations.push(format!(
                "Found {} strong correlations between variables",
                self.strong_correlations.len()
            ));
        }

        let total_outliers: usize = self.numeric_summaries.iter().map(|s| s.outliers).sum();
        if total_outliers > 0 {
            observations.push(format!(
                "Detected {} potential outliers across all numeric columns",
                total_outliers
            ));
        }

        let normal_columns = self
            .numeric_summaries
            .iter()
            .filter(|s| s.is_normal)
            .count();
        if normal_columns > 0 {
            observations.push(format!(
                "{} columns show approximately normal distribution",
                normal_columns
            ));
        }

        observations
    }

    /// Actionable recommendations derived from the profile, capped at five.
    pub fn recommendations(&self) -> Vec<String> {
        let mut recommendations = Vec::new();

        if self.missing_cells > 0 {
            recommendations.push(format!(
                "Address {} missing values to improve data completeness",
                self.missing_cells
            ));
        }

        if self.row_count < 1_000 {
            recommendations
                .push("Consider collecting more data for more robust statistical analysis".into());
        }

        if self.numeric_columns.len() < 3 {
            recommendations
                .push("Consider adding more quantitative measures for deeper insights".into());
        }

        recommendations.extend([
            "Implement regular data quality monitoring".to_string(),
            "Set up automated reporting for key metrics".to_string(),
            "Consider advanced analytics for predictive insights".to_string(),
        ]);

        recommendations.truncate(5);
        recommendations
    }

    /// Render the profile as plain text for a model prompt.
    pub fn prompt_context(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Dataset: {} ({} rows, {} columns, {:.1}% complete)\n",
            self.name, self.row_count, self.column_count, self.completeness_pct
        ));
        out.push_str(&format!(
            "Numeric columns: {}\nCategorical columns: {}\nDatetime columns: {}\n",
            join_or_none(&self.numeric_columns),
            join_or_none(&self.categorical_columns),
            join_or_none(&self.datetime_columns),
        ));

        out.push_str("\nNumeric summaries:\n");
        for summary in &self.numeric_summaries {
            out.push_str(&format!(
                "- {}: count={}, mean={:.2}, std={:.2}, min={:.2}, median={:.2}, max={:.2}, outliers={}, skewness={:.2}\n",
                summary.column,
                summary.count,
                summary.mean,
                summary.std_dev,
                summary.min,
                summary.median,
                summary.max,
                summary.outliers,
                summary.skewness,
            ));
        }

        if !self.correlations.is_empty() {
            out.push_str("\nCorrelations:\n");
            for pair in &self.correlations {
                out.push_str(&format!(
                    "- {} vs {}: {:.2}\n",
                    pair.left, pair.right, pair.coefficient
                ));
            }
        }

        for summary in &self.categorical_summaries {
            out.push_str(&format!(
                "\nTop values in {} ({} distinct):\n",
                summary.column, summary.distinct
            ));
            for item in &summary.top_values {
                out.push_str(&format!("- {}: {}\n", item.value, item.count));
            }
        }

        out
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

fn summarize_numeric(name: &str, values: &[f64], missing: usize) -> NumericSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = mean(&sorted);
    let std_dev = std_dev(&sorted, mean);
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;
    let outliers = sorted.iter().filter(|&&v| v < lower || v > upper).count();
    let skewness = skewness(&sorted, mean);

    NumericSummary {
        column: name.to_string(),
        count,
        missing,
        mean,
        std_dev,
        min: sorted.first().copied().unwrap_or_default(),
        q1,
        median,
        q3,
        max: sorted.last().copied().unwrap_or_default(),
        outliers,
        skewness,
        is_normal: skewness.abs() < 0.5,
    }
}

fn summarize_categorical(name: &str, labels: &[&str]) -> CategoricalSummary {
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let distinct = counts.len();

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // Highest count first; ties broken alphabetically for stable output
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(TOP_VALUES);

    CategoricalSummary {
        column: name.to_string(),
        distinct,
        top_values: ranked
            .into_iter()
            .map(|(value, count)| ValueCount {
                value: value.to_string(),
                count,
            })
            .collect(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Quantile with linear interpolation over a sorted slice
fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let position = p * (n - 1) as f64;
            let lower = position.floor() as usize;
            let fraction = position - lower as f64;
            if lower + 1 < n {
                sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
            } else {
                sorted[lower]
            }
        }
    }
}

/// Adjusted Fisher-Pearson sample skewness
fn skewness(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }
    let m2: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    if m2 == 0.0 {
        return 0.0;
    }
    let m3: f64 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n as f64;
    let g1 = m3 / m2.powf(1.5);
    ((n * (n - 1)) as f64).sqrt() / (n - 2) as f64 * g1
}

/// Pearson correlation over row-aligned pairs where both cells are present
fn pearson(left: &[Option<f64>], right: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = left
        .iter()
        .zip(right)
        .filter_map(|(a, b)| Some((((*a)?), ((*b)?))))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (a, b) in &pairs {
        covariance += (a - mean_a) * (b - mean_b);
        variance_a += (a - mean_a).powi(2);
        variance_b += (b - mean_b).powi(2);
    }

    let denominator = (variance_a * variance_b).sqrt();
    if denominator == 0.0 {
        None
    } else {
        Some(covariance / denominator)
    }
}

fn numeric_cells(dataset: &Dataset) -> Vec<(&str, &[Option<f64>])> {
    dataset
        .numeric_columns()
        .filter_map(|column| match column.data() {
            ColumnData::Numeric(values) => Some((column.name(), values.as_slice())),
            _ => None,
        })
        .collect()
}

/// All distinct numeric column pairs with a defined coefficient
fn correlation_pairs(dataset: &Dataset) -> Vec<CorrelationPair> {
    let columns = numeric_cells(dataset);
    let mut pairs = Vec::new();
    for i in 0..columns.len() {
        for j in (i + 1)..columns.len() {
            if let Some(coefficient) = pearson(columns[i].1, columns[j].1) {
                pairs.push(CorrelationPair {
                    left: columns[i].0.to_string(),
                    right: columns[j].0.to_string(),
                    coefficient,
                });
            }
        }
    }
    pairs
}

/// Full correlation matrix for the heatmap chart
pub(crate) fn correlation_matrix(dataset: &Dataset) -> (Vec<String>, Vec<Vec<f64>>) {
    let columns = numeric_cells(dataset);
    let names: Vec<String> = columns.iter().map(|(name, _)| name.to_string()).collect();

    let matrix = (0..columns.len())
        .map(|i| {
            (0..columns.len())
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        pearson(columns[i].1, columns[j].1).unwrap_or(0.0)
                    }
                })
                .collect()
        })
        .collect();

    (names, matrix)
}
