// Analysis layer module
//
// Local dataset profiling and chart-spec building. Everything here is
// deterministic; the model only ever narrates these numbers.

pub mod charts;
pub mod profile;

pub use charts::{build_charts, ChartKind, ChartSpec};
pub use profile::DatasetProfile;

use serde::{Deserialize, Serialize};

/// How much of the profile is computed and narrated
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    /// Summary statistics and data-quality observations
    #[default]
    Basic,
    /// Adds correlations, outliers, and distribution notes
    Detailed,
    /// Adds forward-looking recommendations from the model
    Comprehensive,
}

impl std::fmt::Display for AnalysisDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisDepth::Basic => write!(f, "Basic"),
            AnalysisDepth::Detailed => write!(f, "Detailed"),
            AnalysisDepth::Comprehensive => write!(f, "Comprehensive"),
        }
    }
}

/// Per-run analysis preferences from the dashboard
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub depth: AnalysisDepth,
    pub chart_kinds: Vec<ChartKind>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            depth: AnalysisDepth::Basic,
            chart_kinds: vec![ChartKind::Line, ChartKind::Bar],
        }
    }
}
