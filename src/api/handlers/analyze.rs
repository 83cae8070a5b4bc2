use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::agents::types::{CrewRunResult, RunMetadata, StageOutput};
use crate::agents::Crew;
use crate::analysis::{AnalysisDepth, AnalysisOptions, ChartKind, ChartSpec, DatasetProfile};
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::config::RunConfig;
use crate::domain::dataset::Dataset;

const DEFAULT_DATASET_NAME: &str = "upload.csv";

/// Request body for a full analysis run
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Raw CSV text; the page reads the chosen file client-side
    pub csv_data: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub analysis_depth: Option<AnalysisDepth>,
    #[serde(default)]
    pub chart_types: Option<Vec<ChartKind>>,
    /// Sidebar override; takes precedence over GEMINI_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sidebar override; takes precedence over MODEL
    #[serde(default)]
    pub model: Option<String>,
}

/// Response from a completed analysis run
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub run_id: Uuid,
    pub report: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub charts: Vec<ChartSpec>,
    pub stage_outputs: Vec<StageOutput>,
    pub profile: DatasetProfile,
    pub metadata: RunMetadata,
}

impl From<CrewRunResult> for AnalyzeResponse {
    fn from(result: CrewRunResult) -> Self {
        Self {
            run_id: result.metadata.run_id,
            report: result.report,
            insights: result.insights,
            recommendations: result.recommendations,
            charts: result.charts,
            stage_outputs: result.stage_outputs,
            profile: result.profile,
            metadata: result.metadata,
        }
    }
}

/// Request body for a profile-only preview
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub csv_data: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub analysis_depth: Option<AnalysisDepth>,
}

/// Response from a preview: the profile, no model calls
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub profile: DatasetProfile,
    pub observations: Vec<String>,
}

/// Run the full agent pipeline against an uploaded dataset
///
/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if request.csv_data.len() > state.config.max_upload_bytes {
        return Err(ApiError::payload_too_large(format!(
            "upload exceeds the {} MB limit",
            state.config.max_upload_bytes / (1024 * 1024)
        )));
    }

    // Credential resolution happens before the dataset is even parsed, so
    // a missing key never costs a network call.
    let run = RunConfig::resolve(
        &state.config,
        request.model.as_deref(),
        request.api_key.as_deref(),
    )?;

    let name = request
        .filename
        .unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string());
    let dataset = Dataset::from_csv(name, &request.csv_data)?;

    let options = AnalysisOptions {
        depth: request.analysis_depth.unwrap_or_default(),
        chart_kinds: request
            .chart_types
            .unwrap_or_else(|| AnalysisOptions::default().chart_kinds),
    };

    info!(
        "analyze request: {} rows, {} columns, model {}",
        dataset.row_count(),
        dataset.column_count(),
        run.model
    );

    let crew = Crew::new();
    let result = crew
        .run(state.llm.as_ref(), &run, &dataset, &options)
        .await
        .map_err(|e| {
            error!("analysis run failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(AnalyzeResponse::from(result)))
}

/// Validate an upload and return its statistical profile
///
/// POST /api/preview
pub async fn preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    if request.csv_data.len() > state.config.max_upload_bytes {
        return Err(ApiError::payload_too_large(format!(
            "upload exceeds the {} MB limit",
            state.config.max_upload_bytes / (1024 * 1024)
        )));
    }

    let name = request
        .filename
        .unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string());
    let dataset = Dataset::from_csv(name, &request.csv_data)?;

    let profile = DatasetProfile::build(&dataset, request.analysis_depth.unwrap_or_default());
    let observations = profile.observations();

    Ok(Json(PreviewResponse {
        profile,
        observations,
    }))
}
