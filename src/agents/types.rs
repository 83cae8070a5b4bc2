use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisDepth, ChartSpec, DatasetProfile};

/// The four analysis roles, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    DataAnalyst,
    BusinessIntelligence,
    ReportWriter,
    Visualization,
}

impl AgentRole {
    /// Fixed execution order: analyze, derive insights, write, visualize
    pub const PIPELINE: [AgentRole; 4] = [
        AgentRole::DataAnalyst,
        AgentRole::BusinessIntelligence,
        AgentRole::ReportWriter,
        AgentRole::Visualization,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AgentRole::DataAnalyst => "Data Analyst",
            AgentRole::BusinessIntelligence => "Business Intelligence Analyst",
            AgentRole::ReportWriter => "Report Writer",
            AgentRole::Visualization => "Visualization Specialist",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Static description of one crew member
#[derive(Debug, Clone, Serialize)]
pub struct AgentDescriptor {
    pub role: AgentRole,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub task: &'static str,
}

impl AgentDescriptor {
    pub fn for_role(role: AgentRole) -> Self {
        match role {
            AgentRole::DataAnalyst => Self {
                role,
                goal: "Analyze CSV data and provide statistical insights",
                backstory: "Expert in statistical analysis and data quality assessment",
                task: "Analyze the uploaded CSV data and provide statistical insights",
            },
            AgentRole::BusinessIntelligence => Self {
                role,
                goal: "Generate actionable business insights from data",
                backstory: "Experienced business analyst with domain expertise",
                task: "Generate business insights from the data analysis",
            },
            AgentRole::ReportWriter => Self {
                role,
                goal: "Create comprehensive business reports",
                backstory: "Technical writer specializing in data-driven reports",
                task: "Create a comprehensive report with findings and recommendations",
            },
            AgentRole::Visualization => Self {
                role,
                goal: "Select and caption charts that communicate the data clearly",
                backstory: "Data visualization specialist focused on business dashboards",
                task: "Review the prepared charts and write a short caption for each",
            },
        }
    }

    /// The full crew in pipeline order. Construction is deterministic:
    /// the same four descriptors in the same order on every call.
    pub fn crew() -> Vec<AgentDescriptor> {
        AgentRole::PIPELINE.iter().copied().map(Self::for_role).collect()
    }
}

/// Raw output of one pipeline stage
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    pub role: AgentRole,
    pub output: String,
}

/// Bookkeeping for one completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub model: String,
    pub analysis_depth: AnalysisDepth,
    pub row_count: usize,
    pub column_count: usize,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: f64,
}

/// Everything one crew run produces
#[derive(Debug, Clone, Serialize)]
pub struct CrewRunResult {
    pub report: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub charts: Vec<ChartSpec>,
    pub stage_outputs: Vec<StageOutput>,
    pub profile: DatasetProfile,
    pub metadata: RunMetadata,
}
