//! The analysis crew.
//!
//! Four role-tagged agents run a fixed task pipeline against one uploaded
//! dataset: analyze, derive insights, write the report, caption the charts.
//! Each stage is one blocking model call; later stages see the outputs of
//! earlier ones. The crew itself holds no mutable state between runs.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{AgentError, AgentResult};
use super::gemini::{GenerateRequest, LlmClient};
use super::prompts::{library, PromptTemplate};
use super::types::{AgentDescriptor, AgentRole, CrewRunResult, RunMetadata, StageOutput};
use crate::analysis::{build_charts, AnalysisOptions, ChartSpec, DatasetProfile};
use crate::config::RunConfig;
use crate::domain::dataset::Dataset;

/// Sampling temperature used for every stage
const TEMPERATURE: f32 = 0.7;

/// The fixed four-agent crew
pub struct Crew {
    descriptors: Vec<AgentDescriptor>,
}

impl Crew {
    pub fn new() -> Self {
        Self {
            descriptors: AgentDescriptor::crew(),
        }
    }

    pub fn descriptors(&self) -> &[AgentDescriptor] {
        &self.descriptors
    }

    /// Run the full pipeline against one dataset.
    ///
    /// Profiling and chart building happen locally before any model call;
    /// the stages then narrate those numbers in order. Fails on the first
    /// stage error; nothing from a failed run is kept.
    pub async fn run(
        &self,
        llm: &dyn LlmClient,
        run: &RunConfig,
        dataset: &Dataset,
        options: &AnalysisOptions,
    ) -> AgentResult<CrewRunResult> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let profile = DatasetProfile::build(dataset, options.depth);
        let observations = profile.observations();
        let recommendations = profile.recommendations();
        let charts = build_charts(dataset, &options.chart_kinds);
        let context = profile.prompt_context();

        info!(
            "run {}: {} rows x {} columns, depth {}, {} charts",
            run_id,
            profile.row_count,
            profile.column_count,
            options.depth,
            charts.len()
        );

        // Stage 1: statistical narration
        let mut variables = HashMap::new();
        variables.insert("dataset_profile", context.clone());
        let analysis = self
            .run_stage(llm, run, AgentRole::DataAnalyst, library::data_analysis(), &variables)
            .await?;

        // Stage 2: business insights
        let mut variables = HashMap::new();
        variables.insert("dataset_profile", context.clone());
        variables.insert("analysis", analysis.clone());
        variables.insert("observations", bulleted(&observations));
        let insights_text = self
            .run_stage(
                llm,
                run,
                AgentRole::BusinessIntelligence,
                library::business_insights(),
                &variables,
            )
            .await?;
        let insights = parse_bullets(&insights_text);
        if insights.is_empty() {
            warn!("run {}: insight stage produced no list items", run_id);
        }

        // Stage 3: the report
        let mut variables = HashMap::new();
        variables.insert("dataset_profile", context.clone());
        variables.insert("analysis", analysis.clone());
        variables.insert("insights", insights_text.clone());
        variables.insert("recommendations", bulleted(&recommendations));
        variables.insert("depth", options.depth.to_string());
        let report = self
            .run_stage(llm, run, AgentRole::ReportWriter, library::report_writing(), &variables)
            .await?;
        if report.trim().is_empty() {
            return Err(AgentError::EmptyReport);
        }

        // Stage 4: chart captions
        let mut variables = HashMap::new();
        variables.insert("charts", chart_listing(&charts));
        variables.insert("insights", insights_text.clone());
        let captions = self
            .run_stage(llm, run, AgentRole::Visualization, library::visualization(), &variables)
            .await?;

        let duration_seconds =
            (Utc::now() - started_at).num_milliseconds() as f64 / 1000.0;
        info!("run {}: completed in {:.1}s", run_id, duration_seconds);

        Ok(CrewRunResult {
            report,
            insights,
            recommendations,
            charts,
            stage_outputs: vec![
                StageOutput {
                    role: AgentRole::DataAnalyst,
                    output: analysis,
                },
                StageOutput {
                    role: AgentRole::BusinessIntelligence,
                    output: insights_text,
                },
                StageOutput {
                    role: AgentRole::Visualization,
                    output: captions,
                },
            ],
            profile,
            metadata: RunMetadata {
                run_id,
                model: run.model.clone(),
                analysis_depth: options.depth,
                row_count: dataset.row_count(),
                column_count: dataset.column_count(),
                started_at,
                duration_seconds,
            },
        })
    }

    async fn run_stage(
        &self,
        llm: &dyn LlmClient,
        run: &RunConfig,
        role: AgentRole,
        template: PromptTemplate,
        variables: &HashMap<&str, String>,
    ) -> AgentResult<String> {
        let descriptor = self
            .descriptors
            .iter()
            .find(|d| d.role == role)
            .cloned()
            .unwrap_or_else(|| AgentDescriptor::for_role(role));
        let system = format!(
            "You are a {}. Goal: {}. Background: {}. Task: {}\n\n{}",
            descriptor.role.title(),
            descriptor.goal,
            descriptor.backstory,
            descriptor.task,
            template.system,
        );
        let prompt = template.render(variables);

        info!("stage {}: prompt {} v{}", role, template.name, template.version);
        llm.generate(
            run,
            GenerateRequest {
                system,
                prompt,
                temperature: TEMPERATURE,
            },
        )
        .await
    }
}

impl Default for Crew {
    fn default() -> Self {
        Self::new()
    }
}

fn bulleted(lines: &[String]) -> String {
    if lines.is_empty() {
        return "(none)".to_string();
    }
    lines
        .iter()
        .map(|line| format!("- {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn chart_listing(charts: &[ChartSpec]) -> String {
    if charts.is_empty() {
        return "(none)".to_string();
    }
    charts
        .iter()
        .enumerate()
        .map(|(index, chart)| format!("{}. [{}] {}", index + 1, chart.kind, chart.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pull list items out of a model response: `-`, `*`, or `1.` markers.
/// Falls back to non-empty lines when the model ignored the format.
fn parse_bullets(text: &str) -> Vec<String> {
    let items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .or_else(|| {
                    line.split_once(". ").and_then(|(marker, rest)| {
                        marker.parse::<u32>().ok().map(|_| rest)
                    })
                })
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
        })
        .collect();

    if !items.is_empty() {
        return items;
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisDepth, ChartKind};
    use std::sync::Mutex;

    /// Records every call and returns canned stage outputs in order
    struct ScriptedLlm {
        systems: Mutex<Vec<String>>,
        responses: Vec<&'static str>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<&'static str>) -> Self {
            Self {
                systems: Mutex::new(Vec::new()),
                responses,
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(
            &self,
            _run: &RunConfig,
            request: GenerateRequest,
        ) -> AgentResult<String> {
            let mut systems = self.systems.lock().unwrap();
            let index = systems.len();
            systems.push(request.system);
            Ok(self
                .responses
                .get(index)
                .copied()
                .unwrap_or("fallback output")
                .to_string())
        }
    }

    fn run_config() -> RunConfig {
        RunConfig {
            model: "gemini-1.5-flash".to_string(),
            api_key: "test-key".to_string(),
        }
    }

    fn sales_dataset() -> Dataset {
        let csv = "\
product,units,revenue
Widget,1,10.0
Gadget,2,18.5
Widget,3,31.0
";
        Dataset::from_csv("sales.csv", csv).unwrap()
    }

    #[test]
    fn parse_bullets_handles_all_markers() {
        let text = "- first\n* second\n3. third\n";
        assert_eq!(parse_bullets(text), vec!["first", "second", "third"]);
    }

    #[test]
    fn parse_bullets_falls_back_to_lines() {
        let text = "The data is healthy.\n\nRevenue is rising.\n";
        assert_eq!(
            parse_bullets(text),
            vec!["The data is healthy.", "Revenue is rising."]
        );
    }

    #[tokio::test]
    async fn stages_run_in_pipeline_order() {
        let llm = ScriptedLlm::new(vec![
            "the numbers look stable",
            "- revenue grew\n- widgets lead",
            "# Report\n\nAll good.",
            "1. caption one",
        ]);
        let crew = Crew::new();
        let options = AnalysisOptions {
            depth: AnalysisDepth::Detailed,
            chart_kinds: vec![ChartKind::Bar, ChartKind::Line],
        };

        let result = crew
            .run(&llm, &run_config(), &sales_dataset(), &options)
            .await
            .unwrap();

        let systems = llm.systems.lock().unwrap();
        assert_eq!(systems.len(), 4);
        assert!(systems[0].contains("Data Analyst"));
        assert!(systems[1].contains("Business Intelligence Analyst"));
        assert!(systems[2].contains("Report Writer"));
        assert!(systems[3].contains("Visualization Specialist"));

        assert_eq!(result.report, "# Report\n\nAll good.");
        assert_eq!(result.insights, vec!["revenue grew", "widgets lead"]);
        assert_eq!(result.charts.len(), 2);
        assert_eq!(result.metadata.model, "gemini-1.5-flash");
        assert_eq!(result.metadata.row_count, 3);
    }

    #[tokio::test]
    async fn empty_report_is_an_error() {
        let llm = ScriptedLlm::new(vec!["analysis", "- insight", "   \n", "captions"]);
        let crew = Crew::new();
        let result = crew
            .run(
                &llm,
                &run_config(),
                &sales_dataset(),
                &AnalysisOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(AgentError::EmptyReport)));
    }

    #[tokio::test]
    async fn stage_failure_stops_the_pipeline() {
        struct FailingLlm;

        #[async_trait::async_trait]
        impl LlmClient for FailingLlm {
            async fn generate(
                &self,
                _run: &RunConfig,
                _request: GenerateRequest,
            ) -> AgentResult<String> {
                Err(AgentError::Upstream("connection refused".to_string()))
            }
        }

        let crew = Crew::new();
        let result = crew
            .run(
                &FailingLlm,
                &run_config(),
                &sales_dataset(),
                &AnalysisOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(AgentError::Upstream(_))));
    }
}
