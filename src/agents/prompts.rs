// Prompt templates for LLM interactions
//
// One template per pipeline stage. Prompts are versioned for
// reproducibility; variables use {{name}} placeholders.

use std::collections::HashMap;

/// Prompt template structure
pub struct PromptTemplate {
    pub name: &'static str,
    pub version: &'static str,
    /// Stage-specific response guidance, appended to the agent's persona
    pub system: &'static str,
    pub user_template: &'static str,
}

impl PromptTemplate {
    /// Render the user template, replacing every `{{key}}` with its value
    pub fn render(&self, variables: &HashMap<&str, String>) -> String {
        let mut rendered = self.user_template.to_string();
        for (key, value) in variables {
            rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
        }
        rendered
    }
}

pub mod library {
    use super::PromptTemplate;

    pub fn data_analysis() -> PromptTemplate {
        PromptTemplate {
            name: "data_analysis",
            version: "1.0.0",
            system: "Work only from the statistics you are given; do not invent numbers. \
                     Respond in plain prose.",
            user_template: "Here is the statistical profile of an uploaded business dataset:\n\n\
                            {{dataset_profile}}\n\
                            Describe what the numbers show: ranges, central tendencies, \
                            outliers, and anything unusual about data quality.",
        }
    }

    pub fn business_insights() -> PromptTemplate {
        PromptTemplate {
            name: "business_insights",
            version: "1.0.0",
            system: "Respond with a bulleted list, one insight per line, each starting \
                     with '- '. Keep each insight to one or two sentences.",
            user_template: "Dataset profile:\n\n{{dataset_profile}}\n\
                            Analyst's reading of the data:\n\n{{analysis}}\n\n\
                            Automated observations:\n{{observations}}\n\n\
                            Derive the business insights a decision-maker should act on.",
        }
    }

    pub fn report_writing() -> PromptTemplate {
        PromptTemplate {
            name: "report_writing",
            version: "1.0.0",
            system: "Write GitHub-flavored markdown with an Executive Summary, Dataset \
                     Overview, Key Findings, and Strategic Recommendations section. \
                     Do not fabricate figures that are not in the material.",
            user_template: "Compile the final business-intelligence report at {{depth}} depth.\n\n\
                            Dataset profile:\n\n{{dataset_profile}}\n\
                            Statistical analysis:\n\n{{analysis}}\n\n\
                            Business insights:\n\n{{insights}}\n\n\
                            Candidate recommendations:\n{{recommendations}}",
        }
    }

    pub fn visualization() -> PromptTemplate {
        PromptTemplate {
            name: "visualization",
            version: "1.0.0",
            system: "Respond with a numbered list matching the chart order, one caption \
                     per chart. If no charts were prepared, say so in one sentence.",
            user_template: "The dashboard prepared these charts:\n{{charts}}\n\n\
                            Key insights for context:\n\n{{insights}}\n\n\
                            Write a one-sentence caption for each chart explaining what a \
                            business reader should take from it.",
        }
    }
}
