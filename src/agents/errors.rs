use thiserror::Error;

/// Errors that can occur while running the analysis crew
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(
        "no Gemini API key configured; enter one in the dashboard sidebar or set GEMINI_API_KEY"
    )]
    MissingCredential,

    #[error("upstream model call failed: {0}")]
    Upstream(String),

    #[error("model returned an empty report")]
    EmptyReport,
}

pub type AgentResult<T> = Result<T, AgentError>;
