//! Environment configuration.
//!
//! Configuration is read once at startup into an [`AppConfig`] value that is
//! passed explicitly to the components that need it. Per-run overrides from
//! the dashboard are applied through [`RunConfig::resolve`].

use crate::agents::errors::{AgentError, AgentResult};

/// Model used when `MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Port the dashboard binds to when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8501;

/// Upload ceiling in megabytes when `MAX_UPLOAD_MB` is not set.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 200;

/// Process-wide configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini model identifier.
    pub model: String,
    /// API key from the environment, if any. A run can still be triggered
    /// without it by supplying a key from the dashboard sidebar.
    pub gemini_api_key: Option<String>,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// Call `dotenv::dotenv()` before this so a local `.env` file is honored.
    pub fn from_env() -> Self {
        let model = std::env::var("MODEL").unwrap_or_else(|_| {
            tracing::warn!("MODEL not set, using default {}", DEFAULT_MODEL);
            DEFAULT_MODEL.to_string()
        });

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let max_upload_mb: usize = std::env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Self {
            model,
            gemini_api_key,
            port,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            gemini_api_key: None,
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

/// Per-run configuration after applying dashboard overrides.
///
/// A dashboard-supplied model or API key takes precedence over the
/// environment value. Resolution fails with
/// [`AgentError::MissingCredential`] when no API key exists in either
/// source, before any network call is attempted.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub model: String,
    pub api_key: String,
}

impl RunConfig {
    /// Resolve the effective model and credential for one run.
    pub fn resolve(
        config: &AppConfig,
        model_override: Option<&str>,
        key_override: Option<&str>,
    ) -> AgentResult<Self> {
        let model = model_override
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| config.model.clone());

        let api_key = key_override
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| config.gemini_api_key.clone())
            .ok_or(AgentError::MissingCredential)?;

        Ok(Self { model, api_key })
    }
}
