//! Configuration structs for the runtime components.
//!
//! Values come from code via the `with_*` builders or from the process
//! environment via `from_env`. Nothing here reads files.

use std::time::Duration;

pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const OPENROUTER_MODEL_VAR: &str = "OPENROUTER_MODEL";
pub const OPENROUTER_BASE_URL_VAR: &str = "OPENROUTER_BASE_URL";

pub const DEFAULT_SUMMARY_MODEL: &str = "google/gemini-2.5-flash-lite";
pub const DEFAULT_SUMMARY_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Chat-completions endpoint for an API base such as `https://openrouter.ai/api/v1`.
/// A value that already names the endpoint is kept as is.
pub fn chat_completions_url(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with(CHAT_COMPLETIONS_PATH) {
        base.to_string()
    } else {
        format!("{base}{CHAT_COMPLETIONS_PATH}")
    }
}

/// Settings for the HTTP client shared by all agent calls.
#[derive(Debug, Clone)]
pub struct AgentCallerConfig {
    pub user_agent: String,
    /// When false the caller runs without HTTP capability and every http
    /// agent answers with `config_error`.
    pub http_enabled: bool,
}

impl Default for AgentCallerConfig {
    fn default() -> Self {
        Self {
            user_agent: "agent-supervisor/0.1".to_string(),
            http_enabled: true,
        }
    }
}

impl AgentCallerConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_http_enabled(mut self, enabled: bool) -> Self {
        self.http_enabled = enabled;
        self
    }
}

/// Summarization backend settings. Without an API key the synthesizer runs
/// offline and stitches tool results itself.
#[derive(Clone)]
pub struct SynthesizerConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_SUMMARY_MODEL.to_string(),
            api_url: DEFAULT_SUMMARY_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SynthesizerConfig {
    /// Read `OPENROUTER_API_KEY`, `OPENROUTER_MODEL` and `OPENROUTER_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: non_empty(OPENROUTER_API_KEY_VAR),
            model: non_empty(OPENROUTER_MODEL_VAR).unwrap_or(defaults.model),
            api_url: non_empty(OPENROUTER_BASE_URL_VAR)
                .map(|base| chat_completions_url(&base))
                .unwrap_or(defaults.api_url),
            timeout: defaults.timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for SynthesizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
