use booth_genai::api::DEFAULT_API_URL;

/// Model used when `GENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Key sent to the Gemini API.
    pub api_key: String,
    /// Base URL of the Gemini API.
    pub api_url: String,
    /// Default model identifier for submitted jobs.
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var          | Default                                     |
    /// |------------------|---------------------------------------------|
    /// | `GEMINI_API_KEY` | (required)                                  |
    /// | `GENAI_API_URL`  | `https://generativelanguage.googleapis.com` |
    /// | `GENAI_MODEL`    | `gemini-2.5-flash-image-preview`            |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;
        let api_url = non_empty("GENAI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let model = non_empty("GENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());

        Ok(Self {
            api_key,
            api_url,
            model,
        })
    }
}
