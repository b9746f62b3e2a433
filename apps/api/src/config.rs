use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_PDF_PAGES: usize = 10;
const DEFAULT_MAX_PROMPT_CHARS: usize = 30_000;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Overrides the default model name when set.
    pub llm_model: Option<String>,
    /// Overrides the Messages API endpoint (e.g. a local proxy).
    pub llm_api_url: Option<String>,
    pub llm_max_tokens: u32,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub max_pdf_pages: usize,
    /// Per-document character ceiling applied when filling prompt templates.
    pub max_prompt_chars: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model: optional_env("LLM_MODEL"),
            llm_api_url: optional_env("LLM_API_URL"),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", 4096)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            max_pdf_pages: parse_env("MAX_PDF_PAGES", DEFAULT_MAX_PDF_PAGES)?,
            max_prompt_chars: parse_env("MAX_PROMPT_CHARS", DEFAULT_MAX_PROMPT_CHARS)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Body limit handed to axum for multipart requests: room for a resume and
    /// a job description file at the maximum size plus form overhead.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_mul(2).saturating_add(64 * 1024)
    }
}

#[cfg(test)]
impl Config {
    /// Configuration with defaults and a dummy credential, for tests.
    pub fn for_tests() -> Self {
        Config {
            anthropic_api_key: "test-key".to_string(),
            llm_model: None,
            llm_api_url: None,
            llm_max_tokens: 1024,
            llm_timeout_secs: 5,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_pdf_pages: DEFAULT_MAX_PDF_PAGES,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
