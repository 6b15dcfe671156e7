use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Port the HTTP server listens on
    pub port: u16,
    /// Directory holding the agent profile documents
    pub corpus_dir: PathBuf,
    /// Maximum characters per chunk handed to the embedder
    pub chunk_size: usize,
    /// Characters of trailing context repeated at the start of the next chunk
    pub chunk_overlap: usize,
    /// Number of ranked chunks requested from the similarity index
    pub top_k: usize,
    /// Chat model used for question answering
    pub model: String,
    /// OpenAI-compatible API base URL
    pub completion_base_url: String,
    pub temperature: f32,
    pub request_timeout: Duration,
    /// Log file mirrored from stderr; `None` disables it
    pub log_file: Option<PathBuf>,
    /// Where fastembed keeps downloaded model files
    pub embedding_cache_dir: Option<PathBuf>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            corpus_dir: PathBuf::from("agents"),
            chunk_size: 1000,
            chunk_overlap: 20,
            top_k: 4,
            model: "gpt-3.5-turbo".to_string(),
            completion_base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            request_timeout: Duration::from_secs(60),
            log_file: Some(PathBuf::from("logfile.log")),
            embedding_cache_dir: None,
        }
    }
}

impl SelectorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            port: env_parse("SELECTOR_PORT", defaults.port)?,
            corpus_dir: env_path("SELECTOR_CORPUS_DIR").unwrap_or(defaults.corpus_dir),
            chunk_size: env_parse("SELECTOR_CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: env_parse("SELECTOR_CHUNK_OVERLAP", defaults.chunk_overlap)?,
            top_k: env_parse("SELECTOR_TOP_K", defaults.top_k)?,
            model: env_str("SELECTOR_MODEL", &defaults.model),
            completion_base_url: env_str(
                "SELECTOR_COMPLETION_BASE_URL",
                &defaults.completion_base_url,
            ),
            temperature: env_parse("SELECTOR_TEMPERATURE", defaults.temperature)?,
            request_timeout: Duration::from_secs(env_parse(
                "SELECTOR_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            log_file: match std::env::var("SELECTOR_LOG_FILE") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(PathBuf::from(v)),
                Err(_) => defaults.log_file,
            },
            embedding_cache_dir: env_path("SELECTOR_EMBEDDING_CACHE_DIR"),
        };

        if config.chunk_overlap > config.chunk_size {
            anyhow::bail!(
                "SELECTOR_CHUNK_OVERLAP ({}) must not exceed SELECTOR_CHUNK_SIZE ({})",
                config.chunk_overlap,
                config.chunk_size
            );
        }
        Ok(config)
    }
}

/// Load `.env` from the working directory or the nearest ancestor that has one.
///
/// Returns the file that was loaded, if any. Runs before logging is set up, so
/// a malformed file is returned as an error for the caller to report.
pub fn load_env_file() -> anyhow::Result<Option<PathBuf>> {
    let cwd = std::env::current_dir()?;
    load_env_file_from(&cwd)
}

fn load_env_file_from(start: &Path) -> anyhow::Result<Option<PathBuf>> {
    for dir in start.ancestors() {
        let candidate = dir.join(".env");
        if candidate.exists() {
            dotenvy::from_path(&candidate)
                .with_context(|| format!("failed to load {}", candidate.display()))?;
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}
