use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::types::ConfigError;

pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_LLM_API_VERSION: &str = "2024-02-15-preview";
pub const DEFAULT_EXTRACTION_MODEL: &str = "prebuilt-read";
pub const DEFAULT_EXTRACTION_API_VERSION: &str = "2023-07-31";
pub const DEFAULT_DOCS_DIR: &str = "data/test_docs";
pub const DEFAULT_MAX_CHARS_FOR_SUMMARY: usize = 15_000;

pub const EXTRACTION_ENDPOINT_VAR: &str = "AZURE_FORM_RECOGNIZER_ENDPOINT";
pub const EXTRACTION_KEY_VAR: &str = "AZURE_FORM_RECOGNIZER_KEY";
pub const LLM_ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const LLM_KEY_VAR: &str = "AZURE_OPENAI_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub extraction: ExtractionConfig,
    pub llm: LLMConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

/// Azure AI Document Intelligence (Form Recognizer) settings
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model_id: String,
    pub api_version: String,
    pub poll_interval: Duration,
}

/// Azure OpenAI settings
#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub max_chars_for_summary: usize,
    /// Absolute path of the local test documents folder
    pub documents_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// The project root is the working directory at startup: `.env` is read
    /// from it and a relative `REPO_DOCS_DIR` is resolved against it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let root = project_root()?;
        dotenvy::from_path(root.join(".env")).ok();

        Self::from_lookup(|key| env::var(key).ok(), &root)
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F, project_root: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let docs_dir = var("REPO_DOCS_DIR", DEFAULT_DOCS_DIR);

        Ok(Self {
            server: ServerConfig {
                host: var("HOST", "127.0.0.1"),
                port: parse_var(&lookup, "PORT", 7860)?,
                max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            },
            extraction: ExtractionConfig {
                endpoint: var(EXTRACTION_ENDPOINT_VAR, ""),
                api_key: var(EXTRACTION_KEY_VAR, ""),
                model_id: var("AZURE_FORM_RECOGNIZER_MODEL", DEFAULT_EXTRACTION_MODEL),
                api_version: var("AZURE_FORM_RECOGNIZER_API_VERSION", DEFAULT_EXTRACTION_API_VERSION),
                poll_interval: Duration::from_millis(parse_var(
                    &lookup,
                    "AZURE_FORM_RECOGNIZER_POLL_MS",
                    1000,
                )?),
            },
            llm: LLMConfig {
                endpoint: var(LLM_ENDPOINT_VAR, ""),
                api_key: var(LLM_KEY_VAR, ""),
                deployment: var("AZURE_OPENAI_DEPLOYMENT", DEFAULT_DEPLOYMENT),
                api_version: var("AZURE_OPENAI_API_VERSION", DEFAULT_LLM_API_VERSION),
            },
            analysis: AnalysisConfig {
                max_chars_for_summary: parse_var(
                    &lookup,
                    "MAX_CHARS_FOR_SUMMARY",
                    DEFAULT_MAX_CHARS_FOR_SUMMARY,
                )?,
                documents_dir: project_root.join(docs_dir),
            },
        })
    }

    /// Verify that every endpoint and key needed for analysis is present.
    ///
    /// All missing variables are reported at once, in a fixed order.
    pub fn check(&self) -> Result<(), ConfigError> {
        let required = [
            (EXTRACTION_ENDPOINT_VAR, &self.extraction.endpoint),
            (EXTRACTION_KEY_VAR, &self.extraction.api_key),
            (LLM_ENDPOINT_VAR, &self.llm.endpoint),
            (LLM_KEY_VAR, &self.llm.api_key),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }
}

/// Directory the service was started from.
pub fn project_root() -> Result<PathBuf, ConfigError> {
    env::current_dir().map_err(|e| ConfigError::WorkingDirectory(e.to_string()))
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
