// Type definitions and error kinds

use std::fmt;
use std::path::PathBuf;

/// Canonical reference to the document being analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Absolute path on the local filesystem
    Path(PathBuf),
    /// Remote document reachable by the extraction service
    Url(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Path(path) => write!(f, "{}", path.display()),
            Locator::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Text and page count returned by the extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub text: String,
    pub page_count: usize,
}

/// Outcome of a single analysis call.
///
/// `text` always holds the full extracted text, even when only a prefix
/// of it was summarized.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AnalysisResult {
    pub text: String,
    pub page_count: usize,
    pub summary: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask the model to reply with a single JSON object
    pub json_response: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}. Check your environment and .env file.", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Cannot determine the working directory: {0}")]
    WorkingDirectory(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("No document selected: choose a source and a document")]
    NoDocument,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid document name: {0}")]
    InvalidDocumentName(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Document extraction failed: {0}")]
    Extraction(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
