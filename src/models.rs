use std::sync::Arc;

use crate::analysis::DocumentAnalyzer;
use crate::config::Config;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: DocumentAnalyzer,
}

impl AppState {
    pub fn new(config: Arc<Config>, analyzer: DocumentAnalyzer) -> Self {
        Self { config, analyzer }
    }
}

// API Request/Response types

/// What the analyze action reports back to the page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzeOutcome {
    Success,
    SelectionError,
    AnalysisError,
}

/// The three read-only output panels.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalyzeResponse {
    pub outcome: AnalyzeOutcome,
    pub summary: String,
    pub key_points: String,
    pub status: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DocumentListResponse {
    pub directory: String,
    pub documents: Vec<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub documents_dir: String,
    pub documents_available: usize,
}
