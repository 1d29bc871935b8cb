//! The analyze action
//!
//! Accepts the form as `multipart/form-data` with the fields `mode`, `file`,
//! `url` and `repo_doc`, and always answers with the three output panels.
//! Failures are reported in the status panel rather than as HTTP errors.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{error, info, warn};

use crate::models::{AnalyzeOutcome, AnalyzeResponse, AppState};
use crate::source::{self, AnalysisRequest, SourceMode, UploadedFile};
use crate::types::{AnalysisResult, AppError, AppResult};

pub const NO_KEY_POINTS: &str = "No key points found";

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Json<AnalyzeResponse> {
    let response = match read_form(multipart).await {
        Ok(request) => process_document(&state, request).await,
        Err(e) => {
            warn!(error = %e, "Could not read analyze form");
            AnalyzeResponse {
                outcome: AnalyzeOutcome::AnalysisError,
                summary: String::new(),
                key_points: String::new(),
                status: format!("Error: could not read the submitted form ({})", e),
            }
        }
    };

    Json(response)
}

/// Resolve the selected source, analyze it and format the three panels.
pub async fn process_document(state: &AppState, request: AnalysisRequest) -> AnalyzeResponse {
    match run_analysis(state, request).await {
        Ok((label, result)) => AnalyzeResponse {
            outcome: AnalyzeOutcome::Success,
            key_points: format_key_points(&result.key_points),
            status: format_status(&label, &result),
            summary: result.summary,
        },
        Err(AppError::Selection(e)) => {
            info!(reason = %e, "No usable document selected");
            AnalyzeResponse {
                outcome: AnalyzeOutcome::SelectionError,
                summary: String::new(),
                key_points: String::new(),
                status: format!("Error: {}", e),
            }
        }
        Err(e) => {
            error!(error = %e, "Document analysis failed");
            AnalyzeResponse {
                outcome: AnalyzeOutcome::AnalysisError,
                summary: String::new(),
                key_points: String::new(),
                status: format!("Processing error: {}", e),
            }
        }
    }
}

async fn run_analysis(state: &AppState, request: AnalysisRequest) -> AppResult<(String, AnalysisResult)> {
    let source = request.into_source()?;
    let resolved = source::resolve(source, &state.config)?;

    info!(source = %resolved.label, "Analyzing document");
    let result = state.analyzer.analyze(&resolved.locator).await?;

    Ok((resolved.label, result))
}

pub fn format_key_points(key_points: &[String]) -> String {
    if key_points.is_empty() {
        return NO_KEY_POINTS.to_string();
    }
    key_points
        .iter()
        .map(|point| format!("• {}", point))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_status(label: &str, result: &AnalysisResult) -> String {
    format!(
        "Analysis complete!\nSource: {}\nPages: {}\nCharacters in original: {}\nCharacters in summary: {}",
        label,
        result.page_count,
        result.text.chars().count(),
        result.summary.chars().count()
    )
}

async fn read_form(mut multipart: Multipart) -> Result<AnalysisRequest, FormError> {
    let mut request = AnalysisRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "mode" => request.mode = SourceMode::parse(&field.text().await?),
            "url" => request.url = Some(field.text().await?),
            "repo_doc" => request.repo_doc = Some(field.text().await?),
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // browsers send an empty part when no file was picked
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                request.upload = Some(spool_upload(filename, &bytes).await?);
            }
            other => warn!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(request)
}

/// Write an uploaded file to a temp file that keeps the original extension.
async fn spool_upload(filename: String, bytes: &[u8]) -> Result<UploadedFile, FormError> {
    let suffix = std::path::Path::new(&filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile()?;
    tokio::fs::write(file.path(), bytes).await?;

    let filename = std::path::Path::new(&filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(filename);

    Ok(UploadedFile { filename, file })
}

#[derive(Debug, thiserror::Error)]
enum FormError {
    #[error("{0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("could not store upload: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DocumentAnalyzer;
    use crate::config::Config;
    use crate::extraction::DocumentExtractor;
    use crate::llm::LLMAdapter;
    use crate::types::{AnalysisError, ExtractedDocument, LLMRequest, LLMResponse, Locator, TokenUsage};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Calls {
        extract: AtomicUsize,
        complete: AtomicUsize,
    }

    struct FakeExtractor {
        calls: Arc<Calls>,
        fail: bool,
        text: String,
    }

    #[async_trait]
    impl DocumentExtractor for FakeExtractor {
        async fn extract(&self, _locator: &Locator) -> Result<ExtractedDocument, AnalysisError> {
            self.calls.extract.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AnalysisError::Extraction("request failed: connection reset".to_string()));
            }
            Ok(ExtractedDocument {
                text: self.text.clone(),
                page_count: 4,
            })
        }
    }

    struct FakeLLM {
        calls: Arc<Calls>,
        fail: bool,
        reply: String,
    }

    #[async_trait]
    impl LLMAdapter for FakeLLM {
        async fn create_chat_completion(&self, _request: &LLMRequest) -> Result<LLMResponse, AnalysisError> {
            self.calls.complete.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AnalysisError::LLMApi(
                    "Azure OpenAI error (401 Unauthorized): Access denied due to invalid subscription key".to_string(),
                ));
            }
            Ok(LLMResponse {
                content: self.reply.clone(),
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            })
        }
    }

    fn state(fail_extraction: bool, text: &str, reply: &str) -> (AppState, Arc<Calls>) {
        state_with_llm(fail_extraction, false, text, reply)
    }

    fn state_with_llm(fail_extraction: bool, fail_llm: bool, text: &str, reply: &str) -> (AppState, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let config = Config::from_lookup(|_| None, Path::new("/srv/insight")).unwrap();
        let analyzer = DocumentAnalyzer::new(
            Arc::new(FakeExtractor {
                calls: calls.clone(),
                fail: fail_extraction,
                text: text.to_string(),
            }),
            Arc::new(FakeLLM {
                calls: calls.clone(),
                fail: fail_llm,
                reply: reply.to_string(),
            }),
            10,
        );
        (AppState::new(Arc::new(config), analyzer), calls)
    }

    fn url_request() -> AnalysisRequest {
        AnalysisRequest {
            mode: Some(SourceMode::Url),
            url: Some("https://example.com/report.pdf".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_key_points() {
        let points = vec!["A".to_string(), "B".to_string()];
        assert_eq!(format_key_points(&points), "• A\n• B");
        assert_eq!(format_key_points(&[]), NO_KEY_POINTS);
        assert!(!NO_KEY_POINTS.is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_file_is_selection_error() {
        let (state, calls) = state(false, "text", "{}");
        let request = AnalysisRequest {
            mode: Some(SourceMode::Upload),
            ..Default::default()
        };

        let response = process_document(&state, request).await;

        assert_eq!(response.outcome, AnalyzeOutcome::SelectionError);
        assert!(response.summary.is_empty());
        assert!(response.key_points.is_empty());
        assert!(response.status.contains("No document selected"));
        assert_eq!(calls.extract.load(Ordering::SeqCst), 0);
        assert_eq!(calls.complete.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_status_reports_full_length() {
        let text = "x".repeat(25);
        let (state, _calls) = state(
            false,
            &text,
            r#"{"summary": "Brief", "key_points": ["A", "B"]}"#,
        );

        let response = process_document(&state, url_request()).await;

        assert_eq!(response.outcome, AnalyzeOutcome::Success);
        assert_eq!(response.summary, "Brief");
        assert_eq!(response.key_points, "• A\n• B");
        assert!(response.status.contains("Source: URL: https://example.com/report.pdf"));
        assert!(response.status.contains("Pages: 4"));
        assert!(response.status.contains("Characters in original: 25"));
        assert!(response.status.contains("Characters in summary: 5"));
    }

    #[tokio::test]
    async fn test_empty_key_points_use_placeholder() {
        let (state, _calls) = state(false, "text", r#"{"summary": "Brief"}"#);
        let response = process_document(&state, url_request()).await;
        assert_eq!(response.key_points, NO_KEY_POINTS);
    }

    #[tokio::test]
    async fn test_extraction_error_leaves_panels_empty() {
        let (state, calls) = state(true, "", "{}");

        let response = process_document(&state, url_request()).await;

        assert_eq!(response.outcome, AnalyzeOutcome::AnalysisError);
        assert!(response.summary.is_empty());
        assert!(response.key_points.is_empty());
        assert!(response.status.contains("connection reset"));
        assert_eq!(calls.extract.load(Ordering::SeqCst), 1);
        assert_eq!(calls.complete.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_llm_error_leaves_panels_empty() {
        let (state, calls) = state_with_llm(false, true, "Extracted text", "{}");

        let response = process_document(&state, url_request()).await;

        assert_eq!(response.outcome, AnalyzeOutcome::AnalysisError);
        assert!(response.summary.is_empty());
        assert!(response.key_points.is_empty());
        assert!(response.status.contains("401 Unauthorized"));
        assert_eq!(calls.extract.load(Ordering::SeqCst), 1);
        assert_eq!(calls.complete.load(Ordering::SeqCst), 1);
    }
}
