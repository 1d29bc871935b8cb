//! Document analysis
//!
//! Runs the two service calls for one document: text extraction, then
//! summarization of (a prefix of) that text. Nothing is cached and nothing is
//! retried; the first failure ends the analysis.

pub mod summary;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::extraction::DocumentExtractor;
use crate::llm::LLMAdapter;
use crate::types::{AnalysisError, AnalysisResult, LLMMessage, LLMRequest, Locator};

pub use summary::{build_prompt, parse_summary_response, truncate_chars, SummaryParts};

const SUMMARY_MAX_TOKENS: u32 = 1500;
const SUMMARY_TEMPERATURE: f32 = 0.3;

#[derive(Clone)]
pub struct DocumentAnalyzer {
    extractor: Arc<dyn DocumentExtractor>,
    llm: Arc<dyn LLMAdapter>,
    max_chars_for_summary: usize,
}

impl DocumentAnalyzer {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        llm: Arc<dyn LLMAdapter>,
        max_chars_for_summary: usize,
    ) -> Self {
        Self {
            extractor,
            llm,
            max_chars_for_summary,
        }
    }

    pub async fn analyze(&self, locator: &Locator) -> Result<AnalysisResult, AnalysisError> {
        info!(locator = %locator, "Starting document analysis");

        let document = self.extractor.extract(locator).await?;

        let excerpt = truncate_chars(&document.text, self.max_chars_for_summary);
        if excerpt.len() < document.text.len() {
            debug!(
                limit = self.max_chars_for_summary,
                "Extracted text truncated before summarization"
            );
        }

        let request = LLMRequest {
            messages: vec![
                LLMMessage::system(summary::SYSTEM_INSTRUCTION),
                LLMMessage::user(build_prompt(excerpt)),
            ],
            max_tokens: Some(SUMMARY_MAX_TOKENS),
            temperature: Some(SUMMARY_TEMPERATURE),
            json_response: true,
        };

        let response = self.llm.create_chat_completion(&request).await?;
        debug!(
            finish_reason = %response.finish_reason,
            total_tokens = response.usage.total_tokens,
            "Summary received"
        );

        let SummaryParts { summary, key_points } = parse_summary_response(&response.content);

        if summary.is_empty() {
            warn!(locator = %locator, "Model reply contained no summary");
        }
        if key_points.is_empty() {
            warn!(locator = %locator, "Model reply contained no key points");
        }

        info!(
            pages = document.page_count,
            summary_chars = summary.chars().count(),
            key_points = key_points.len(),
            "Document analysis finished"
        );

        Ok(AnalysisResult {
            text: document.text,
            page_count: document.page_count,
            summary,
            key_points,
        })
    }
}
