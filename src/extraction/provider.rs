use async_trait::async_trait;

use crate::types::{AnalysisError, ExtractedDocument, Locator};

/// A service that turns a PDF/DOCX into plain text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, locator: &Locator) -> Result<ExtractedDocument, AnalysisError>;
}
