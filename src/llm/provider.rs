use async_trait::async_trait;

use crate::types::{AnalysisError, LLMRequest, LLMResponse};

/// A chat-completion backend.
#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> Result<LLMResponse, AnalysisError>;
}
