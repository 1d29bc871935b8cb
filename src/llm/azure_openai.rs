// Azure OpenAI adapter
// Chat completions against a named deployment:
//   POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}
// Authenticated with the `api-key` header.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LLMConfig;
use crate::llm::provider::LLMAdapter;
use crate::types::{AnalysisError, LLMMessage, LLMRequest, LLMResponse, TokenUsage};

pub struct AzureOpenAIAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

#[derive(Serialize)]
struct AzureChatRequest<'a> {
    messages: &'a [LLMMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct AzureChatResponse {
    choices: Vec<AzureChoice>,
    #[serde(default)]
    usage: Option<AzureUsage>,
}

#[derive(Deserialize)]
struct AzureChoice {
    message: AzureResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct AzureResponseMessage {
    // null when the reply was filtered
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct AzureUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct AzureErrorResponse {
    error: AzureError,
}

#[derive(Deserialize)]
struct AzureError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl AzureOpenAIAdapter {
    pub fn new(config: &LLMConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &LLMConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment
        )
    }
}

#[async_trait]
impl LLMAdapter for AzureOpenAIAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> Result<LLMResponse, AnalysisError> {
        let body = AzureChatRequest {
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request
                .json_response
                .then_some(ResponseFormat { format_type: "json_object" }),
        };

        debug!(deployment = %self.deployment, messages = request.messages.len(), "Calling Azure OpenAI");

        let response = self
            .client
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::LLMApi(format!("Azure OpenAI request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<AzureErrorResponse>(&error_text) {
                return Err(AnalysisError::LLMApi(format!(
                    "Azure OpenAI error ({}): {} (code: {})",
                    status,
                    error_response.error.message,
                    error_response.error.code.unwrap_or_else(|| "unknown".to_string())
                )));
            }

            return Err(AnalysisError::LLMApi(format!(
                "Azure OpenAI error ({}): {}",
                status, error_text
            )));
        }

        let chat: AzureChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::LLMApi(format!("Failed to parse Azure OpenAI response: {}", e)))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::LLMApi("Azure OpenAI returned no choices".to_string()))?;

        let usage = chat
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason.unwrap_or_else(|| "unknown".to_string()),
            usage,
        })
    }
}
