// Azure AI Document Intelligence (Form Recognizer) adapter
// Analysis is a long-running operation:
//   1. POST {endpoint}/formrecognizer/documentModels/{model}:analyze?api-version={version}
//      -> 202 Accepted with an `Operation-Location` header
//   2. GET the operation location until status is `succeeded` or `failed`
// Authenticated with the `Ocp-Apim-Subscription-Key` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ExtractionConfig;
use crate::extraction::provider::DocumentExtractor;
use crate::types::{AnalysisError, ExtractedDocument, Locator};

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "operation-location";

pub struct AzureDocumentAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
    model_id: String,
    api_version: String,
    poll_interval: Duration,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: OperationStatus,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct AnalyzeResult {
    #[serde(default)]
    content: String,
    #[serde(default)]
    pages: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ServiceError,
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl ServiceError {
    fn describe(&self) -> String {
        match &self.code {
            Some(code) => format!("{} (code: {})", self.message, code),
            None => self.message.clone(),
        }
    }
}

impl AzureDocumentAdapter {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ExtractionConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            api_version: config.api_version.clone(),
            poll_interval: config.poll_interval,
        }
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/{}:analyze",
            self.endpoint, self.model_id
        )
    }

    async fn submit(&self, locator: &Locator) -> Result<String, AnalysisError> {
        let request = self
            .client
            .post(self.analyze_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header(KEY_HEADER, &self.api_key);

        let request = match locator {
            Locator::Url(url) => request.json(&serde_json::json!({ "urlSource": url })),
            Locator::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                let mime = mime_guess::from_path(path).first_or_octet_stream();
                request
                    .header(CONTENT_TYPE, mime.essence_str())
                    .body(bytes)
            }
        };

        let response = send(request).await?;

        response
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                AnalysisError::Extraction("response did not include an Operation-Location header".to_string())
            })
    }

    async fn poll(&self, operation_url: &str) -> Result<AnalyzeResult, AnalysisError> {
        loop {
            let response = send(self.client.get(operation_url).header(KEY_HEADER, &self.api_key)).await?;

            let operation: AnalyzeOperation = response.json().await.map_err(|e| {
                AnalysisError::Extraction(format!("Failed to parse analyze operation: {}", e))
            })?;

            match operation.status {
                OperationStatus::Succeeded => {
                    return operation.analyze_result.ok_or_else(|| {
                        AnalysisError::Extraction("operation succeeded without an analyzeResult".to_string())
                    });
                }
                OperationStatus::NotStarted | OperationStatus::Running => {
                    debug!(status = ?operation.status, "Waiting for document analysis");
                    tokio::time::sleep(self.poll_interval).await;
                }
                status => {
                    let detail = operation
                        .error
                        .map(|e| e.describe())
                        .unwrap_or_else(|| format!("operation ended with status {:?}", status));
                    return Err(AnalysisError::Extraction(detail));
                }
            }
        }
    }
}

async fn send(request: RequestBuilder) -> Result<Response, AnalysisError> {
    let response = request
        .send()
        .await
        .map_err(|e| AnalysisError::Extraction(format!("request failed: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorEnvelope>(&error_text)
        .map(|envelope| envelope.error.describe())
        .unwrap_or(error_text);

    Err(AnalysisError::Extraction(format!("service error ({}): {}", status, detail)))
}

#[async_trait]
impl DocumentExtractor for AzureDocumentAdapter {
    async fn extract(&self, locator: &Locator) -> Result<ExtractedDocument, AnalysisError> {
        info!(locator = %locator, model = %self.model_id, "Submitting document for extraction");

        let operation_url = self.submit(locator).await?;
        let result = self.poll(&operation_url).await?;

        info!(
            pages = result.pages.len(),
            chars = result.content.chars().count(),
            "Document extraction finished"
        );

        Ok(ExtractedDocument {
            text: result.content,
            page_count: result.pages.len(),
        })
    }
}
