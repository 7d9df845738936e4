//! Hosted Embeddings
//!
//! Client for OpenAI-compatible `/embeddings` endpoints. Every call is bounded
//! by a request timeout; an expired timeout is reported like any other
//! network failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::provider::{EmbeddingError, EmbeddingProvider};
use super::vector::{truncate_text, Embedding};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// Vector length produced by the default model
pub const DEFAULT_DIMENSIONS: usize = 1536;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the hosted embedding client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Expected vector length; `None` accepts whatever the provider returns
    pub dimensions: Option<usize>,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: Some(DEFAULT_DIMENSIONS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding provider backed by an OpenAI-compatible HTTP API
#[derive(Clone)]
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiEmbeddings {
    /// Build the client; fails only if the TLS backend cannot initialise
    pub fn new(config: OpenAiConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(config.timeout))
            .build()
            .map_err(|e| EmbeddingError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn build_headers(&self) -> Result<HeaderMap, EmbeddingError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(|_| EmbeddingError::InvalidInput("API key contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }

    fn parse_response(&self, body: EmbeddingResponse) -> Result<Embedding, EmbeddingError> {
        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::MalformedResponse("no embedding in response".to_string()))?;

        if vector.is_empty() {
            return Err(EmbeddingError::MalformedResponse("empty embedding vector".to_string()));
        }
        if let Some(expected) = self.config.dimensions {
            if vector.len() != expected {
                return Err(EmbeddingError::MalformedResponse(format!(
                    "expected {} dimensions, got {}",
                    expected,
                    vector.len()
                )));
            }
        }
        Ok(Embedding::new(vector))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if self.config.api_key.is_empty() {
            return Err(EmbeddingError::NotConfigured);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput("Text cannot be empty".to_string()));
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: truncate_text(text),
        };

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.build_headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Network(format!("request timed out after {:?}", self.config.timeout))
                } else {
                    EmbeddingError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api { status, message });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;

        self.parse_response(body)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
