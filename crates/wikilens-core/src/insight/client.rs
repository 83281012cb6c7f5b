//! Gemini generative-AI client
//!
//! Provides the three insight operations over `generateContent`:
//! - Corpus analysis with a JSON response schema
//! - Web-grounded single-entity insight
//! - Pairwise comparison with a JSON response schema

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::InsightConfig;
use crate::domain::{ComparisonResult, Entity, EntityInsight, VectorAnalysis};
use crate::error::{Error, Result};

use super::InsightService;
use super::prompts;
use super::types::{
    GenerateContentRequest, GenerateContentResponse, comparison_schema, vector_analysis_schema,
};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini insight client
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    config: InsightConfig,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.config.base_url)
            .field("analysis_model", &self.config.analysis_model)
            .field("insight_model", &self.config.insight_model)
            .field("comparison_model", &self.config.comparison_model)
            .finish()
    }
}

/// Builder for creating a GeminiClient
#[derive(Default)]
pub struct GeminiClientBuilder {
    config: Option<InsightConfig>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl GeminiClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the insight configuration
    pub fn config(mut self, config: InsightConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the GeminiClient
    pub fn build(self) -> Result<GeminiClient> {
        let mut config = self.config.unwrap_or_default();
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::ApiKeyMissing)?;

        if let Some(url) = self.base_url {
            config.base_url = url;
        }

        let timeout_secs = self.timeout_secs.unwrap_or(config.timeout_secs);
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(GeminiClient {
            http_client,
            config,
            api_key,
        })
    }
}

impl GeminiClient {
    /// Create a new client with the given configuration and API key
    pub fn new(config: InsightConfig, api_key: impl Into<String>) -> Result<Self> {
        GeminiClientBuilder::new()
            .config(config)
            .api_key(api_key)
            .build()
    }

    /// Create a client whose key comes from `GEMINI_API_KEY` or `API_KEY`
    pub fn from_env(config: InsightConfig) -> Result<Self> {
        let api_key = config
            .resolved_api_key()
            .map_err(|e| Error::ConfigError(e.to_string()))?
            .ok_or(Error::ApiKeyMissing)?;
        Self::new(config, api_key)
    }

    /// Create a new builder for GeminiClient
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Model used for corpus analysis
    pub fn analysis_model(&self) -> &str {
        &self.config.analysis_model
    }

    /// Model used for grounded insight
    pub fn insight_model(&self) -> &str {
        &self.config.insight_model
    }

    /// Model used for comparison
    pub fn comparison_model(&self) -> &str {
        &self.config.comparison_model
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Send a single `generateContent` request
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        debug!(
            model = %model,
            structured = request.generation_config.is_some(),
            grounded = !request.tools.is_empty(),
            "Sending generateContent request"
        );

        let response = self
            .http_client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return self.handle_error_response(status, response).await;
        }

        response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse response: {}", e)))
    }

    /// Send a structured request and decode the JSON answer into `T`
    async fn generate_structured<T: DeserializeOwned>(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<T> {
        let response = self.generate(model, request).await?;
        let text = response
            .text()
            .ok_or_else(|| Error::MalformedResponse("Empty response from model".to_string()))?;
        parse_structured(&text)
    }

    /// Handle error responses from the API
    async fn handle_error_response<T>(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> Result<T> {
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "generateContent request failed");

        match status.as_u16() {
            400 => Err(Error::ServiceUnavailable(format!("Bad request: {}", body))),
            401 | 403 => Err(Error::ServiceUnavailable(
                "Unauthorized: check the GEMINI_API_KEY environment variable".to_string(),
            )),
            404 => Err(Error::ServiceUnavailable(format!(
                "Model not found or endpoint unavailable: {}",
                body
            ))),
            429 => Err(Error::ServiceUnavailable(
                "Rate limited by the generative AI service".to_string(),
            )),
            500..=599 => Err(Error::ServiceUnavailable(format!(
                "Server error ({}): {}",
                status, body
            ))),
            _ => Err(Error::ServiceUnavailable(format!(
                "HTTP error {}: {}",
                status, body
            ))),
        }
    }
}

#[async_trait]
impl InsightService for GeminiClient {
    async fn analyze_corpus(&self, query: &str, entities: &[Entity]) -> Result<VectorAnalysis> {
        let prompt = prompts::corpus_analysis(query, entities)?;
        let request =
            GenerateContentRequest::prompt(prompt).with_json_schema(vector_analysis_schema());

        let analysis: VectorAnalysis = self
            .generate_structured(&self.config.analysis_model, &request)
            .await?;

        info!(
            query = %query,
            entities = entities.len(),
            clusters = analysis.semantic_clusters.len(),
            "Corpus analysis completed"
        );
        Ok(analysis)
    }

    async fn get_insight(&self, entity: &Entity) -> Result<EntityInsight> {
        let request =
            GenerateContentRequest::prompt(prompts::entity_insight(entity)).with_web_grounding();

        let response = self.generate(&self.config.insight_model, &request).await?;
        let text = response
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::MalformedResponse("Empty insight text".to_string()))?;
        let grounding = response.grounding_chunks();

        info!(
            entity = %entity.id,
            sources = grounding.len(),
            "Entity insight completed"
        );
        Ok(EntityInsight::new(text, grounding))
    }

    async fn compare_entities(&self, a: &Entity, b: &Entity) -> Result<ComparisonResult> {
        let request = GenerateContentRequest::prompt(prompts::comparison(a, b))
            .with_json_schema(comparison_schema());

        let result: ComparisonResult = self
            .generate_structured(&self.config.comparison_model, &request)
            .await?;

        info!(a = %a.id, b = %b.id, "Entity comparison completed");
        Ok(result)
    }
}

/// Decode a structured answer, tolerating a surrounding markdown code fence
fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|e| {
        Error::MalformedResponse(format!("Structured output did not match schema: {}", e))
    })
}
