//! LLM Client: the single point of entry for all model calls.
//!
//! ARCHITECTURAL RULE: No other module may call a model provider directly.
//! Every agent and generator goes through `LlmClient::invoke`, which applies
//! the request timeout and validates the raw output against the declared
//! schema before anything downstream sees it.
//!
//! Single attempt per call. Retries are an agent-level decision and the
//! agents make none.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{self, ObjectSchema, SchemaViolation, StructuredOutput};

pub mod anthropic;
pub mod prompts;

/// The model used for all LLM calls unless a caller overrides it.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 8192;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM returned no structured content")]
    EmptyContent,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

/// Per-call model parameters. Each agent picks its own temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelParams {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Binary input for vision/document mode.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub media_type: String,
    pub data: Bytes,
}

/// Everything a provider needs for one structured call.
#[derive(Debug)]
pub struct GenerationRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub schema: &'a ObjectSchema,
    pub params: &'a ModelParams,
    pub attachments: &'a [Attachment],
}

/// A hosted model endpoint. Returns the raw structured value; validation
/// happens in `LlmClient`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Value, GenerationError>;
}

/// The single LLM client shared by all agents. Cheap to clone.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn ModelProvider>,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn ModelProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Text-only structured call.
    pub async fn invoke<T: StructuredOutput>(
        &self,
        system: &str,
        prompt: &str,
        params: &ModelParams,
    ) -> Result<T, GenerationError> {
        self.invoke_with_attachments(system, prompt, params, &[])
            .await
    }

    /// Structured call with image/document inputs placed before the prompt.
    pub async fn invoke_with_attachments<T: StructuredOutput>(
        &self,
        system: &str,
        prompt: &str,
        params: &ModelParams,
        attachments: &[Attachment],
    ) -> Result<T, GenerationError> {
        let schema = T::schema();
        let request = GenerationRequest {
            system,
            prompt,
            schema: &schema,
            params,
            attachments,
        };

        let raw = tokio::time::timeout(self.timeout, self.provider.generate(&request))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))??;

        Ok(schema::parse::<T>(raw)?)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
