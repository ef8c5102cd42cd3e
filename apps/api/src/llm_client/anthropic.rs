//! Anthropic Messages API provider.
//!
//! Structured output is forced through tool use: the declared schema becomes
//! the single tool's `input_schema` and `tool_choice` names that tool, so the
//! model answers with a `tool_use` block whose `input` is the raw result.
//! A JSON text block is accepted as a fallback.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{strip_json_fences, GenerationError, GenerationRequest, ModelProvider};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    tools: Vec<Tool<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Text { text: &'a str },
    Image { source: Base64Source<'a> },
    Document { source: Base64Source<'a> },
}

#[derive(Debug, Serialize)]
struct Base64Source<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Production provider backed by the Anthropic Messages API.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, GenerationError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Value, GenerationError> {
        let body = build_request(request);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("LLM API returned {}: {}", status, message);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: MessagesResponse = response.json().await?;
        debug!(
            "LLM call succeeded: schema={}, input_tokens={}, output_tokens={}",
            request.schema.name, response.usage.input_tokens, response.usage.output_tokens
        );

        extract_structured(response, request.schema.name)
    }
}

fn build_request<'a>(request: &'a GenerationRequest<'a>) -> MessagesRequest<'a> {
    let mut content: Vec<RequestBlock<'a>> = request
        .attachments
        .iter()
        .map(|attachment| {
            let source = Base64Source {
                kind: "base64",
                media_type: &attachment.media_type,
                data: BASE64.encode(&attachment.data),
            };
            if attachment.media_type.starts_with("image/") {
                RequestBlock::Image { source }
            } else {
                RequestBlock::Document { source }
            }
        })
        .collect();
    content.push(RequestBlock::Text {
        text: request.prompt,
    });

    MessagesRequest {
        model: &request.params.model,
        max_tokens: request.params.max_tokens,
        temperature: request.params.temperature,
        system: request.system,
        messages: vec![Message {
            role: "user",
            content,
        }],
        tools: vec![Tool {
            name: request.schema.name,
            description: format!("Record the {} result.", request.schema.name.replace('_', " ")),
            input_schema: request.schema.to_json_schema(),
        }],
        tool_choice: ToolChoice {
            kind: "tool",
            name: request.schema.name,
        },
    }
}

/// Picks the structured value out of a response: the named tool call first,
/// then any text block that parses as JSON.
fn extract_structured(response: MessagesResponse, tool_name: &str) -> Result<Value, GenerationError> {
    let mut text_fallback = None;

    for block in response.content {
        match block {
            ResponseBlock::ToolUse { name, input } if name == tool_name => return Ok(input),
            ResponseBlock::Text { text } if text_fallback.is_none() => text_fallback = Some(text),
            _ => {}
        }
    }

    let text = text_fallback.ok_or(GenerationError::EmptyContent)?;
    Ok(serde_json::from_str(strip_json_fences(&text))?)
}
