//! Mistral API Client
//!
//! ## API Endpoints
//!
//! | Endpoint | URL | Purpose |
//! |----------|-----|--------|
//! | Base URL | `https://api.mistral.ai/v1` | All Mistral APIs |
//! | Chat | `/chat/completions` | Chat with function calling |
//!
//! ## Authentication
//! - Header: `Authorization: Bearer {MISTRAL_API_KEY}`
//! - Per request: `X-Mistral-API-Key` on the gateway's `/chat` endpoint

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::provider::{
    BoxedProvider, ChatMessage, ChatRequest, ChatResponse, LlmProvider, ProviderFactory,
    TokenUsage, ToolCallInfo,
};

/// Mistral API endpoints
pub mod endpoints {
    /// Base API URL
    pub const BASE_URL: &str = "https://api.mistral.ai/v1";

    /// Chat completions endpoint
    /// Full URL: {BASE_URL}/chat/completions
    pub const CHAT_COMPLETIONS: &str = "/chat/completions";
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Debug, Serialize)]
struct MistralRequest {
    model: String,
    messages: Vec<MistralMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MistralMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<MistralToolCall>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MistralToolCall {
    #[serde(default)]
    id: Option<String>,
    function: MistralFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct MistralFunctionCall {
    name: String,
    /// Usually a JSON-encoded string, occasionally an inline object
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct MistralResponse {
    choices: Vec<MistralChoice>,
    model: Option<String>,
    usage: Option<MistralUsage>,
}

#[derive(Debug, Deserialize)]
struct MistralChoice {
    message: MistralMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MistralUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn build_request(model: &str, request: ChatRequest) -> MistralRequest {
    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(request.tools.iter().map(|t| t.to_openai_format()).collect())
    };
    let tool_choice = tools
        .as_ref()
        .and(request.tool_choice)
        .map(|c| c.to_api_format());

    MistralRequest {
        model: model.to_string(),
        messages: request
            .messages
            .into_iter()
            .map(|m| MistralMessage {
                role: m.role,
                content: Some(m.content),
                tool_calls: None,
            })
            .collect(),
        tools,
        tool_choice,
    }
}

/// Decode tool call arguments into an object.
fn decode_arguments(name: &str, raw: Value) -> Result<Value> {
    match raw {
        Value::Null => Ok(Value::Object(Default::default())),
        Value::String(s) if s.trim().is_empty() => Ok(Value::Object(Default::default())),
        Value::String(s) => {
            let parsed: Value = serde_json::from_str(&s)
                .with_context(|| format!("Invalid JSON arguments for tool call '{}'", name))?;
            if parsed.is_object() {
                Ok(parsed)
            } else {
                Err(anyhow!("Arguments for tool call '{}' are not an object", name))
            }
        }
        obj @ Value::Object(_) => Ok(obj),
        other => Err(anyhow!(
            "Arguments for tool call '{}' are not an object: {}",
            name,
            other
        )),
    }
}

fn parse_response(model: &str, result: MistralResponse) -> Result<ChatResponse> {
    let choice = result
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No response from Mistral"))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, call)| {
            let arguments = decode_arguments(&call.function.name, call.function.arguments)?;
            Ok(ToolCallInfo {
                id: call.id.unwrap_or_else(|| format!("call_{}", i)),
                name: call.function.name,
                arguments,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let usage = result.usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(ChatResponse {
        message: ChatMessage::assistant(choice.message.content.unwrap_or_default()),
        model: result.model.unwrap_or_else(|| model.to_string()),
        provider: "mistral".to_string(),
        finish_reason: choice.finish_reason,
        usage,
        tool_calls,
    })
}

// =============================================================================
// CLIENT IMPLEMENTATION
// =============================================================================

/// Mistral API Client
pub struct MistralClient {
    client: Client,
    api_key: String,
    /// Base API URL
    api_url: String,
}

impl MistralClient {
    /// Create a new Mistral client against the default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(build_http_client(Duration::from_secs(120)), api_key, endpoints::BASE_URL)
    }

    /// Create with custom endpoint
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let mut client = Self::new(api_key);
        client.api_url = endpoint.into();
        client
    }

    fn with_client(client: Client, api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }
}

fn build_http_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_default()
}

#[async_trait]
impl LlmProvider for MistralClient {
    fn provider_name(&self) -> &str {
        "mistral"
    }

    async fn chat_with_request(&self, model: &str, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}{}", self.api_url, endpoints::CHAT_COMPLETIONS);

        info!(
            "Mistral chat: model={}, tools={}, endpoint={}",
            model,
            request.tools.len(),
            self.api_url
        );

        let body = build_request(model, request);
        debug!("Mistral request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send Mistral request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Mistral API error {}: {}", status, body));
        }

        let result: MistralResponse = response
            .json()
            .await
            .context("Failed to parse Mistral response")?;

        parse_response(model, result)
    }
}

/// Builds a [`MistralClient`] per credential, sharing one connection pool.
#[derive(Clone)]
pub struct MistralFactory {
    client: Client,
    api_url: String,
}

impl MistralFactory {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_http_client(timeout),
            api_url: api_url.into(),
        }
    }
}

impl ProviderFactory for MistralFactory {
    fn connect(&self, api_key: &str) -> BoxedProvider {
        Box::new(MistralClient::with_client(
            self.client.clone(),
            api_key,
            self.api_url.clone(),
        ))
    }
}
