//! LLM Provider Traits and Types
//!
//! This module defines the common interface for chat-completion providers,
//! including tool declarations and the tool calls a model asks for.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Tool call information from LLM response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallInfo {
    pub id: String,
    pub name: String,
    /// Decoded argument object
    pub arguments: Value,
}

/// Tool definition for LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Convert to OpenAI-style function calling format (used by Mistral)
    pub fn to_openai_format(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters
            }
        })
    }
}

/// Tool choice for LLM request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Let the model decide whether to call tools
    #[default]
    Auto,
    /// Force the model to call a tool
    Required,
    /// Disable tool usage
    None,
}

impl ToolChoice {
    pub fn to_api_format(&self) -> Value {
        match self {
            ToolChoice::Auto => serde_json::json!("auto"),
            ToolChoice::Required => serde_json::json!("required"),
            ToolChoice::None => serde_json::json!("none"),
        }
    }
}

/// Full chat request with tools
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    /// Only sent when `tools` is non-empty
    pub tool_choice: Option<ToolChoice>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            tool_choice: None,
        }
    }

    /// Attach tools; a non-empty tool set turns on automatic tool choice.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tool_choice = if tools.is_empty() {
            None
        } else {
            Some(ToolChoice::Auto)
        };
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub model: String,
    pub provider: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
    /// Tool calls in the order the model returned them
    pub tool_calls: Vec<ToolCallInfo>,
}

/// Boxed provider for dynamic dispatch
pub type BoxedProvider = Box<dyn LlmProvider>;

/// LLM Provider trait
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name, used in logs
    fn provider_name(&self) -> &str;

    /// Chat with full request including tools
    ///
    /// Implementations MUST:
    /// 1. Pass tools to the API
    /// 2. Set tool_choice according to request
    /// 3. Parse tool_calls from response, preserving their order
    async fn chat_with_request(&self, model: &str, request: ChatRequest) -> Result<ChatResponse>;
}

/// Creates a provider bound to one credential.
pub trait ProviderFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> BoxedProvider;
}

pub type SharedProviderFactory = Arc<dyn ProviderFactory>;

#[cfg(test)]
mod tests {
    use super::*;

    fn command_tool() -> ToolDefinition {
        ToolDefinition {
            name: "execute_command".to_string(),
            description: "Execute a shell command".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {"command": {"type": "string"}},
                "required": ["command"]
            }),
        }
    }

    #[test]
    fn test_with_tools_enables_auto_choice() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]).with_tools(vec![command_tool()]);
        assert_eq!(request.tool_choice, Some(ToolChoice::Auto));

        let request = ChatRequest::new(vec![ChatMessage::user("hi")]).with_tools(vec![]);
        assert_eq!(request.tool_choice, None);
    }

    #[test]
    fn test_openai_format() {
        let formatted = command_tool().to_openai_format();
        assert_eq!(formatted["type"], "function");
        assert_eq!(formatted["function"]["name"], "execute_command");
        assert_eq!(formatted["function"]["parameters"]["required"][0], "command");
    }
}
