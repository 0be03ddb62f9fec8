use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vmgate_tools::{ToolInvocation, ToolOutcome};

/// Text sent back when the model called tools but wrote nothing
pub const ACTION_COMPLETED: &str = "Action completed.";

fn default_mode() -> String {
    "chat".to_string()
}

/// One chat turn as received from the client
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Per-request LLM credential; comes from a header, never the body
    #[serde(skip)]
    pub credential: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mode: mode.into(),
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }
}

/// A tool call as the model requested it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub name: String,
    pub args: Map<String, Value>,
}

impl From<&ToolInvocation> for ToolUse {
    fn from(invocation: &ToolInvocation) -> Self {
        Self {
            name: invocation.name.clone(),
            args: invocation.arguments.clone(),
        }
    }
}

/// Structured reply for one chat turn
///
/// When present, `tool_outcomes[i]` is the outcome of `tools_used[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response_text: String,
    pub tools_used: Vec<ToolUse>,
    pub tool_outcomes: Option<Vec<ToolOutcome>>,
    pub thinking: Option<String>,
}

impl ChatReply {
    pub fn text(response_text: impl Into<String>) -> Self {
        Self {
            response_text: response_text.into(),
            tools_used: Vec::new(),
            tool_outcomes: None,
            thinking: None,
        }
    }

    /// Reply that explains a failed turn instead of erroring
    pub fn failure(cause: impl std::fmt::Display) -> Self {
        Self::text(format!("Sorry, there was an error: {}", cause))
    }
}
