//! Chat API Handler

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;
use vmgate_chat::{ChatReply, ChatRequest, ToolUse};
use vmgate_tools::{OutcomeStatus, ToolOutcome};

use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

/// Header carrying a per-request LLM credential
pub const API_KEY_HEADER: &str = "x-mistral-api-key";

/// One executed tool call as shown to the client
#[derive(Debug, Serialize)]
pub struct DesktopAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub args: Map<String, Value>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl From<ToolOutcome> for DesktopAction {
    fn from(outcome: ToolOutcome) -> Self {
        Self {
            action_type: outcome.name,
            args: outcome.arguments,
            status: outcome.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub tools_used: Vec<ToolUse>,
    pub desktop_actions: Option<Vec<DesktopAction>>,
    pub thinking: Option<String>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            response: reply.response_text,
            tools_used: reply.tools_used,
            desktop_actions: reply
                .tool_outcomes
                .map(|outcomes| outcomes.into_iter().map(DesktopAction::from).collect()),
            thinking: reply.thinking,
        }
    }
}

fn header_credential(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /chat - One chat turn
///
/// LLM and tool failures come back as 200 with an explanatory `response`.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let credential = header_credential(&headers);
    info!(
        "Chat request: mode={} ({} chars, header credential: {})",
        request.mode,
        request.message.len(),
        credential.is_some()
    );

    let reply = state
        .orchestrator
        .handle(request.with_credential(credential))
        .await?;
    Ok(Json(reply.into()))
}
