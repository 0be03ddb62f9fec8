//! Command execution handler

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteCommandRequest {
    #[serde(default)]
    pub command: Option<String>,
}

/// POST /execute_command - Run a shell command in the sandbox
pub async fn execute_command_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ExecuteCommandRequest>,
) -> ApiResult<Json<Value>> {
    let command = request
        .command
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Command not provided."))?;

    info!("Executing command in sandbox ({} chars)", command.len());
    let result = state.sandbox.run_command(&command).await?;
    Ok(Json(result))
}
