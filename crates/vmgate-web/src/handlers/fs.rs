//! File system handlers
//!
//! `write_file`, `read_file` and `list_directory` forward to the proxy's
//! native endpoints. The others are shell commands run through
//! `/execute_command`.

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vmgate_tools::SandboxOp;

use crate::error::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PathRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct WriteFileRequest {
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    pub path: String,
    #[serde(default)]
    pub new_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemRequest {
    pub path: String,
    #[serde(default)]
    pub is_dir: bool,
}

async fn forward(state: &AppState, op: SandboxOp) -> ApiResult<Json<Value>> {
    info!("Sandbox operation via {}", op.endpoint());
    Ok(Json(state.sandbox.perform(&op).await?))
}

/// POST /fs/write_file
pub async fn write_file_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<WriteFileRequest>,
) -> ApiResult<Json<Value>> {
    let content = request
        .content
        .ok_or_else(|| ApiError::bad_request("content is required for write_file."))?;
    forward(
        &state,
        SandboxOp::WriteFile {
            path: request.path,
            content,
        },
    )
    .await
}

/// POST /fs/read_file
pub async fn read_file_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PathRequest>,
) -> ApiResult<Json<Value>> {
    forward(&state, SandboxOp::ReadFile { path: request.path }).await
}

/// POST /fs/list_directory
pub async fn list_directory_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PathRequest>,
) -> ApiResult<Json<Value>> {
    forward(&state, SandboxOp::ListDirectory { path: request.path }).await
}

/// POST /fs/create_directory
pub async fn create_directory_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PathRequest>,
) -> ApiResult<Json<Value>> {
    forward(&state, SandboxOp::CreateDirectory { path: request.path }).await
}

/// POST /fs/move_item
pub async fn move_item_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MoveItemRequest>,
) -> ApiResult<Json<Value>> {
    let op = SandboxOp::move_item(request.path, request.new_path)?;
    forward(&state, op).await
}

/// POST /fs/delete_item
pub async fn delete_item_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<DeleteItemRequest>,
) -> ApiResult<Json<Value>> {
    forward(
        &state,
        SandboxOp::DeleteItem {
            path: request.path,
            is_dir: request.is_dir,
        },
    )
    .await
}
