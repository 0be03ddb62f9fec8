//! Tool listing handler

use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// GET /tools - The tool declarations offered to tool-capable modes
pub async fn list_tools_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let tools: Vec<Value> = state
        .tool_registry
        .declarations()
        .into_iter()
        .map(|d| {
            json!({
                "name": d.name,
                "description": d.description,
                "parameters": d.parameter_schema,
            })
        })
        .collect();

    Json(json!({
        "count": tools.len(),
        "tools": tools,
    }))
}
