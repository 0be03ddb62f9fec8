//! Tool Dispatcher
//!
//! Runs a model's tool calls one after another, in the order the model
//! returned them. A failing call (unknown name, bad arguments, proxy error,
//! even a panicking handler) only marks its own outcome as failed; the
//! remaining calls still run.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};
use vmgate_core::Error;

use crate::registry::ToolRegistry;

/// One tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Build from a decoded argument value; non-objects become empty maps.
    pub fn from_value(name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(name, arguments)
    }
}

/// Exactly one of result or error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Result(Value),
    Error(String),
}

/// Outcome of one invocation, in the same position as its request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub name: String,
    pub arguments: Map<String, Value>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ToolOutcome {
    pub fn success(invocation: &ToolInvocation, result: Value) -> Self {
        Self {
            name: invocation.name.clone(),
            arguments: invocation.arguments.clone(),
            status: OutcomeStatus::Result(result),
        }
    }

    pub fn failure(invocation: &ToolInvocation, error: impl Into<String>) -> Self {
        Self {
            name: invocation.name.clone(),
            arguments: invocation.arguments.clone(),
            status: OutcomeStatus::Error(error.into()),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.status {
            OutcomeStatus::Result(v) => Some(v),
            OutcomeStatus::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Error(e) => Some(e),
            OutcomeStatus::Result(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Result(_))
    }
}

/// Sequential, isolate-and-continue tool executor
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Execute every invocation in order; returns one outcome per request.
    pub async fn dispatch(&self, requests: &[ToolInvocation]) -> Vec<ToolOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            info!(
                "Dispatching tool call {}/{}: {}",
                index + 1,
                requests.len(),
                request.name
            );
            outcomes.push(self.dispatch_one(request).await);
        }
        outcomes
    }

    async fn dispatch_one(&self, request: &ToolInvocation) -> ToolOutcome {
        let Some(tool) = self.registry.resolve(&request.name) else {
            warn!("Unknown tool requested: {}", request.name);
            return ToolOutcome::failure(request, Error::UnknownTool(request.name.clone()).to_string());
        };

        let input = Value::Object(request.arguments.clone());
        match AssertUnwindSafe(tool.execute(input)).catch_unwind().await {
            Ok(Ok(result)) => ToolOutcome::success(request, result),
            Ok(Err(e)) => {
                warn!("Tool {} failed: {}", request.name, e);
                ToolOutcome::failure(request, e.to_string())
            }
            Err(_) => {
                warn!("Tool {} panicked", request.name);
                ToolOutcome::failure(
                    request,
                    Error::tool_execution(format!("tool {} panicked", request.name)).to_string(),
                )
            }
        }
    }
}
