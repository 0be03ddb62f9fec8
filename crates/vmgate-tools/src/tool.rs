//! Core Tool trait and types
//!
//! Defines the invocation interface every tool handler implements.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use vmgate_core::Result;

/// Core trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name (unique identifier)
    fn name(&self) -> &str;

    /// Get human-readable description
    fn description(&self) -> &str;

    /// Get JSON schema for the tool arguments
    fn input_schema(&self) -> Value;

    /// Execute the tool with given arguments
    async fn execute(&self, input: Value) -> Result<Value>;
}

/// Type alias for boxed tools
pub type BoxedTool = Arc<dyn Tool>;

/// Closure-backed tool, handy for tests and local handlers
#[derive(Clone)]
pub struct SimpleTool {
    name: String,
    description: String,
    schema: Value,
    handler: Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>,
}

impl SimpleTool {
    pub fn new<F>(name: &str, description: &str, schema: Value, handler: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema,
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl Tool for SimpleTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        (self.handler)(input)
    }
}
