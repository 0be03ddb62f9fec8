//! Tool Registry
//!
//! An explicit name → handler table, filled once at startup and shared
//! read-only afterwards. Registration order is kept so the declarations
//! offered to the model are stable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use vmgate_core::{Error, Result};

use crate::tool::BoxedTool;

/// Suffix carried by legacy tool names (`execute_command_api`, ...)
const LEGACY_SUFFIX: &str = "_api";

/// Tool declaration metadata (without the handler)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
}

impl ToolDeclaration {
    /// Names of the parameters the schema marks as required
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameter_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Tool Registry
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<Arc<str>, BoxedTool>,
    order: Vec<Arc<str>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: BoxedTool) -> Result<()> {
        let name: Arc<str> = Arc::from(tool.name());
        if self.tools.contains_key(&name) {
            return Err(Error::internal(format!("Tool already registered: {}", name)));
        }
        debug!("Registered tool: {}", name);
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by its exact name
    pub fn get(&self, name: &str) -> Option<BoxedTool> {
        self.tools.get(name).cloned()
    }

    /// Look a tool up by name, accepting the legacy `_api` suffix.
    pub fn resolve(&self, name: &str) -> Option<BoxedTool> {
        self.get(name).or_else(|| {
            name.strip_suffix(LEGACY_SUFFIX)
                .and_then(|canonical| self.get(canonical))
        })
    }

    /// Declarations in registration order
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDeclaration {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameter_schema: tool.input_schema(),
            })
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.order.iter().map(|n| n.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
