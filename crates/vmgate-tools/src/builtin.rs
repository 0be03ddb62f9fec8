//! Built-in sandbox tools
//!
//! The seven tools exposed to tool-capable modes. Each one decodes its
//! arguments into a [`SandboxOp`] and forwards it to the sandbox proxy.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use vmgate_core::{Error, Result};

use crate::registry::{ToolDeclaration, ToolRegistry};
use crate::sandbox::{SandboxClient, SandboxOp};
use crate::Tool;

/// The fixed set of sandbox tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxToolKind {
    ExecuteCommand,
    WriteFile,
    ReadFile,
    ListDirectory,
    CreateDirectory,
    MoveItem,
    DeleteItem,
}

impl SandboxToolKind {
    /// Declaration order, which is also the order offered to the model
    pub const ALL: [SandboxToolKind; 7] = [
        SandboxToolKind::ExecuteCommand,
        SandboxToolKind::WriteFile,
        SandboxToolKind::ReadFile,
        SandboxToolKind::ListDirectory,
        SandboxToolKind::CreateDirectory,
        SandboxToolKind::MoveItem,
        SandboxToolKind::DeleteItem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SandboxToolKind::ExecuteCommand => "execute_command",
            SandboxToolKind::WriteFile => "write_file",
            SandboxToolKind::ReadFile => "read_file",
            SandboxToolKind::ListDirectory => "list_directory",
            SandboxToolKind::CreateDirectory => "create_directory",
            SandboxToolKind::MoveItem => "move_item",
            SandboxToolKind::DeleteItem => "delete_item",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            SandboxToolKind::ExecuteCommand => "Execute a shell command in the sandbox VM.",
            SandboxToolKind::WriteFile => "Write content to a specified file in the sandbox VM.",
            SandboxToolKind::ReadFile => "Read content from a specified file in the sandbox VM.",
            SandboxToolKind::ListDirectory => "List files and directories in the sandbox VM.",
            SandboxToolKind::CreateDirectory => "Create a new directory in the sandbox VM.",
            SandboxToolKind::MoveItem => "Move or rename a file or directory in the sandbox VM.",
            SandboxToolKind::DeleteItem => "Delete a file or directory in the sandbox VM.",
        }
    }

    pub fn input_schema(&self) -> Value {
        match self {
            SandboxToolKind::ExecuteCommand => json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "The shell command to execute"}
                },
                "required": ["command"]
            }),
            SandboxToolKind::WriteFile => json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "The path to the file to write to"},
                    "content": {"type": "string", "description": "The content to write into the file"}
                },
                "required": ["path", "content"]
            }),
            SandboxToolKind::ReadFile => json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "The path to the file to read from"}
                },
                "required": ["path"]
            }),
            SandboxToolKind::ListDirectory => json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "The path to the directory to list"}
                },
                "required": ["path"]
            }),
            SandboxToolKind::CreateDirectory => json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "The path of the directory to create"}
                },
                "required": ["path"]
            }),
            SandboxToolKind::MoveItem => json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "The path of the file or directory to move."},
                    "new_path": {"type": "string", "description": "The new path for the file or directory."}
                },
                "required": ["path", "new_path"]
            }),
            SandboxToolKind::DeleteItem => json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "The path of the file or directory to delete."},
                    "is_dir": {
                        "type": "boolean",
                        "description": "Set to true if the item to delete is a directory.",
                        "default": false
                    }
                },
                "required": ["path"]
            }),
        }
    }

    pub fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameter_schema: self.input_schema(),
        }
    }

    /// Decode tool arguments into the sandbox operation they describe
    pub fn to_op(&self, input: Value) -> Result<SandboxOp> {
        match self {
            SandboxToolKind::ExecuteCommand => {
                let args: CommandArgs = decode(self.name(), input)?;
                Ok(SandboxOp::RunCommand { command: args.command })
            }
            SandboxToolKind::WriteFile => {
                let args: WriteArgs = decode(self.name(), input)?;
                Ok(SandboxOp::WriteFile {
                    path: args.path,
                    content: args.content,
                })
            }
            SandboxToolKind::ReadFile => {
                let args: PathArgs = decode(self.name(), input)?;
                Ok(SandboxOp::ReadFile { path: args.path })
            }
            SandboxToolKind::ListDirectory => {
                let args: PathArgs = decode(self.name(), input)?;
                Ok(SandboxOp::ListDirectory { path: args.path })
            }
            SandboxToolKind::CreateDirectory => {
                let args: PathArgs = decode(self.name(), input)?;
                Ok(SandboxOp::CreateDirectory { path: args.path })
            }
            SandboxToolKind::MoveItem => {
                let args: MoveArgs = decode(self.name(), input)?;
                SandboxOp::move_item(args.path, args.new_path)
            }
            SandboxToolKind::DeleteItem => {
                let args: DeleteArgs = decode(self.name(), input)?;
                Ok(SandboxOp::DeleteItem {
                    path: args.path,
                    is_dir: args.is_dir.unwrap_or(false),
                })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommandArgs {
    command: String,
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    path: String,
}

#[derive(Debug, Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MoveArgs {
    path: String,
    #[serde(default)]
    new_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteArgs {
    path: String,
    #[serde(default)]
    is_dir: Option<bool>,
}

fn decode<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    serde_json::from_value(input)
        .map_err(|e| Error::invalid_argument(format!("Invalid arguments for {}: {}", tool, e)))
}

/// The shared declaration table for every sandbox tool
pub fn sandbox_tool_declarations() -> Vec<ToolDeclaration> {
    SandboxToolKind::ALL.iter().map(|k| k.declaration()).collect()
}

/// A sandbox tool bound to a proxy client
pub struct SandboxTool {
    kind: SandboxToolKind,
    client: Arc<SandboxClient>,
}

impl SandboxTool {
    pub fn new(kind: SandboxToolKind, client: Arc<SandboxClient>) -> Self {
        Self { kind, client }
    }
}

#[async_trait]
impl Tool for SandboxTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    fn input_schema(&self) -> Value {
        self.kind.input_schema()
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let op = self.kind.to_op(input)?;
        debug!("Sandbox tool {} -> {:?}", self.kind.name(), op);
        self.client.perform(&op).await
    }
}

/// Register all seven sandbox tools against one proxy client
pub fn register_sandbox_tools(registry: &mut ToolRegistry, client: Arc<SandboxClient>) -> Result<()> {
    for kind in SandboxToolKind::ALL {
        registry.register(Arc::new(SandboxTool::new(kind, client.clone())))?;
    }
    Ok(())
}
