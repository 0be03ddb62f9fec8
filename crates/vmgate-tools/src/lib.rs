//! vmgate-tools: Sandbox Tools and Dispatch
//!
//! Provides the sandbox proxy client, the built-in sandbox tools, the tool
//! registry and the dispatcher that runs a model's tool calls.

pub mod builtin;
pub mod dispatcher;
pub mod registry;
pub mod sandbox;
pub mod tool;

pub use builtin::{register_sandbox_tools, sandbox_tool_declarations, SandboxTool, SandboxToolKind};
pub use dispatcher::{OutcomeStatus, ToolDispatcher, ToolInvocation, ToolOutcome};
pub use registry::{ToolDeclaration, ToolRegistry};
pub use sandbox::{SandboxClient, SandboxOp};
pub use tool::{BoxedTool, SimpleTool, Tool};
