//! vmgate-chat: Chat turn handling
//!
//! Resolves a mode into a model/tool/prompt profile, calls the LLM,
//! dispatches any requested tool calls and shapes the final reply.

pub mod mode;
pub mod orchestrator;
pub mod postprocess;
pub mod system_prompt;
pub mod types;

pub use mode::{Mode, ModeProfile, ModeRegistry};
pub use orchestrator::ChatOrchestrator;
pub use postprocess::{extract, Extracted};
pub use types::{ChatReply, ChatRequest, ToolUse, ACTION_COMPLETED};
