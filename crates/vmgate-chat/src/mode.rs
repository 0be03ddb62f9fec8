//! Mode Profiles
//!
//! A mode picks the model, the tools and the system prompt for one chat turn.
//!
//! | mode | model | tools | system prompt |
//! |------|-------|-------|---------------|
//! | `chat` | `mistral-large-latest` | none | none |
//! | `cua` | `devstral-small-latest` | sandbox tools | general assistant |
//! | `high-effort` | `magistral-medium-latest` | sandbox tools | `<thinking>`/`<answer>` |
//! | `daytona` | `mistral-large-latest` | sandbox tools | act without confirmation |
//!
//! Any other mode string resolves to the default profile (chat model, no
//! tools, no system prompt) instead of failing.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use vmgate_llm::ToolDefinition;
use vmgate_tools::ToolDeclaration;

use crate::system_prompt::{CUA_SYSTEM_PROMPT, DAYTONA_SYSTEM_PROMPT, HIGH_EFFORT_SYSTEM_PROMPT};

pub const CHAT_MODEL: &str = "mistral-large-latest";
pub const CUA_MODEL: &str = "devstral-small-latest";
pub const HIGH_EFFORT_MODEL: &str = "magistral-medium-latest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Chat,
    Cua,
    HighEffort,
    Daytona,
    Default,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Chat => write!(f, "chat"),
            Mode::Cua => write!(f, "cua"),
            Mode::HighEffort => write!(f, "high-effort"),
            Mode::Daytona => write!(f, "daytona"),
            Mode::Default => write!(f, "default"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(Mode::Chat),
            "cua" => Ok(Mode::Cua),
            "high-effort" | "high_effort" => Ok(Mode::HighEffort),
            "daytona" => Ok(Mode::Daytona),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }
}

impl Mode {
    /// Parse a mode, falling back to `Default` for anything unrecognized
    pub fn from_name(name: &str) -> Mode {
        name.parse().unwrap_or(Mode::Default)
    }
}

/// Model, tools and prompt for one mode. Read-only after startup.
#[derive(Debug, Clone)]
pub struct ModeProfile {
    pub mode: Mode,
    pub model_id: String,
    /// Shared with every other tool-bearing profile
    pub tools: Arc<[ToolDefinition]>,
    /// Empty when the mode sends no system message
    pub system_prompt: String,
}

impl ModeProfile {
    fn new(mode: Mode, model_id: &str, tools: Arc<[ToolDefinition]>, system_prompt: &str) -> Self {
        Self {
            mode,
            model_id: model_id.to_string(),
            tools,
            system_prompt: system_prompt.to_string(),
        }
    }

    pub fn uses_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Whether replies are split into `<thinking>` and `<answer>`
    pub fn parses_thinking(&self) -> bool {
        self.mode == Mode::HighEffort
    }
}

fn to_definition(declaration: &ToolDeclaration) -> ToolDefinition {
    ToolDefinition {
        name: declaration.name.clone(),
        description: declaration.description.clone(),
        parameters: declaration.parameter_schema.clone(),
    }
}

/// The static mode table
#[derive(Debug, Clone)]
pub struct ModeRegistry {
    chat: ModeProfile,
    cua: ModeProfile,
    high_effort: ModeProfile,
    daytona: ModeProfile,
    default: ModeProfile,
}

impl ModeRegistry {
    /// Build the table; `tools` is the one declaration table every
    /// tool-capable mode refers to.
    pub fn new(tools: &[ToolDeclaration]) -> Self {
        let shared: Arc<[ToolDefinition]> = tools.iter().map(to_definition).collect();
        let none: Arc<[ToolDefinition]> = Arc::from(Vec::new());

        Self {
            chat: ModeProfile::new(Mode::Chat, CHAT_MODEL, none.clone(), ""),
            cua: ModeProfile::new(Mode::Cua, CUA_MODEL, shared.clone(), CUA_SYSTEM_PROMPT),
            high_effort: ModeProfile::new(
                Mode::HighEffort,
                HIGH_EFFORT_MODEL,
                shared.clone(),
                HIGH_EFFORT_SYSTEM_PROMPT,
            ),
            daytona: ModeProfile::new(Mode::Daytona, CHAT_MODEL, shared, DAYTONA_SYSTEM_PROMPT),
            default: ModeProfile::new(Mode::Default, CHAT_MODEL, none, ""),
        }
    }

    pub fn profile(&self, mode: Mode) -> &ModeProfile {
        match mode {
            Mode::Chat => &self.chat,
            Mode::Cua => &self.cua,
            Mode::HighEffort => &self.high_effort,
            Mode::Daytona => &self.daytona,
            Mode::Default => &self.default,
        }
    }

    /// Resolve a requested mode string; unknown values get the default profile.
    pub fn resolve(&self, mode: &str) -> &ModeProfile {
        self.profile(Mode::from_name(mode))
    }
}
