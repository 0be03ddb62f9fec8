//! vmgate-llm: LLM Provider Integration
//!
//! ## Supported Providers & Endpoints
//!
//! | Provider | Base URL | Auth Method |
//! |----------|----------|-------------|
//! | Mistral | `https://api.mistral.ai/v1` | `Bearer {MISTRAL_API_KEY}` |
//!
//! The credential is chosen per request, so providers are created through a
//! [`ProviderFactory`] rather than held as long-lived clients.

pub mod mistral;
pub mod provider;

pub use mistral::{MistralClient, MistralFactory};
pub use provider::{
    BoxedProvider, ChatMessage, ChatRequest, ChatResponse, LlmProvider, ProviderFactory,
    SharedProviderFactory, TokenUsage, ToolCallInfo, ToolChoice, ToolDefinition,
};
