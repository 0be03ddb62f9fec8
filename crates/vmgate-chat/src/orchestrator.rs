//! Chat Orchestrator
//!
//! One stateless turn: resolve credential and mode, call the model once,
//! run any requested tool calls, post-process the text.
//!
//! Failures after the credential check (LLM errors, missing proxy
//! configuration, malformed model output) do not propagate. They become a
//! normal reply whose text explains the error.

use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;
use vmgate_core::{Error, Result};
use vmgate_llm::{ChatMessage, ChatRequest as LlmRequest, SharedProviderFactory};
use vmgate_tools::{ToolDispatcher, ToolInvocation};

use crate::mode::ModeRegistry;
use crate::postprocess::extract;
use crate::types::{ChatReply, ChatRequest, ToolUse, ACTION_COMPLETED};

pub struct ChatOrchestrator {
    modes: Arc<ModeRegistry>,
    dispatcher: ToolDispatcher,
    providers: SharedProviderFactory,
    default_credential: Option<String>,
    proxy_configured: bool,
}

impl ChatOrchestrator {
    pub fn new(modes: Arc<ModeRegistry>, dispatcher: ToolDispatcher, providers: SharedProviderFactory) -> Self {
        Self {
            modes,
            dispatcher,
            providers,
            default_credential: None,
            proxy_configured: true,
        }
    }

    /// Process-wide credential used when a request carries none
    pub fn with_default_credential(mut self, credential: Option<String>) -> Self {
        self.default_credential = credential.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_proxy_configured(mut self, configured: bool) -> Self {
        self.proxy_configured = configured;
        self
    }

    /// Request credential first, then the process default.
    pub fn resolve_credential(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_credential.clone())
            .ok_or(Error::MissingCredential)
    }

    /// Handle one chat turn.
    ///
    /// Only input problems are returned as errors: an empty message
    /// (`InvalidArgument`) or no usable credential (`MissingCredential`).
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply> {
        if request.message.trim().is_empty() {
            return Err(Error::invalid_argument("message must not be empty"));
        }
        let api_key = self.resolve_credential(request.credential.as_deref())?;

        let request_id = Uuid::new_v4();
        let span = info_span!("chat_turn", %request_id, mode = %request.mode);

        let reply = async {
            info!("Received message ({} chars)", request.message.len());
            match self.run_turn(&api_key, &request).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Error in chat turn: {}", e);
                    ChatReply::failure(e)
                }
            }
        }
        .instrument(span)
        .await;

        Ok(reply)
    }

    async fn run_turn(&self, api_key: &str, request: &ChatRequest) -> Result<ChatReply> {
        let profile = self.modes.resolve(&request.mode);
        if profile.uses_tools() && !self.proxy_configured {
            return Err(Error::configuration_missing(
                "SANDBOX_PROXY_URL environment variable is not set. Please configure it.",
            ));
        }

        let mut messages = Vec::with_capacity(2);
        if !profile.system_prompt.is_empty() {
            messages.push(ChatMessage::system(profile.system_prompt.as_str()));
        }
        messages.push(ChatMessage::user(request.message.as_str()));

        let llm_request = LlmRequest::new(messages).with_tools(profile.tools.to_vec());

        info!(
            "Calling model {} ({} tools) for mode {}",
            profile.model_id,
            profile.tools.len(),
            profile.mode
        );
        let provider = self.providers.connect(api_key);
        let response = provider
            .chat_with_request(&profile.model_id, llm_request)
            .await
            .map_err(|e| Error::llm(format!("{:#}", e)))?;
        debug!(
            "Model {} answered: {} chars, {} tool calls",
            response.model,
            response.message.content.len(),
            response.tool_calls.len()
        );

        let invocations: Vec<ToolInvocation> = response
            .tool_calls
            .into_iter()
            .map(|call| ToolInvocation::from_value(call.name, call.arguments))
            .collect();

        let mut response_text = response.message.content;
        let mut reply = ChatReply::text(String::new());

        if !invocations.is_empty() {
            let outcomes = self.dispatcher.dispatch(&invocations).await;
            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            info!("Executed {} tool calls ({} failed)", outcomes.len(), failed);

            reply.tools_used = invocations.iter().map(ToolUse::from).collect();
            reply.tool_outcomes = Some(outcomes);

            if response_text.trim().is_empty() {
                response_text = ACTION_COMPLETED.to_string();
            }
        }

        if profile.parses_thinking() && !response_text.is_empty() {
            let extracted = extract(&response_text);
            response_text = extracted.answer;
            reply.thinking = extracted.thinking;
        }

        reply.response_text = response_text;
        Ok(reply)
    }
}
