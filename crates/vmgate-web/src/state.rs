//! Application State
//!
//! Built once at startup and shared read-only by every handler.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use vmgate_chat::{ChatOrchestrator, ModeRegistry};
use vmgate_core::GatewayConfig;
use vmgate_llm::{MistralFactory, SharedProviderFactory};
use vmgate_tools::{register_sandbox_tools, SandboxClient, ToolDispatcher, ToolRegistry};

pub struct AppState {
    pub config: GatewayConfig,
    pub sandbox: Arc<SandboxClient>,
    pub tool_registry: Arc<ToolRegistry>,
    pub orchestrator: Arc<ChatOrchestrator>,
    pub start_time: Instant,
}

impl AppState {
    /// State backed by the Mistral chat-completion API
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let providers = Arc::new(MistralFactory::new(config.llm_base_url.clone(), config.llm_timeout));
        Self::with_provider_factory(config, providers)
    }

    pub fn with_provider_factory(
        config: GatewayConfig,
        providers: SharedProviderFactory,
    ) -> anyhow::Result<Self> {
        let sandbox = Arc::new(SandboxClient::new(
            config.proxy_base_url.clone(),
            config.sandbox_timeout,
        ));
        match sandbox.base_url() {
            Some(url) => info!("Sandbox proxy: {}", url),
            None => warn!("Sandbox proxy URL is not configured; tool calls will fail"),
        }

        let mut registry = ToolRegistry::new();
        register_sandbox_tools(&mut registry, sandbox.clone())?;
        let tool_registry = Arc::new(registry);
        info!("Registered {} tools", tool_registry.len());

        let modes = Arc::new(ModeRegistry::new(&tool_registry.declarations()));
        let orchestrator = ChatOrchestrator::new(
            modes,
            ToolDispatcher::new(tool_registry.clone()),
            providers,
        )
        .with_default_credential(config.default_api_key.clone())
        .with_proxy_configured(sandbox.is_configured());

        if config.default_api_key.is_some() {
            info!("Default LLM credential configured");
        }

        Ok(Self {
            config,
            sandbox,
            tool_registry,
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
