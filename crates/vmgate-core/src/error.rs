//! Error types for vmgate

use thiserror::Error;

/// Main error type for gateway operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Mistral API Key is missing. Please provide it in the X-Mistral-API-Key header or as a MISTRAL_API_KEY environment variable.")]
    MissingCredential,

    #[error("Proxy request failed: {0}")]
    ProxyUnreachable(String),

    #[error("Proxy returned error: {body}")]
    ProxyError { status: u16, body: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("{0}")]
    ConfigurationMissing(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a proxy transport error
    pub fn proxy_unreachable(msg: impl Into<String>) -> Self {
        Error::ProxyUnreachable(msg.into())
    }

    /// Create an upstream proxy status error
    pub fn proxy_error(status: u16, body: impl Into<String>) -> Self {
        Error::ProxyError {
            status,
            body: body.into(),
        }
    }

    /// Create a tool execution error
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Error::ToolExecution(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn configuration_missing(msg: impl Into<String>) -> Self {
        Error::ConfigurationMissing(msg.into())
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        Error::Llm(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Upstream status carried by this error, if it came from the proxy
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::ProxyError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
