//! Sandbox Proxy Client
//!
//! ## Proxy Endpoints
//!
//! | Endpoint | Payload | Purpose |
//! |----------|---------|---------|
//! | `/execute_command` | `{command}` | Run a shell command in the VM |
//! | `/fs/write_file` | `{path, content}` | Write a file |
//! | `/fs/read_file` | `{path}` | Read a file |
//! | `/fs/list_directory` | `{path}` | List a directory |
//!
//! The proxy has no primitives for directory creation, moves or deletes;
//! those are sent to `/execute_command` as `mkdir -p`, `mv` and `rm`.
//!
//! Every call is one network round trip. Nothing is retried.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use vmgate_core::{Error, Result};

pub mod endpoints {
    pub const EXECUTE_COMMAND: &str = "/execute_command";
    pub const WRITE_FILE: &str = "/fs/write_file";
    pub const READ_FILE: &str = "/fs/read_file";
    pub const LIST_DIRECTORY: &str = "/fs/list_directory";
}

/// A logical sandbox operation, before it is turned into a proxy call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxOp {
    RunCommand { command: String },
    WriteFile { path: String, content: String },
    ReadFile { path: String },
    ListDirectory { path: String },
    CreateDirectory { path: String },
    MoveItem { path: String, new_path: String },
    DeleteItem { path: String, is_dir: bool },
}

impl SandboxOp {
    /// Build a move, rejecting a missing destination before any network call.
    pub fn move_item(path: impl Into<String>, new_path: Option<String>) -> Result<Self> {
        match new_path.filter(|p| !p.is_empty()) {
            Some(new_path) => Ok(SandboxOp::MoveItem {
                path: path.into(),
                new_path,
            }),
            None => Err(Error::invalid_argument(
                "new_path is required for move_item.",
            )),
        }
    }

    /// Proxy endpoint this operation is sent to
    pub fn endpoint(&self) -> &'static str {
        match self {
            SandboxOp::WriteFile { .. } => endpoints::WRITE_FILE,
            SandboxOp::ReadFile { .. } => endpoints::READ_FILE,
            SandboxOp::ListDirectory { .. } => endpoints::LIST_DIRECTORY,
            SandboxOp::RunCommand { .. }
            | SandboxOp::CreateDirectory { .. }
            | SandboxOp::MoveItem { .. }
            | SandboxOp::DeleteItem { .. } => endpoints::EXECUTE_COMMAND,
        }
    }

    /// Shell command for operations synthesized on top of `/execute_command`
    pub fn shell_command(&self) -> Option<String> {
        match self {
            SandboxOp::RunCommand { command } => Some(command.clone()),
            SandboxOp::CreateDirectory { path } => Some(format!("mkdir -p {}", path)),
            SandboxOp::MoveItem { path, new_path } => Some(format!("mv {} {}", path, new_path)),
            SandboxOp::DeleteItem { path, is_dir } => {
                let flags = if *is_dir { "rf" } else { "f" };
                Some(format!("rm -{} {}", flags, path))
            }
            _ => None,
        }
    }

    /// JSON body sent to the proxy
    pub fn payload(&self) -> Value {
        match self {
            SandboxOp::WriteFile { path, content } => json!({ "path": path, "content": content }),
            SandboxOp::ReadFile { path } | SandboxOp::ListDirectory { path } => json!({ "path": path }),
            _ => json!({ "command": self.shell_command().unwrap_or_default() }),
        }
    }
}

/// Forwarding client for the sandbox proxy service
#[derive(Clone)]
pub struct SandboxClient {
    client: Client,
    base_url: Option<String>,
}

impl SandboxClient {
    /// Create a client. A `None` base URL makes every call fail with
    /// `ConfigurationMissing`.
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// POST `payload` to `endpoint_path` and return the decoded JSON body.
    pub async fn execute(&self, endpoint_path: &str, payload: Value) -> Result<Value> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            Error::configuration_missing(
                "SANDBOX_PROXY_URL environment variable is not set. Please configure it.",
            )
        })?;
        let url = format!("{}{}", base_url, endpoint_path);
        debug!("Sandbox proxy request: {} {}", url, payload);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!("Sandbox proxy unreachable at {}: {}", url, e);
                Error::proxy_unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Sandbox proxy returned {} for {}: {}", status, endpoint_path, body);
            return Err(Error::proxy_error(status.as_u16(), body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::internal(format!("An unexpected error occurred: {}", e)))
    }

    /// Run a logical operation against the proxy
    pub async fn perform(&self, op: &SandboxOp) -> Result<Value> {
        self.execute(op.endpoint(), op.payload()).await
    }

    pub async fn run_command(&self, command: &str) -> Result<Value> {
        self.perform(&SandboxOp::RunCommand {
            command: command.to_string(),
        })
        .await
    }

    pub async fn read_file(&self, path: &str) -> Result<Value> {
        self.perform(&SandboxOp::ReadFile {
            path: path.to_string(),
        })
        .await
    }

    pub async fn write_file(&self, path: &str, content: &str) -> Result<Value> {
        self.perform(&SandboxOp::WriteFile {
            path: path.to_string(),
            content: content.to_string(),
        })
        .await
    }

    pub async fn list_directory(&self, path: &str) -> Result<Value> {
        self.perform(&SandboxOp::ListDirectory {
            path: path.to_string(),
        })
        .await
    }

    pub async fn create_directory(&self, path: &str) -> Result<Value> {
        self.perform(&SandboxOp::CreateDirectory {
            path: path.to_string(),
        })
        .await
    }

    pub async fn move_item(&self, path: &str, new_path: &str) -> Result<Value> {
        let op = SandboxOp::move_item(path, Some(new_path.to_string()))?;
        self.perform(&op).await
    }

    pub async fn delete_item(&self, path: &str, is_dir: bool) -> Result<Value> {
        self.perform(&SandboxOp::DeleteItem {
            path: path.to_string(),
            is_dir,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> SandboxClient {
        SandboxClient::new(Some(server.url()), Duration::from_secs(5))
    }

    #[test]
    fn test_synthesized_commands() {
        let mkdir = SandboxOp::CreateDirectory { path: "/work/src".into() };
        assert_eq!(mkdir.endpoint(), endpoints::EXECUTE_COMMAND);
        assert_eq!(mkdir.payload(), json!({"command": "mkdir -p /work/src"}));

        let mv = SandboxOp::move_item("/a.txt", Some("/b.txt".into())).unwrap();
        assert_eq!(mv.payload(), json!({"command": "mv /a.txt /b.txt"}));

        let rm_file = SandboxOp::DeleteItem { path: "/a.txt".into(), is_dir: false };
        assert_eq!(rm_file.shell_command().as_deref(), Some("rm -f /a.txt"));

        let rm_dir = SandboxOp::DeleteItem { path: "/tmp/build".into(), is_dir: true };
        assert_eq!(rm_dir.shell_command().as_deref(), Some("rm -rf /tmp/build"));
    }

    #[test]
    fn test_native_operations_forward_one_to_one() {
        let write = SandboxOp::WriteFile { path: "/x".into(), content: "hi".into() };
        assert_eq!(write.endpoint(), endpoints::WRITE_FILE);
        assert_eq!(write.payload(), json!({"path": "/x", "content": "hi"}));
        assert_eq!(write.shell_command(), None);

        let list = SandboxOp::ListDirectory { path: "/".into() };
        assert_eq!(list.endpoint(), endpoints::LIST_DIRECTORY);
        assert_eq!(list.payload(), json!({"path": "/"}));
    }

    #[test]
    fn test_move_requires_new_path() {
        assert!(matches!(
            SandboxOp::move_item("/a", None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            SandboxOp::move_item("/a", Some(String::new())),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_run_command_returns_proxy_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/execute_command")
            .match_body(Matcher::Json(json!({"command": "echo hi"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"result\": \"hi\\n\"}")
            .create_async()
            .await;

        let result = client_for(&server).run_command("echo hi").await.unwrap();
        mock.assert_async().await;
        assert_eq!(result, json!({"result": "hi\n"}));
    }

    #[tokio::test]
    async fn test_delete_directory_issues_recursive_rm() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/execute_command")
            .match_body(Matcher::Json(json!({"command": "rm -rf /tmp/out"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"result\": \"Command executed.\"}")
            .create_async()
            .await;

        client_for(&server).delete_item("/tmp/out", true).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_proxy_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/fs/read_file")
            .with_status(404)
            .with_body("{\"detail\": \"ENOENT\"}")
            .create_async()
            .await;

        let err = client_for(&server).read_file("/missing").await.unwrap_err();
        match err {
            Error::ProxyError { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("ENOENT"));
            }
            other => panic!("expected ProxyError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_proxy() {
        // Port 1 on loopback refuses connections.
        let client = SandboxClient::new(Some("http://127.0.0.1:1".into()), Duration::from_secs(2));
        let err = client.list_directory("/").await.unwrap_err();
        assert!(matches!(err, Error::ProxyUnreachable(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_client() {
        let client = SandboxClient::new(None, Duration::from_secs(2));
        assert!(!client.is_configured());
        let err = client.run_command("ls").await.unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(_)));
    }

    #[tokio::test]
    async fn test_move_without_destination_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client_for(&server).move_item("/a", "").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        mock.assert_async().await;
    }
}
