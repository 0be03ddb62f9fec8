//! Router assembly

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{cors_layer, request_logging_middleware};
use crate::state::AppState;

/// Create the complete router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_origins.as_deref());

    let fs_routes = Router::new()
        .route("/write_file", post(handlers::fs::write_file_handler))
        .route("/read_file", post(handlers::fs::read_file_handler))
        .route("/list_directory", post(handlers::fs::list_directory_handler))
        .route("/create_directory", post(handlers::fs::create_directory_handler))
        .route("/move_item", post(handlers::fs::move_item_handler))
        .route("/delete_item", post(handlers::fs::delete_item_handler));

    Router::new()
        .route("/", get(handlers::health::root_handler))
        .route("/health", get(handlers::health::health_handler))
        .route("/tools", get(handlers::tools::list_tools_handler))
        .route("/execute_command", post(handlers::command::execute_command_handler))
        .route("/chat", post(handlers::chat::chat_handler))
        .nest("/fs", fs_routes)
        .with_state(state)
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use mockito::Matcher;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use vmgate_core::GatewayConfig;
    use vmgate_llm::{
        BoxedProvider, ChatMessage, ChatRequest, ChatResponse, LlmProvider, ProviderFactory,
        ToolCallInfo,
    };

    /// Provider that either fails or returns fixed text and tool calls
    #[derive(Clone)]
    struct FakeProvider {
        fail: bool,
        content: String,
        calls: Vec<(String, Value)>,
    }

    impl ProviderFactory for FakeProvider {
        fn connect(&self, _api_key: &str) -> BoxedProvider {
            Box::new(self.clone())
        }
    }

    #[async_trait]
    impl LlmProvider for FakeProvider {
        fn provider_name(&self) -> &str {
            "fake"
        }

        async fn chat_with_request(&self, model: &str, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
            if self.fail {
                anyhow::bail!("Mistral API error 503: overloaded");
            }
            Ok(ChatResponse {
                message: ChatMessage::assistant(self.content.clone()),
                model: model.to_string(),
                provider: "fake".to_string(),
                finish_reason: Some("stop".to_string()),
                usage: None,
                tool_calls: self
                    .calls
                    .iter()
                    .map(|(name, args)| ToolCallInfo {
                        id: "call_0".to_string(),
                        name: name.clone(),
                        arguments: args.clone(),
                    })
                    .collect(),
            })
        }
    }

    fn answering(content: &str) -> FakeProvider {
        FakeProvider {
            fail: false,
            content: content.to_string(),
            calls: vec![],
        }
    }

    fn app(proxy_url: Option<String>, provider: FakeProvider) -> Router {
        let config = GatewayConfig {
            proxy_base_url: proxy_url,
            ..GatewayConfig::default()
        };
        let state = AppState::with_provider_factory(config, Arc::new(provider)).unwrap();
        create_router(Arc::new(state))
    }

    fn offline_app() -> Router {
        app(Some("http://127.0.0.1:9".to_string()), answering("hello"))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(offline_app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("running"));
    }

    #[tokio::test]
    async fn test_health_and_tool_listing() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(None, answering("x")), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["proxy_configured"], false);

        let request = Request::builder().uri("/tools").body(Body::empty()).unwrap();
        let (_, body) = send(offline_app(), request).await;
        assert_eq!(body["count"], 7);
        assert_eq!(body["tools"][0]["name"], "execute_command");
    }

    #[tokio::test]
    async fn test_move_without_new_path_is_rejected_before_proxy() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (status, body) = send(
            app(Some(server.url()), answering("x")),
            post_json("/fs/move_item", json!({"path": "/a.txt"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "new_path is required for move_item.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_command_and_content_are_rejected() {
        let (status, body) = send(offline_app(), post_json("/execute_command", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Command not provided.");

        let (status, _) = send(offline_app(), post_json("/fs/write_file", json!({"path": "/a"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_directory_synthesizes_rm_rf() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/execute_command")
            .match_body(Matcher::Json(json!({"command": "rm -rf /tmp/build"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result": ""}"#)
            .create_async()
            .await;

        let (status, body) = send(
            app(Some(server.url()), answering("x")),
            post_json("/fs/delete_item", json!({"path": "/tmp/build", "is_dir": true})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"result": ""}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_file_defaults_to_rm_f() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/execute_command")
            .match_body(Matcher::Json(json!({"command": "rm -f /a"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result": ""}"#)
            .create_async()
            .await;

        let (status, _) = send(
            app(Some(server.url()), answering("x")),
            post_json("/fs/delete_item", json!({"path": "/a"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_detail() {
        let response = offline_app()
            .oneshot(post_json("/fs/read_file", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].as_str().unwrap().contains("path"));

        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(offline_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_proxy_status_is_propagated() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/fs/read_file")
            .with_status(404)
            .with_body(r#"{"detail":"File not found"}"#)
            .create_async()
            .await;

        let (status, body) = send(
            app(Some(server.url()), answering("x")),
            post_json("/fs/read_file", json!({"path": "/missing"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().unwrap().contains("File not found"));
    }

    #[tokio::test]
    async fn test_unconfigured_proxy_is_a_server_error() {
        let (status, body) = send(
            app(None, answering("x")),
            post_json("/fs/list_directory", json!({"path": "/"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("SANDBOX_PROXY_URL"));
    }

    #[tokio::test]
    async fn test_chat_without_credential_is_unauthorized() {
        let (status, body) = send(offline_app(), post_json("/chat", json!({"message": "hi"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["detail"].as_str().unwrap().contains("X-Mistral-API-Key"));
    }

    #[tokio::test]
    async fn test_chat_llm_failure_is_a_normal_reply() {
        let provider = FakeProvider {
            fail: true,
            content: String::new(),
            calls: vec![],
        };
        let mut request = post_json("/chat", json!({"message": "hi", "mode": "cua"}));
        request
            .headers_mut()
            .insert("X-Mistral-API-Key", "test-key".parse().unwrap());

        let (status, body) = send(app(Some("http://127.0.0.1:9".into()), provider), request).await;

        assert_eq!(status, StatusCode::OK);
        let text = body["response"].as_str().unwrap();
        assert!(text.starts_with("Sorry, there was an error:"));
        assert!(text.contains("overloaded"));
        assert_eq!(body["tools_used"], json!([]));
        assert_eq!(body["desktop_actions"], Value::Null);
        assert_eq!(body["thinking"], Value::Null);
    }

    #[tokio::test]
    async fn test_chat_reports_desktop_actions() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/execute_command")
            .match_body(Matcher::Json(json!({"command": "mkdir -p /work"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result": "ok"}"#)
            .create_async()
            .await;

        let provider = FakeProvider {
            fail: false,
            content: String::new(),
            calls: vec![
                ("create_directory".to_string(), json!({"path": "/work"})),
                ("launch_rocket".to_string(), json!({})),
            ],
        };
        let mut request = post_json("/chat", json!({"message": "make a dir", "mode": "daytona"}));
        request
            .headers_mut()
            .insert("X-Mistral-API-Key", "test-key".parse().unwrap());

        let (status, body) = send(app(Some(server.url()), provider), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Action completed.");
        assert_eq!(
            body["tools_used"],
            json!([
                {"name": "create_directory", "args": {"path": "/work"}},
                {"name": "launch_rocket", "args": {}}
            ])
        );
        assert_eq!(
            body["desktop_actions"],
            json!([
                {"type": "create_directory", "args": {"path": "/work"}, "result": {"result": "ok"}},
                {"type": "launch_rocket", "args": {}, "error": "unknown tool: launch_rocket"}
            ])
        );
    }

    #[tokio::test]
    async fn test_chat_empty_message_is_bad_request() {
        let mut request = post_json("/chat", json!({"message": "  "}));
        request
            .headers_mut()
            .insert("X-Mistral-API-Key", "test-key".parse().unwrap());
        let (status, _) = send(offline_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_default_mode_is_plain_chat() {
        let mut request = post_json("/chat", json!({"message": "hello"}));
        request
            .headers_mut()
            .insert("X-Mistral-API-Key", "test-key".parse().unwrap());
        let (status, body) = send(offline_app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "hello");
        assert_eq!(body["desktop_actions"], Value::Null);
    }
}
