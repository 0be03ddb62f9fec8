//! vmgate-web: HTTP surface of the gateway
//!
//! - `GET /`, `GET /health`, `GET /tools`
//! - `POST /execute_command` and `POST /fs/*`, forwarded to the sandbox proxy
//! - `POST /chat`, one stateless LLM turn with optional tool calls

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
