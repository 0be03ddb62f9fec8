//! HTTP error mapping
//!
//! Every failing endpoint answers with `{"detail": "<message>"}`, including
//! request bodies that fail to parse.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, warn};
use vmgate_core::Error;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// `Json` extractor whose rejections use the `{"detail"}` body
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::MissingCredential => StatusCode::UNAUTHORIZED,
        Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Error::ProxyError { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Error::invalid_argument(msg).into()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self {
            status: status_for(&err),
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed ({}): {}", self.status.as_u16(), self.detail);
        } else {
            warn!("Request rejected ({}): {}", self.status.as_u16(), self.detail);
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
