//! Shared middleware: CORS and request logging

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// CORS layer for the configured origins; `None` allows any origin.
pub fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origins {
        Some(origins) => {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", o);
                        None
                    }
                })
                .collect();
            layer.allow_origin(parsed)
        }
        None => layer.allow_origin(Any),
    }
}

/// Logs `method uri status duration` at a level chosen by status class
pub async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let millis = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!("{} {} {} - {}ms", method, uri, status.as_u16(), millis);
    } else if status.is_client_error() {
        tracing::warn!("{} {} {} - {}ms", method, uri, status.as_u16(), millis);
    } else {
        tracing::info!("{} {} {} - {}ms", method, uri, status.as_u16(), millis);
    }

    response
}
