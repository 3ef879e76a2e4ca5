//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the client
//! - Remove hop-by-hop headers
//! - Render panics as structured errors
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Upstream status and body are relayed unmodified
//! - Panic payloads are logged, never returned

use std::any::Any;

use axum::body::Body;
use axum::response::{IntoResponse, Response};

use crate::error::GatewayError;
use crate::security::headers::strip_hop_by_hop;

/// Convert an upstream response into a client response.
pub fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Terminal handler for panics caught anywhere in the handler stack.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Request handler panicked");

    GatewayError::Internal("unexpected failure while handling the request".to_string())
        .into_response()
}
