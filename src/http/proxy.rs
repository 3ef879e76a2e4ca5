//! Gateway request handlers.
//!
//! # Responsibilities
//! - Serve the root informational message
//! - Dispatch requests to the route table
//! - Apply the route's transform and forward upstream
//! - Answer unmatched paths with a structured 404

use std::net::SocketAddr;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, OriginalUri, State};
use axum::http::{header, HeaderMap, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::MessageResponse;
use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::OutgoingRequest;
use crate::security::headers::upstream_headers;

/// `GET /`
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("API location: api/v1"))
}

/// Fallback for anything nothing else claims.
pub async fn not_found_handler(OriginalUri(uri): OriginalUri) -> GatewayError {
    tracing::debug!(path = %uri.path(), "No handler matched");
    GatewayError::not_found(uri.path())
}

/// True when the client announced a request body.
fn has_body(headers: &HeaderMap) -> bool {
    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    match declared_length {
        Some(len) => len > 0,
        None => headers.contains_key(header::TRANSFER_ENCODING),
    }
}

/// Main proxy handler.
/// Looks up route, applies transform, and forwards request.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();
    let request_id = request_id(&parts.headers);

    // 1. Match Route
    let Some((entry, rest)) = state.routes.find(path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request(parts.method.as_str(), 404, "none", start_time);
        return GatewayError::not_found(path).into_response();
    };

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %path,
        prefix = %entry.prefix(),
        "Proxying request"
    );

    // 2. Build the outgoing request and let the route edit it
    let client = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let mut outgoing = OutgoingRequest::new(
        parts.method.clone(),
        rest,
        parts.uri.query().map(str::to_string),
    );
    outgoing.headers = upstream_headers(&parts.headers, client);
    entry.transform().apply(&mut outgoing);

    // 3. Forward
    let body = has_body(&parts.headers).then_some(body);
    let response = match state.forwarder.forward(entry, outgoing, body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(
        parts.method.as_str(),
        response.status().as_u16(),
        entry.prefix(),
        start_time,
    );
    tracing::debug!(
        request_id = %request_id,
        status = %response.status(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Upstream responded"
    );

    response
}
