//! First-party API served by the gateway itself.
//!
//! Mounted under `local_api.prefix`; requests here never reach the route table.

use axum::extract::OriginalUri;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// `{"message": ...}` body used by the informational endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type EmojiResponse = Vec<&'static str>;

/// Router for the local API, relative to its mount point.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index).fallback(not_found))
        .route("/emojis", get(emojis).fallback(not_found))
        .fallback(not_found)
}

async fn index() -> Json<MessageResponse> {
    Json(MessageResponse::new("API - 👋🌎🌍🌏"))
}

async fn emojis() -> Json<EmojiResponse> {
    Json(vec!["😀", "😳", "🙄"])
}

async fn not_found(OriginalUri(uri): OriginalUri) -> GatewayError {
    GatewayError::not_found(uri.path())
}
