//! Outgoing request transforms.
//!
//! # Responsibilities
//! - Hold the editable view of a request about to leave the gateway
//! - Apply a route's transform to it before dispatch
//!
//! # Design Decisions
//! - Transforms are synchronous and side-effect only
//! - Transforms see the outgoing request, never the response
//! - Secret values are resolved at startup, not per request

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::form_urlencoded;

use crate::config::Secret;

/// The outgoing request as seen by a transform.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    /// Path relative to the upstream target, after prefix stripping. Empty
    /// means the target path itself; a missing leading `/` is added.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl OutgoingRequest {
    pub fn new(method: Method, path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: query.filter(|q| !q.is_empty()),
            headers: HeaderMap::new(),
        }
    }

    /// Append `name=value` after any existing query parameters.
    pub fn append_query_param(&mut self, name: &str, value: &str) {
        let pair = form_urlencoded::Serializer::new(String::new())
            .append_pair(name, value)
            .finish();
        self.query = Some(match self.query.take() {
            Some(existing) => format!("{}&{}", existing, pair),
            None => pair,
        });
    }
}

/// Caller-supplied transform.
pub type TransformFn = dyn Fn(&mut OutgoingRequest) + Send + Sync;

/// Per-route request transform.
#[derive(Clone, Default)]
pub enum RequestTransform {
    /// Forward the request unmodified (apart from prefix stripping).
    #[default]
    None,

    /// Append `name=<value>` to the query string. `key` names the setting the
    /// value came from.
    AppendQueryParam {
        name: String,
        key: String,
        value: Secret,
    },

    /// Set header `name` to `<value>`.
    SetHeader {
        name: HeaderName,
        key: String,
        value: Secret,
    },

    /// Arbitrary transform.
    Custom(Arc<TransformFn>),
}

impl RequestTransform {
    /// Wrap a closure as a transform.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut OutgoingRequest) + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Apply the transform to the outgoing request.
    pub fn apply(&self, req: &mut OutgoingRequest) {
        match self {
            Self::None => {}
            Self::AppendQueryParam { name, value, .. } => {
                req.append_query_param(name, value.expose());
            }
            Self::SetHeader { name, value, key } => match HeaderValue::from_str(value.expose()) {
                Ok(mut header) => {
                    header.set_sensitive(true);
                    req.headers.insert(name.clone(), header);
                }
                Err(_) => {
                    tracing::warn!(header = %name, key = %key, "Secret is not a valid header value, header not set");
                }
            },
            Self::Custom(f) => f(req),
        }
    }
}

impl fmt::Debug for RequestTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::AppendQueryParam { name, key, .. } => f
                .debug_struct("AppendQueryParam")
                .field("name", name)
                .field("key", key)
                .finish_non_exhaustive(),
            Self::SetHeader { name, key, .. } => f
                .debug_struct("SetHeader")
                .field("name", name)
                .field("key", key)
                .finish_non_exhaustive(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
