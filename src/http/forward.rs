//! Upstream forwarding.
//!
//! # Responsibilities
//! - Own the outbound HTTP clients
//! - Send the transformed request to the route's target
//! - Map transport failures to gateway errors
//!
//! # Design Decisions
//! - Two clients built at startup: one validating TLS certificates, one not
//! - Redirects are relayed to the caller, never followed
//! - No retries; the first failure is the answer
//! - Dropping the handler future aborts the upstream call

use std::time::Duration;

use axum::body::Body;
use axum::response::Response;
use reqwest::{redirect, Client, ClientBuilder};

use crate::config::schema::UpstreamConfig;
use crate::config::ConfigError;
use crate::error::GatewayError;
use crate::http::response::relay;
use crate::routing::{OutgoingRequest, RouteEntry};

/// Forwards requests to upstream targets.
#[derive(Debug, Clone)]
pub struct Forwarder {
    verified: Client,
    relaxed: Client,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        let verified = Self::builder(config).build()?;
        let relaxed = Self::builder(config)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { verified, relaxed })
    }

    fn builder(config: &UpstreamConfig) -> ClientBuilder {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(redirect::Policy::none());

        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        builder
    }

    fn client(&self, secure: bool) -> &Client {
        if secure {
            &self.verified
        } else {
            &self.relaxed
        }
    }

    /// Send `outgoing` to the entry's target and relay the response.
    pub async fn forward(
        &self,
        entry: &RouteEntry,
        outgoing: OutgoingRequest,
        body: Option<Body>,
    ) -> Result<Response, GatewayError> {
        let url = entry.upstream_url(&outgoing.path, outgoing.query.as_deref());

        let mut request = self
            .client(entry.secure_upstream())
            .request(outgoing.method, url)
            .headers(outgoing.headers);
        if let Some(body) = body {
            request = request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        match request.send().await {
            Ok(upstream) => Ok(relay(upstream)),
            Err(e) => {
                let e = e.without_url();
                tracing::warn!(
                    prefix = %entry.prefix(),
                    target_host = entry.target().host_str().unwrap_or_default(),
                    error = %e,
                    "Upstream request failed"
                );
                Err(GatewayError::from(e))
            }
        }
    }
}
