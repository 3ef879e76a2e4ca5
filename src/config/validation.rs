//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate route prefixes and upstream targets
//! - Detect conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("route prefix `{0}` must start with `/`, must not end with `/` and must not be `/`")]
    Prefix(String),

    #[error("duplicate route prefix `{0}`")]
    DuplicatePrefix(String),

    #[error("route prefix `{prefix}` overlaps the local API mount `{mount}`")]
    ShadowsLocalApi { prefix: String, mount: String },

    #[error("route `{prefix}` has invalid target `{target}`: {reason}")]
    Target {
        prefix: String,
        target: String,
        reason: String,
    },

    #[error("local API prefix `{0}` must start with `/` and must not end with `/`")]
    LocalApiPrefix(String),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),
}

/// Check that a prefix is a non-root absolute path without a trailing slash.
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() > 1 && prefix.starts_with('/') && !prefix.ends_with('/')
}

/// Parse and check an upstream target URL.
pub fn parse_target(target: &str) -> Result<Url, String> {
    let url = Url::parse(target).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme `{}`", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(url)
}

/// True when one path is the other or a segment-wise ancestor of it.
pub(crate) fn segments_overlap(a: &str, b: &str) -> bool {
    let under = |path: &str, base: &str| {
        path == base || path.strip_prefix(base).is_some_and(|rest| rest.starts_with('/'))
    };
    under(a, b) || under(b, a)
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mount = config.local_api.prefix.as_str();
    let mount_ok = is_valid_prefix(mount);
    if !mount_ok {
        errors.push(ValidationError::LocalApiPrefix(mount.to_string()));
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !is_valid_prefix(&route.prefix) {
            errors.push(ValidationError::Prefix(route.prefix.clone()));
        } else if !seen.insert(route.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(route.prefix.clone()));
        } else if mount_ok && segments_overlap(&route.prefix, mount) {
            errors.push(ValidationError::ShadowsLocalApi {
                prefix: route.prefix.clone(),
                mount: mount.to_string(),
            });
        }

        if let Err(reason) = parse_target(&route.target) {
            errors.push(ValidationError::Target {
                prefix: route.prefix.clone(),
                target: route.target.clone(),
                reason,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
