//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Execution environment (controls the TLS validation default).
    pub environment: Environment,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to upstream targets.
    pub routes: Vec<RouteConfig>,

    /// First-party API mounted inside the gateway.
    pub local_api: LocalApiConfig,

    /// Outbound client settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            listener: ListenerConfig::default(),
            routes: default_routes(),
            local_api: LocalApiConfig::default(),
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    /// Parse an environment name. Only `production` (any case) selects
    /// [`Environment::Production`].
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to an upstream target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path prefix to match (e.g., "/weather").
    pub prefix: String,

    /// Absolute URL of the upstream service.
    pub target: String,

    /// Override for TLS certificate validation.
    /// Unset means "validate in production only".
    #[serde(default)]
    pub secure: Option<bool>,

    /// Outgoing request transform.
    #[serde(default)]
    pub transform: Option<TransformConfig>,
}

impl RouteConfig {
    pub fn new(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            target: target.into(),
            secure: None,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// Declarative request transforms. Values are looked up by `secret` in the
/// process environment at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformConfig {
    /// Append `name=<secret>` to the outgoing query string.
    AppendQueryParam { name: String, secret: String },

    /// Set header `name: <secret>` on the outgoing request.
    SetHeader { name: String, secret: String },
}

impl TransformConfig {
    /// Name of the environment setting the transform reads.
    pub fn secret_key(&self) -> &str {
        match self {
            Self::AppendQueryParam { secret, .. } | Self::SetHeader { secret, .. } => secret,
        }
    }
}

/// Local API mount configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalApiConfig {
    /// Path prefix the local API is mounted at.
    pub prefix: String,
}

impl Default for LocalApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/v1".to_string(),
        }
    }
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total request timeout in seconds. Unset means no limit.
    pub request_timeout_secs: Option<u64>,

    /// Honor HTTP(S)_PROXY environment variables for upstream calls.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: None,
            use_system_proxy: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "api_gateway=debug,tower_http=debug".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,
    /// Enable permissive CORS.
    pub enable_cors: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            enable_cors: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Routes served when the config file defines none.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("/api1", "https://dog.ceo/api/breeds/image/random"),
        RouteConfig::new("/api2", "https://jsonplaceholder.typicode.com/posts"),
        RouteConfig::new("/weather", "https://api.openweathermap.org/data/2.5/weather")
            .with_transform(TransformConfig::AppendQueryParam {
                name: "appid".to_string(),
                secret: "API_KEY".to_string(),
            }),
    ]
}
