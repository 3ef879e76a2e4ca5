//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → secrets.rs (credentials read from the environment)
//!     → RouteTable built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no runtime reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod secrets;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    Environment, GatewayConfig, ListenerConfig, LocalApiConfig, RouteConfig, TransformConfig,
};
pub use secrets::{Secret, Secrets};
