//! Configuration-driven HTTP API gateway library.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteEntry, RouteTable, RequestTransform};
