//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware chain)
//!     → request.rs (request ID)
//!     → proxy.rs (root, local API mount, or route table dispatch)
//!     → forward.rs (transformed request to upstream)
//!     → response.rs (relay upstream response)
//!     → Send to client
//! ```

pub mod forward;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{build_app, AppState, HttpServer};
