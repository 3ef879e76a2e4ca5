//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → body limit (tower-http, configured in http::server)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!     → Pass to upstream
//!
//! Outgoing response:
//!     → headers.rs (strip hop-by-hop, add security headers)
//! ```
//!
//! # Design Decisions
//! - No trust in client input: connection-level headers never cross the gateway
//! - Security headers are additive; upstream values win

pub mod headers;
