//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → table.rs (ordered route lookup)
//!     → matcher.rs (segment-wise prefix match + strip)
//!     → Return: matched RouteEntry and remaining path, or None
//!
//! Before dispatch:
//!     → transform.rs (route's RequestTransform edits the OutgoingRequest)
//!
//! Route Compilation (at startup):
//!     RouteConfig[] + Secrets
//!     → Resolve transform secrets
//!     → Derive TLS validation per route from the environment
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (configuration order)

pub mod matcher;
pub mod table;
pub mod transform;

pub use matcher::PathPrefixMatcher;
pub use table::{RouteEntry, RouteTable};
pub use transform::{OutgoingRequest, RequestTransform};
