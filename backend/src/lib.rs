//! Score-tracking game backend.
//!
//! Hexagonal layout: pure domain services in [`domain`], transport
//! adapters in [`inbound`], and persistence, caching, and event fan-out
//! adapters in [`outbound`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
