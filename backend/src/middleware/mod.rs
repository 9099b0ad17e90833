//! Actix middleware shared across the HTTP and WebSocket surfaces.

pub mod trace;

pub use trace::Trace;
