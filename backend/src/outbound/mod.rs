//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Concrete implementations of the domain's driven ports:
//!
//! - **persistence**: PostgreSQL-backed record store using Diesel ORM
//! - **cache**: in-process TTL cache for aggregate read models
//! - **broadcast**: broadcast-channel fan-out towards admin sessions
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod broadcast;
pub mod cache;
pub mod persistence;
