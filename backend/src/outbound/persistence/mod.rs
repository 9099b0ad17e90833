//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Implements the record-store port with `diesel-async` over a `bb8`
//! connection pool. Diesel row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay internal to this module; the domain only ever sees
//! validated domain types and [`RecordStoreError`] variants.
//!
//! [`RecordStoreError`]: crate::domain::ports::RecordStoreError

mod diesel_record_store;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_record_store::DieselRecordStore;
pub use pool::{DbPool, PoolConfig, PoolError};
