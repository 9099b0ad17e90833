//! Mapping from pool and Diesel failures to record-store errors.

use tracing::debug;

use crate::domain::ports::RecordStoreError;

use super::pool::PoolError;

/// Fold a pool failure into a store-level connection error.
pub(super) fn map_pool_error(error: PoolError) -> RecordStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    RecordStoreError::connection(message)
}

/// Fold a Diesel failure into a store-level error.
///
/// Connection-loss failures map to `Connection`; everything else,
/// including constraint violations, maps to `Query`. Driver detail is
/// logged at debug level and kept out of the returned message.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> RecordStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RecordStoreError::connection("database connection error")
        }
        DieselError::NotFound => RecordStoreError::query("record not found"),
        _ => RecordStoreError::query("database error"),
    }
}
