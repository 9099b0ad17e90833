//! Identity resolution for login requests.
//!
//! Resolves a validated `(username, employee number?)` pair to an existing
//! user or creates a fresh one. The canonical policy matches on the exact
//! employee-number/username pair when a number is supplied and falls back
//! to username-only lookup only when it is absent.

use std::sync::Arc;

use mockable::Clock;

use super::error::Error;
use super::ports::{RecordStore, RecordStoreError};
use super::user::{EmployeeNumber, User, Username};

/// Resolves login requests against the record store.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

pub(crate) fn map_store_error(error: RecordStoreError) -> Error {
    match error {
        RecordStoreError::Connection { message } => Error::service_unavailable(message),
        RecordStoreError::Query { message } => Error::internal(message),
    }
}

impl IdentityService {
    /// Create a new resolver over the given store and clock.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Resolve raw login fields to a user, creating one if necessary.
    ///
    /// A returning user's display name and last-login timestamp are
    /// refreshed; aggregates are left untouched. Validation failures are
    /// reported as [`Error::invalid_request`] with the offending field in
    /// the details.
    pub async fn resolve(
        &self,
        username: &str,
        employee_number: Option<&str>,
    ) -> Result<User, Error> {
        let username = Username::new(username).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(serde_json::json!({ "field": "username" }))
        })?;
        let employee_number = EmployeeNumber::from_optional(employee_number).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(serde_json::json!({ "field": "employeeNumber" }))
        })?;

        let existing = self
            .store
            .find_user_by_identity(&username, employee_number.as_ref())
            .await
            .map_err(map_store_error)?;

        let now = self.clock.utc();
        match existing {
            Some(mut user) => {
                self.store
                    .record_login(&user.user_id, &username, now)
                    .await
                    .map_err(map_store_error)?;
                user.username = username;
                user.last_login = now;
                Ok(user)
            }
            None => {
                let user = User::new(username, employee_number, now);
                self.store
                    .insert_user(&user)
                    .await
                    .map_err(map_store_error)?;
                Ok(user)
            }
        }
    }
}
