//! User identity and aggregate data model.
//!
//! `high_score` and `total_games` are denormalised aggregates over the
//! user's game records; the persistence adapter keeps them consistent via
//! atomic conditional updates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised by the identity newtypes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username is empty after trimming whitespace.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username falls outside the allowed length range.
    #[error("username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    /// Username contains characters outside letters, digits, and spaces.
    #[error("username may only contain letters, digits, and spaces")]
    UsernameInvalidCharacters,
    /// Employee number falls outside the allowed length range.
    #[error("employee number must be between {min} and {max} characters")]
    EmployeeNumberLength { min: usize, max: usize },
    /// Employee number contains non-alphanumeric characters.
    #[error("employee number may only contain letters and digits")]
    EmployeeNumberInvalidCharacters,
}

/// Minimum username length in characters.
pub const USERNAME_MIN: usize = 2;
/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 20;
/// Minimum employee number length.
pub const EMPLOYEE_NUMBER_MIN: usize = 4;
/// Maximum employee number length.
pub const EMPLOYEE_NUMBER_MAX: usize = 10;

/// Stable user identifier stored as a UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name chosen at login.
///
/// Trimmed, 2 to 20 characters, restricted to unicode letters, digits, and
/// whitespace so non-Latin scripts remain valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`], trimming surrounding whitespace.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || c.is_whitespace())
        {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional employee number supplied at login.
///
/// Trimmed, 4 to 10 ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeNumber(String);

impl EmployeeNumber {
    /// Validate and construct an [`EmployeeNumber`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = value.as_ref().trim();
        if !(EMPLOYEE_NUMBER_MIN..=EMPLOYEE_NUMBER_MAX).contains(&trimmed.len()) {
            return Err(UserValidationError::EmployeeNumberLength {
                min: EMPLOYEE_NUMBER_MIN,
                max: EMPLOYEE_NUMBER_MAX,
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UserValidationError::EmployeeNumberInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse an optional raw value, treating blank input as absent.
    pub fn from_optional(
        value: Option<&str>,
    ) -> Result<Option<Self>, UserValidationError> {
        match value {
            Some(raw) if !raw.trim().is_empty() => Self::new(raw).map(Some),
            _ => Ok(None),
        }
    }
}

impl AsRef<str> for EmployeeNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmployeeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmployeeNumber> for String {
    fn from(value: EmployeeNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmployeeNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user with denormalised scoreboard aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub user_id: UserId,
    /// Optional employee number captured at first login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<EmployeeNumber>,
    /// Display name; mutable across logins.
    pub username: Username,
    /// Maximum score over the user's game records.
    pub high_score: i32,
    /// Count of the user's game records.
    pub total_games: i32,
    /// Immutable creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated on every login.
    pub last_login: DateTime<Utc>,
}

impl User {
    /// Create a fresh user record at the given instant with zeroed stats.
    pub fn new(
        username: Username,
        employee_number: Option<EmployeeNumber>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::random(),
            employee_number,
            username,
            high_score: 0,
            total_games: 0,
            created_at: now,
            last_login: now,
        }
    }
}
