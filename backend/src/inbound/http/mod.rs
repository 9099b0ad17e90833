//! HTTP inbound adapter exposing the REST surface under `/api`.

pub mod error;
pub mod games;
pub mod rankings;
pub mod state;
pub mod stats;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;

use serde::Serialize;
use utoipa::ToSchema;

pub use error::ApiResult;

/// Acknowledgement body returned by destructive endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    /// Always true on success responses.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

impl AckResponse {
    /// Build a success acknowledgement.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
