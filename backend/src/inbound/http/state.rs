//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain services and remain testable without I/O.

use crate::domain::{IdentityService, ScoreboardService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: IdentityService,
    pub scoreboard: ScoreboardService,
}

impl HttpState {
    /// Construct state from the domain services.
    pub fn new(identity: IdentityService, scoreboard: ScoreboardService) -> Self {
        Self {
            identity,
            scoreboard,
        }
    }
}
