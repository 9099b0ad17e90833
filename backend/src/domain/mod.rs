//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed scoreboard model (users, game
//! records, events) plus the two services that drive it: identity
//! resolution and the scoreboard itself. Ports describe what the domain
//! expects from persistence, caching, and event fan-out; adapters live
//! under `inbound/` and `outbound/`.

pub mod error;
pub mod events;
pub mod game;
pub mod identity;
pub mod ports;
pub mod scoreboard;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::error::{Error, ErrorCode};
pub use self::events::{GameCompletedEvent, GameEvent, StatsUpdatedEvent};
pub use self::game::{GameRecord, GameRecordId, GameSubmission, GameValidationError, Score};
pub use self::identity::IdentityService;
pub use self::ports::{
    CacheKey, GameEventPublisher, GlobalStats, PlayerGameRecord, RankedUser, RecordStore,
    RecordStoreError, SnapshotCache, UserTotals,
};
pub use self::scoreboard::{GameOutcome, ScoreboardService};
pub use self::user::{EmployeeNumber, User, UserId, UserValidationError, Username};
