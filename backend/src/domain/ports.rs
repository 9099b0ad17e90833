//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters:
//! the persistent record store, the snapshot cache, and the event fan-out.
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::events::GameEvent;
use super::game::{GameRecord, GameRecordId, Score};
use super::user::{EmployeeNumber, User, UserId, Username};

/// Errors surfaced by [`RecordStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordStoreError {
    /// Store connectivity failures (pool exhaustion, closed connections).
    #[error("record store connection failed: {message}")]
    Connection { message: String },
    /// Query execution or row decoding failures.
    #[error("record store query failed: {message}")]
    Query { message: String },
}

impl RecordStoreError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A user's denormalised aggregates after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserTotals {
    /// Maximum score over the user's records.
    pub high_score: i32,
    /// Count of the user's records.
    pub total_games: i32,
}

/// Leaderboard entry: a user joined with the date their high score was set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedUser {
    /// Employee number, if captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
    /// Display name.
    pub username: String,
    /// Denormalised high score.
    pub high_score: i32,
    /// Denormalised game count.
    pub total_games: i32,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When the high score was most recently achieved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_score_date: Option<DateTime<Utc>>,
}

/// Game record joined with the owning player's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGameRecord {
    /// The immutable record.
    #[serde(flatten)]
    pub record: GameRecord,
    /// Owning player's employee number, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
    /// Owning player's display name.
    pub username: String,
}

/// Aggregate statistics snapshot across all users and records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    /// Registered user count.
    pub total_users: i64,
    /// Stored game record count.
    pub total_games: i64,
    /// Maximum high score across users.
    pub high_score: i32,
    /// Records played since midnight (store-local day).
    pub today_games: i64,
    /// Mean duration in whole seconds over positive durations.
    pub avg_game_time: i64,
}

/// Record store contract covering users and game records.
///
/// Every operation is atomic at the single-statement level. The scoreboard
/// service sequences recompute-then-write steps; aggregate updates that must
/// not race (`high_score`, `total_games`) are expressed as conditional
/// single-statement updates inside the adapter, never read-then-write.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, RecordStoreError>;

    /// Resolve a login identity.
    ///
    /// With an employee number both fields must match one record; without
    /// one the lookup falls back to username alone.
    async fn find_user_by_identity(
        &self,
        username: &Username,
        employee_number: Option<&EmployeeNumber>,
    ) -> Result<Option<User>, RecordStoreError>;

    /// Insert a freshly created user.
    async fn insert_user(&self, user: &User) -> Result<(), RecordStoreError>;

    /// Update a returning user's display name and last-login timestamp.
    async fn record_login(
        &self,
        id: &UserId,
        username: &Username,
        at: DateTime<Utc>,
    ) -> Result<(), RecordStoreError>;

    /// Delete a user and all their game records. Returns whether the user
    /// existed.
    async fn delete_user(&self, id: &UserId) -> Result<bool, RecordStoreError>;

    /// Persist an immutable game record.
    async fn insert_game(&self, record: &GameRecord) -> Result<(), RecordStoreError>;

    /// Fold one score into the owning user's aggregates atomically
    /// (`high_score = GREATEST(high_score, score)`, `total_games + 1`) and
    /// return the resulting totals.
    async fn apply_game_to_user(
        &self,
        user_id: &UserId,
        score: Score,
    ) -> Result<UserTotals, RecordStoreError>;

    /// Fetch a game record by identifier.
    async fn find_game(
        &self,
        id: &GameRecordId,
    ) -> Result<Option<GameRecord>, RecordStoreError>;

    /// Delete one game record. Returns whether it existed.
    async fn delete_game(&self, id: &GameRecordId) -> Result<bool, RecordStoreError>;

    /// Delete every game record.
    async fn delete_all_games(&self) -> Result<(), RecordStoreError>;

    /// Recompute a user's aggregates from their remaining records in one
    /// statement and return the fresh totals.
    async fn recompute_user_stats(
        &self,
        user_id: &UserId,
    ) -> Result<UserTotals, RecordStoreError>;

    /// Zero every user's aggregates.
    async fn reset_all_user_stats(&self) -> Result<(), RecordStoreError>;

    /// Zero every user's high score, leaving game counts intact.
    async fn reset_high_scores(&self) -> Result<(), RecordStoreError>;

    /// All users ordered by high score descending.
    async fn list_users_by_high_score(&self) -> Result<Vec<User>, RecordStoreError>;

    /// Recent game records joined with player identity, newest first,
    /// optionally filtered to one user.
    async fn list_games(
        &self,
        user_id: Option<&UserId>,
        limit: i64,
    ) -> Result<Vec<PlayerGameRecord>, RecordStoreError>;

    /// Top users by high score with the date each high score was set.
    /// Users with a zero high score are excluded.
    async fn top_users(&self, limit: i64) -> Result<Vec<RankedUser>, RecordStoreError>;

    /// Top individual game records by score, ties broken by recency.
    async fn top_games(&self, limit: i64) -> Result<Vec<PlayerGameRecord>, RecordStoreError>;

    /// Aggregate statistics snapshot.
    async fn global_stats(&self) -> Result<GlobalStats, RecordStoreError>;
}

/// Logical cache key classes for expensive aggregate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Per-user-best leaderboard snapshots.
    Rankings,
    /// Global statistics snapshot.
    Stats,
    /// Full user listing ordered by high score.
    Users,
}

/// TTL-bounded snapshot cache in front of aggregate reads.
///
/// Values are JSON snapshots; a `get` past the key's TTL behaves as absent.
/// Implementations guard mutation with mutual exclusion; last-writer-wins
/// is acceptable because every value is re-derivable from the record store.
pub trait SnapshotCache: Send + Sync {
    /// Fetch a snapshot if present and within its TTL.
    fn get(&self, key: CacheKey) -> Option<serde_json::Value>;

    /// Store a snapshot, stamping it with the current time.
    fn put(&self, key: CacheKey, value: serde_json::Value);

    /// Drop one key's snapshot.
    fn invalidate(&self, key: CacheKey);

    /// Drop every snapshot.
    fn invalidate_all(&self);
}

/// Fire-and-forget event fan-out towards admin observers.
///
/// `publish` must never block or fail the caller; delivery is best-effort
/// and events sent with no observers connected are dropped.
pub trait GameEventPublisher: Send + Sync {
    /// Publish an event to currently subscribed observers.
    fn publish(&self, event: GameEvent);
}
