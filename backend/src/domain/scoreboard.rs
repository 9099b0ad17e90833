//! Leaderboard, statistics, and game-record lifecycle service.
//!
//! Owns the read models (per-user-best leaderboard, full-record
//! leaderboard, global statistics) and the cache discipline around them:
//! every mutating operation invalidates the cache keys it can affect before
//! returning, so staleness is bounded by the shorter of the TTL and the
//! time since the last write.

use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::Error;
use super::events::{GameCompletedEvent, GameEvent, StatsUpdatedEvent};
use super::game::{GameRecord, GameRecordId, GameSubmission};
use super::identity::map_store_error;
use super::ports::{
    CacheKey, GameEventPublisher, GlobalStats, PlayerGameRecord, RankedUser, RecordStore,
    SnapshotCache,
};
use super::user::{User, UserId};

/// Smallest accepted read limit.
pub const LIMIT_MIN: i64 = 1;
/// Largest accepted read limit.
pub const LIMIT_MAX: i64 = 100;

/// Outcome of persisting a game result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    /// Identifier of the stored record.
    pub game_id: GameRecordId,
    /// Whether the score strictly exceeded the user's previous high score.
    pub is_new_high_score: bool,
}

/// Rankings snapshot cached together with the limit it was computed for.
#[derive(Debug, Serialize, Deserialize)]
struct CachedRankings {
    limit: i64,
    entries: Vec<RankedUser>,
}

/// Scoreboard service: ranking and statistics reads plus the game-record
/// write path.
#[derive(Clone)]
pub struct ScoreboardService {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn SnapshotCache>,
    publisher: Arc<dyn GameEventPublisher>,
    clock: Arc<dyn Clock>,
}

fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(LIMIT_MIN, LIMIT_MAX)
}

impl ScoreboardService {
    /// Create a new service over the given ports.
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn SnapshotCache>,
        publisher: Arc<dyn GameEventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cache,
            publisher,
            clock,
        }
    }

    /// Persist a validated game result and refresh the owner's aggregates.
    ///
    /// The aggregate update is a single conditional statement in the store,
    /// so concurrent submissions for one user cannot lose counts. Events
    /// are published after the write; observer failures never surface here.
    pub async fn record_game(&self, submission: GameSubmission) -> Result<GameOutcome, Error> {
        let user = self
            .store
            .find_user(&submission.user_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let previous_high_score = user.high_score;

        let record = GameRecord::from_submission(&submission, self.clock.utc());
        self.store
            .insert_game(&record)
            .await
            .map_err(map_store_error)?;
        let totals = self
            .store
            .apply_game_to_user(&submission.user_id, submission.score)
            .await
            .map_err(map_store_error)?;

        self.invalidate_read_models();

        let is_new_high_score = submission.score.as_i32() > previous_high_score;
        self.publisher.publish(GameEvent::GameCompleted(GameCompletedEvent::new(
            &user,
            &record,
            is_new_high_score,
        )));
        self.publisher.publish(GameEvent::StatsUpdated(StatsUpdatedEvent {
            total_games: totals.total_games,
            user_high_score: totals.high_score,
        }));

        Ok(GameOutcome {
            game_id: record.game_id,
            is_new_high_score,
        })
    }

    /// Delete one game record and recompute the owner's aggregates from the
    /// remaining records.
    ///
    /// Recomputation from source is mandatory: the deleted record may have
    /// held the high score, so a decrement would leave it stale.
    pub async fn delete_game(&self, id: &GameRecordId) -> Result<(), Error> {
        let record = self
            .store
            .find_game(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("game record not found"))?;

        self.store.delete_game(id).await.map_err(map_store_error)?;
        self.store
            .recompute_user_stats(&record.user_id)
            .await
            .map_err(map_store_error)?;
        self.invalidate_read_models();
        Ok(())
    }

    /// Delete every game record and zero all user aggregates.
    pub async fn delete_all_games(&self) -> Result<(), Error> {
        self.store
            .delete_all_games()
            .await
            .map_err(map_store_error)?;
        self.store
            .reset_all_user_stats()
            .await
            .map_err(map_store_error)?;
        self.invalidate_read_models();
        Ok(())
    }

    /// Zero every user's high score, clearing the rankings.
    pub async fn reset_rankings(&self) -> Result<(), Error> {
        self.store
            .reset_high_scores()
            .await
            .map_err(map_store_error)?;
        self.invalidate_read_models();
        Ok(())
    }

    /// Delete a user and cascade to their game records.
    pub async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        let existed = self.store.delete_user(id).await.map_err(map_store_error)?;
        if !existed {
            return Err(Error::not_found("user not found"));
        }
        self.invalidate_read_models();
        Ok(())
    }

    /// All users ordered by high score descending. Cached.
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        if let Some(users) = self.cached(CacheKey::Users) {
            return Ok(users);
        }
        let users = self
            .store
            .list_users_by_high_score()
            .await
            .map_err(map_store_error)?;
        self.store_snapshot(CacheKey::Users, &users);
        Ok(users)
    }

    /// Top users by high score with tie-break on high-score date. Cached
    /// per limit: a hit is only served when the requested limit matches.
    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<RankedUser>, Error> {
        let limit = clamp_limit(limit, 10);
        if let Some(cached) = self.cached::<CachedRankings>(CacheKey::Rankings) {
            if cached.limit == limit {
                return Ok(cached.entries);
            }
        }
        let entries = self.store.top_users(limit).await.map_err(map_store_error)?;
        self.store_snapshot(CacheKey::Rankings, &CachedRankings {
            limit,
            entries: entries.clone(),
        });
        Ok(entries)
    }

    /// Top individual game records by score. Not cached.
    pub async fn all_time_leaderboard(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<PlayerGameRecord>, Error> {
        let limit = clamp_limit(limit, 50);
        self.store.top_games(limit).await.map_err(map_store_error)
    }

    /// Recent game records, optionally for one user. Not cached.
    pub async fn list_games(
        &self,
        user_id: Option<&UserId>,
        limit: Option<i64>,
    ) -> Result<Vec<PlayerGameRecord>, Error> {
        let limit = clamp_limit(limit, 50);
        self.store
            .list_games(user_id, limit)
            .await
            .map_err(map_store_error)
    }

    /// Global statistics snapshot. Cached.
    pub async fn global_stats(&self) -> Result<GlobalStats, Error> {
        if let Some(stats) = self.cached(CacheKey::Stats) {
            return Ok(stats);
        }
        let stats = self.store.global_stats().await.map_err(map_store_error)?;
        self.store_snapshot(CacheKey::Stats, &stats);
        Ok(stats)
    }

    fn invalidate_read_models(&self) {
        self.cache.invalidate(CacheKey::Rankings);
        self.cache.invalidate(CacheKey::Stats);
        self.cache.invalidate(CacheKey::Users);
    }

    fn cached<T: serde::de::DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(error) => {
                // A snapshot that no longer decodes is treated as a miss.
                warn!(error = %error, ?key, "dropping undecodable cache snapshot");
                self.cache.invalidate(key);
                None
            }
        }
    }

    fn store_snapshot<T: Serialize>(&self, key: CacheKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(snapshot) => self.cache.put(key, snapshot),
            Err(error) => warn!(error = %error, ?key, "failed to serialise cache snapshot"),
        }
    }
}

/// Cache that never stores anything; every read goes to the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSnapshotCache;

impl SnapshotCache for NoOpSnapshotCache {
    fn get(&self, _key: CacheKey) -> Option<serde_json::Value> {
        None
    }

    fn put(&self, _key: CacheKey, _value: serde_json::Value) {}

    fn invalidate(&self, _key: CacheKey) {}

    fn invalidate_all(&self) {}
}
