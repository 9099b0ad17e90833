//! Shared test doubles for the domain services.
//!
//! [`InMemoryRecordStore`] is a faithful in-process rendition of the
//! [`RecordStore`] contract so service tests can exercise real sequencing
//! without a database. Failure injection covers the store-error paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use super::events::GameEvent;
use super::game::{GameRecord, GameRecordId, Score};
use super::ports::{
    CacheKey, GameEventPublisher, GlobalStats, PlayerGameRecord, RankedUser, RecordStore,
    RecordStoreError, SnapshotCache, UserTotals,
};
use super::user::{EmployeeNumber, User, UserId, Username};

/// Instant every fixture clock reports.
pub(crate) fn fixture_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0)
        .single()
        .expect("fixture timestamp is unambiguous")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock frozen at [`fixture_instant`].
pub(crate) fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_instant(),
    })
}

/// Clock whose instant tests can move forward to exercise TTL expiry.
pub(crate) struct MutableClock {
    now: Mutex<DateTime<Utc>>,
}

impl MutableClock {
    pub(crate) fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.lock_now();
        *now += by;
    }

    fn lock_now(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().expect("clock mutex poisoned")
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_now()
    }
}

#[derive(Default)]
struct StoreState {
    users: Vec<User>,
    games: Vec<GameRecord>,
    fail_next: Option<RecordStoreError>,
    last_top_users_limit: Option<i64>,
}

/// In-process [`RecordStore`] backed by plain vectors.
#[derive(Default)]
pub(crate) struct InMemoryRecordStore {
    state: Mutex<StoreState>,
}

impl InMemoryRecordStore {
    /// Seed a user directly, bypassing the identity service.
    pub(crate) fn add_user(
        &self,
        username: Username,
        employee_number: Option<EmployeeNumber>,
    ) -> UserId {
        let user = User::new(username, employee_number, fixture_instant());
        let id = user.user_id;
        self.lock().users.push(user);
        id
    }

    /// Snapshot a stored user.
    pub(crate) fn user(&self, id: &UserId) -> Option<User> {
        self.lock().users.iter().find(|u| u.user_id == *id).cloned()
    }

    /// Overwrite a user's aggregates directly.
    pub(crate) fn set_user_stats(&self, id: &UserId, high_score: i32, total_games: i32) {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.user_id == *id) {
            user.high_score = high_score;
            user.total_games = total_games;
        }
    }

    /// Make the next store operation fail with the given error.
    pub(crate) fn fail_next_with(&self, error: RecordStoreError) {
        self.lock().fail_next = Some(error);
    }

    /// Number of stored game records.
    pub(crate) fn game_count(&self) -> usize {
        self.lock().games.len()
    }

    /// Number of stored game records owned by one user.
    pub(crate) fn game_count_for(&self, id: &UserId) -> usize {
        self.lock()
            .games
            .iter()
            .filter(|g| g.user_id == *id)
            .count()
    }

    /// Limit passed to the most recent `top_users` call.
    pub(crate) fn last_top_users_limit(&self) -> Option<i64> {
        self.lock().last_top_users_limit
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }

    fn take_failure(&self) -> Result<(), RecordStoreError> {
        match self.lock().fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn totals_from_games(games: &[GameRecord], user_id: &UserId) -> UserTotals {
    let mut high_score = 0;
    let mut total_games = 0;
    for game in games.iter().filter(|g| g.user_id == *user_id) {
        high_score = high_score.max(game.score.as_i32());
        total_games += 1;
    }
    UserTotals {
        high_score,
        total_games,
    }
}

fn high_score_date(games: &[GameRecord], user: &User) -> Option<DateTime<Utc>> {
    games
        .iter()
        .filter(|g| g.user_id == user.user_id && g.score.as_i32() == user.high_score)
        .map(|g| g.played_at)
        .max()
}

fn join_identity(state: &StoreState, record: &GameRecord) -> Option<PlayerGameRecord> {
    let owner = state.users.iter().find(|u| u.user_id == record.user_id)?;
    Some(PlayerGameRecord {
        record: record.clone(),
        employee_number: owner.employee_number.as_ref().map(|n| n.as_ref().to_owned()),
        username: owner.username.as_ref().to_owned(),
    })
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, RecordStoreError> {
        self.take_failure()?;
        Ok(self.user(id))
    }

    async fn find_user_by_identity(
        &self,
        username: &Username,
        employee_number: Option<&EmployeeNumber>,
    ) -> Result<Option<User>, RecordStoreError> {
        self.take_failure()?;
        let state = self.lock();
        let found = state.users.iter().find(|u| match employee_number {
            Some(number) => {
                u.employee_number.as_ref() == Some(number) && u.username == *username
            }
            None => u.username == *username,
        });
        Ok(found.cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), RecordStoreError> {
        self.take_failure()?;
        self.lock().users.push(user.clone());
        Ok(())
    }

    async fn record_login(
        &self,
        id: &UserId,
        username: &Username,
        at: DateTime<Utc>,
    ) -> Result<(), RecordStoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.user_id == *id) {
            user.username = username.clone();
            user.last_login = at;
        }
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool, RecordStoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        let before = state.users.len();
        state.users.retain(|u| u.user_id != *id);
        let existed = state.users.len() < before;
        if existed {
            state.games.retain(|g| g.user_id != *id);
        }
        Ok(existed)
    }

    async fn insert_game(&self, record: &GameRecord) -> Result<(), RecordStoreError> {
        self.take_failure()?;
        self.lock().games.push(record.clone());
        Ok(())
    }

    async fn apply_game_to_user(
        &self,
        user_id: &UserId,
        score: Score,
    ) -> Result<UserTotals, RecordStoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.user_id == *user_id)
            .ok_or_else(|| RecordStoreError::query("user row missing"))?;
        user.high_score = user.high_score.max(score.as_i32());
        user.total_games += 1;
        Ok(UserTotals {
            high_score: user.high_score,
            total_games: user.total_games,
        })
    }

    async fn find_game(
        &self,
        id: &GameRecordId,
    ) -> Result<Option<GameRecord>, RecordStoreError> {
        self.take_failure()?;
        Ok(self.lock().games.iter().find(|g| g.game_id == *id).cloned())
    }

    async fn delete_game(&self, id: &GameRecordId) -> Result<bool, RecordStoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        let before = state.games.len();
        state.games.retain(|g| g.game_id != *id);
        Ok(state.games.len() < before)
    }

    async fn delete_all_games(&self) -> Result<(), RecordStoreError> {
        self.take_failure()?;
        self.lock().games.clear();
        Ok(())
    }

    async fn recompute_user_stats(
        &self,
        user_id: &UserId,
    ) -> Result<UserTotals, RecordStoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        let totals = totals_from_games(&state.games, user_id);
        if let Some(user) = state.users.iter_mut().find(|u| u.user_id == *user_id) {
            user.high_score = totals.high_score;
            user.total_games = totals.total_games;
        }
        Ok(totals)
    }

    async fn reset_all_user_stats(&self) -> Result<(), RecordStoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        for user in &mut state.users {
            user.high_score = 0;
            user.total_games = 0;
        }
        Ok(())
    }

    async fn reset_high_scores(&self) -> Result<(), RecordStoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        for user in &mut state.users {
            user.high_score = 0;
        }
        Ok(())
    }

    async fn list_users_by_high_score(&self) -> Result<Vec<User>, RecordStoreError> {
        self.take_failure()?;
        let mut users = self.lock().users.clone();
        users.sort_by(|a, b| b.high_score.cmp(&a.high_score));
        Ok(users)
    }

    async fn list_games(
        &self,
        user_id: Option<&UserId>,
        limit: i64,
    ) -> Result<Vec<PlayerGameRecord>, RecordStoreError> {
        self.take_failure()?;
        let state = self.lock();
        let mut games: Vec<&GameRecord> = state
            .games
            .iter()
            .filter(|g| user_id.is_none_or(|id| g.user_id == *id))
            .collect();
        games.sort_by(|a, b| b.played_at.cmp(&a.played_at));
        Ok(games
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .filter_map(|g| join_identity(&state, g))
            .collect())
    }

    async fn top_users(&self, limit: i64) -> Result<Vec<RankedUser>, RecordStoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        state.last_top_users_limit = Some(limit);
        let mut ranked: Vec<RankedUser> = state
            .users
            .iter()
            .filter(|u| u.high_score > 0)
            .map(|u| RankedUser {
                employee_number: u.employee_number.as_ref().map(|n| n.as_ref().to_owned()),
                username: u.username.as_ref().to_owned(),
                high_score: u.high_score,
                total_games: u.total_games,
                created_at: u.created_at,
                high_score_date: high_score_date(&state.games, u),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.high_score
                .cmp(&a.high_score)
                .then(b.high_score_date.cmp(&a.high_score_date))
        });
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }

    async fn top_games(&self, limit: i64) -> Result<Vec<PlayerGameRecord>, RecordStoreError> {
        self.take_failure()?;
        let state = self.lock();
        let mut games: Vec<&GameRecord> = state.games.iter().collect();
        games.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.played_at.cmp(&a.played_at))
        });
        Ok(games
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .filter_map(|g| join_identity(&state, g))
            .collect())
    }

    async fn global_stats(&self) -> Result<GlobalStats, RecordStoreError> {
        self.take_failure()?;
        let state = self.lock();
        let today_start = fixture_instant()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or_else(|| fixture_instant());
        let durations: Vec<i64> = state
            .games
            .iter()
            .filter(|g| g.game_duration > 0)
            .map(|g| i64::from(g.game_duration))
            .collect();
        let avg_game_time = if durations.is_empty() {
            0
        } else {
            durations.iter().sum::<i64>() / durations.len() as i64
        };
        Ok(GlobalStats {
            total_users: state.users.len() as i64,
            total_games: state.games.len() as i64,
            high_score: state.users.iter().map(|u| u.high_score).max().unwrap_or(0),
            today_games: state
                .games
                .iter()
                .filter(|g| g.played_at >= today_start)
                .count() as i64,
            avg_game_time,
        })
    }
}

/// Cache double that stores snapshots without a TTL and records
/// invalidations.
#[derive(Default)]
pub(crate) struct RecordingCache {
    entries: Mutex<HashMap<CacheKey, serde_json::Value>>,
    invalidations: Mutex<Vec<CacheKey>>,
}

impl RecordingCache {
    /// Whether the key has been invalidated since the last [`clear_log`].
    ///
    /// [`clear_log`]: Self::clear_log
    pub(crate) fn invalidated(&self, key: CacheKey) -> bool {
        self.invalidations
            .lock()
            .expect("cache mutex poisoned")
            .contains(&key)
    }

    /// Forget recorded invalidations.
    pub(crate) fn clear_log(&self) {
        self.invalidations
            .lock()
            .expect("cache mutex poisoned")
            .clear();
    }
}

impl SnapshotCache for RecordingCache {
    fn get(&self, key: CacheKey) -> Option<serde_json::Value> {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .get(&key)
            .cloned()
    }

    fn put(&self, key: CacheKey, value: serde_json::Value) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key, value);
    }

    fn invalidate(&self, key: CacheKey) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .remove(&key);
        self.invalidations
            .lock()
            .expect("cache mutex poisoned")
            .push(key);
    }

    fn invalidate_all(&self) {
        self.entries.lock().expect("cache mutex poisoned").clear();
        let mut log = self.invalidations.lock().expect("cache mutex poisoned");
        log.extend([CacheKey::Rankings, CacheKey::Stats, CacheKey::Users]);
    }
}

/// Publisher double that records every published event in order.
#[derive(Default)]
pub(crate) struct CountingPublisher {
    events: Mutex<Vec<GameEvent>>,
}

impl CountingPublisher {
    /// Events published so far, in publish order.
    pub(crate) fn events(&self) -> Vec<GameEvent> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

impl GameEventPublisher for CountingPublisher {
    fn publish(&self, event: GameEvent) {
        self.events
            .lock()
            .expect("publisher mutex poisoned")
            .push(event);
    }
}
