//! PostgreSQL-backed [`RecordStore`] implementation using Diesel ORM.
//!
//! Aggregate maintenance is expressed as single conditional statements so
//! concurrent submissions cannot interleave a stale read into `high_score`
//! or `total_games`. User deletion cascades to game records through the
//! schema's foreign key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    GlobalStats, PlayerGameRecord, RankedUser, RecordStore, RecordStoreError, UserTotals,
};
use crate::domain::{
    EmployeeNumber, GameRecord, GameRecordId, Score, User, UserId, Username,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    GameRow, GlobalStatsRow, NewGameRow, NewUserRow, RankedUserRow, TotalsRow, UserRow,
};
use super::pool::DbPool;
use super::schema::{game_records, users};

/// Diesel-backed implementation of the record store port.
#[derive(Clone)]
pub struct DieselRecordStore {
    pool: DbPool,
}

impl DieselRecordStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const APPLY_GAME_SQL: &str = r#"
UPDATE users
SET high_score = GREATEST(high_score, $1),
    total_games = total_games + 1
WHERE id = $2
RETURNING high_score, total_games
"#;

const RECOMPUTE_STATS_SQL: &str = r#"
UPDATE users
SET high_score = COALESCE((SELECT MAX(score) FROM game_records WHERE user_id = $1), 0),
    total_games = (SELECT COUNT(*)::int FROM game_records WHERE user_id = $1)
WHERE id = $1
RETURNING high_score, total_games
"#;

const TOP_USERS_SQL: &str = r#"
SELECT u.employee_number, u.username, u.high_score, u.total_games, u.created_at,
       (SELECT MAX(g.played_at)
          FROM game_records g
         WHERE g.user_id = u.id AND g.score = u.high_score) AS high_score_date
FROM users u
WHERE u.high_score > 0
ORDER BY u.high_score DESC, high_score_date DESC NULLS LAST
LIMIT $1
"#;

const GLOBAL_STATS_SQL: &str = r#"
SELECT
    (SELECT COUNT(*) FROM users) AS total_users,
    (SELECT COUNT(*) FROM game_records) AS total_games,
    (SELECT COALESCE(MAX(high_score), 0) FROM users) AS high_score,
    (SELECT COUNT(*) FROM game_records
      WHERE played_at >= date_trunc('day', now())) AS today_games,
    (SELECT COALESCE(CAST(AVG(game_duration) AS BIGINT), 0)
       FROM game_records
      WHERE game_duration > 0) AS avg_game_time
"#;

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, RecordStoreError> {
    let username =
        Username::new(&row.username).map_err(|err| RecordStoreError::query(err.to_string()))?;
    let employee_number = row
        .employee_number
        .as_deref()
        .map(EmployeeNumber::new)
        .transpose()
        .map_err(|err| RecordStoreError::query(err.to_string()))?;
    Ok(User {
        user_id: UserId::from_uuid(row.id),
        employee_number,
        username,
        high_score: row.high_score,
        total_games: row.total_games,
        created_at: row.created_at,
        last_login: row.last_login,
    })
}

/// Convert a database row into a validated domain game record.
fn row_to_game(row: GameRow) -> Result<GameRecord, RecordStoreError> {
    let score = Score::new(row.score).map_err(|err| RecordStoreError::query(err.to_string()))?;
    Ok(GameRecord {
        game_id: GameRecordId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        score,
        level_reached: row.level_reached,
        lines_cleared: row.lines_cleared,
        game_duration: row.game_duration,
        played_at: row.played_at,
    })
}

fn joined_row_to_player_record(
    (row, employee_number, username): (GameRow, Option<String>, String),
) -> Result<PlayerGameRecord, RecordStoreError> {
    Ok(PlayerGameRecord {
        record: row_to_game(row)?,
        employee_number,
        username,
    })
}

fn ranked_row_to_domain(row: RankedUserRow) -> RankedUser {
    RankedUser {
        employee_number: row.employee_number,
        username: row.username,
        high_score: row.high_score,
        total_games: row.total_games,
        created_at: row.created_at,
        high_score_date: row.high_score_date,
    }
}

#[async_trait]
impl RecordStore for DieselRecordStore {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_user_by_identity(
        &self,
        username: &Username,
        employee_number: Option<&EmployeeNumber>,
    ) -> Result<Option<User>, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = users::table
            .select(UserRow::as_select())
            .filter(users::username.eq(username.as_ref()))
            .into_boxed();
        if let Some(number) = employee_number {
            query = query.filter(users::employee_number.eq(number.as_ref()));
        }

        let row = query
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn insert_user(&self, user: &User) -> Result<(), RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            id: *user.user_id.as_uuid(),
            employee_number: user.employee_number.as_ref().map(AsRef::as_ref),
            username: user.username.as_ref(),
            high_score: user.high_score,
            total_games: user.total_games,
            created_at: user.created_at,
            last_login: user.last_login,
        };
        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn record_login(
        &self,
        id: &UserId,
        username: &Username,
        at: DateTime<Utc>,
    ) -> Result<(), RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::username.eq(username.as_ref()),
                users::last_login.eq(at),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Game records go with the user via ON DELETE CASCADE.
        let deleted = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn insert_game(&self, record: &GameRecord) -> Result<(), RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewGameRow {
            id: *record.game_id.as_uuid(),
            user_id: *record.user_id.as_uuid(),
            score: record.score.as_i32(),
            level_reached: record.level_reached,
            lines_cleared: record.lines_cleared,
            game_duration: record.game_duration,
            played_at: record.played_at,
        };
        diesel::insert_into(game_records::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn apply_game_to_user(
        &self,
        user_id: &UserId,
        score: Score,
    ) -> Result<UserTotals, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let totals: TotalsRow = sql_query(APPLY_GAME_SQL)
            .bind::<Integer, _>(score.as_i32())
            .bind::<SqlUuid, _>(user_id.as_uuid())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(UserTotals {
            high_score: totals.high_score,
            total_games: totals.total_games,
        })
    }

    async fn find_game(
        &self,
        id: &GameRecordId,
    ) -> Result<Option<GameRecord>, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = game_records::table
            .find(id.as_uuid())
            .select(GameRow::as_select())
            .first::<GameRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_game).transpose()
    }

    async fn delete_game(&self, id: &GameRecordId) -> Result<bool, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(game_records::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete_all_games(&self) -> Result<(), RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(game_records::table)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn recompute_user_stats(
        &self,
        user_id: &UserId,
    ) -> Result<UserTotals, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let totals: TotalsRow = sql_query(RECOMPUTE_STATS_SQL)
            .bind::<SqlUuid, _>(user_id.as_uuid())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(UserTotals {
            high_score: totals.high_score,
            total_games: totals.total_games,
        })
    }

    async fn reset_all_user_stats(&self) -> Result<(), RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table)
            .set((users::high_score.eq(0), users::total_games.eq(0)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn reset_high_scores(&self) -> Result<(), RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table)
            .set(users::high_score.eq(0))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_users_by_high_score(&self) -> Result<Vec<User>, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::high_score.desc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn list_games(
        &self,
        user_id: Option<&UserId>,
        limit: i64,
    ) -> Result<Vec<PlayerGameRecord>, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = game_records::table
            .inner_join(users::table)
            .select((
                GameRow::as_select(),
                users::employee_number,
                users::username,
            ))
            .order(game_records::played_at.desc())
            .limit(limit)
            .into_boxed();
        if let Some(id) = user_id {
            query = query.filter(game_records::user_id.eq(id.as_uuid()));
        }

        let rows: Vec<(GameRow, Option<String>, String)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(joined_row_to_player_record).collect()
    }

    async fn top_users(&self, limit: i64) -> Result<Vec<RankedUser>, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RankedUserRow> = sql_query(TOP_USERS_SQL)
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(ranked_row_to_domain).collect())
    }

    async fn top_games(&self, limit: i64) -> Result<Vec<PlayerGameRecord>, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(GameRow, Option<String>, String)> = game_records::table
            .inner_join(users::table)
            .select((
                GameRow::as_select(),
                users::employee_number,
                users::username,
            ))
            .order((game_records::score.desc(), game_records::played_at.desc()))
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(joined_row_to_player_record).collect()
    }

    async fn global_stats(&self) -> Result<GlobalStats, RecordStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: GlobalStatsRow = sql_query(GLOBAL_STATS_SQL)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(GlobalStats {
            total_users: row.total_users,
            total_games: row.total_games,
            high_score: row.high_score,
            today_games: row.today_games,
            avg_game_time: row.avg_game_time,
        })
    }
}
