//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain. Raw-SQL result rows live here too so every
//! database shape is declared in one place.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Timestamptz, Varchar};
use uuid::Uuid;

use super::schema::{game_records, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub employee_number: Option<String>,
    pub username: String,
    pub high_score: i32,
    pub total_games: i32,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub employee_number: Option<&'a str>,
    pub username: &'a str,
    pub high_score: i32,
    pub total_games: i32,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// Row struct for reading from the game_records table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = game_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GameRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub level_reached: i32,
    pub lines_cleared: i32,
    pub game_duration: i32,
    pub played_at: DateTime<Utc>,
}

/// Insertable struct for creating new game records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = game_records)]
pub(crate) struct NewGameRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub level_reached: i32,
    pub lines_cleared: i32,
    pub game_duration: i32,
    pub played_at: DateTime<Utc>,
}

/// Aggregates returned by the conditional-update and recompute statements.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct TotalsRow {
    #[diesel(sql_type = Integer)]
    pub high_score: i32,
    #[diesel(sql_type = Integer)]
    pub total_games: i32,
}

/// Leaderboard row produced by the ranked-users query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct RankedUserRow {
    #[diesel(sql_type = Nullable<Varchar>)]
    pub employee_number: Option<String>,
    #[diesel(sql_type = Varchar)]
    pub username: String,
    #[diesel(sql_type = Integer)]
    pub high_score: i32,
    #[diesel(sql_type = Integer)]
    pub total_games: i32,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub high_score_date: Option<DateTime<Utc>>,
}

/// Single-row aggregate snapshot produced by the statistics query.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct GlobalStatsRow {
    #[diesel(sql_type = BigInt)]
    pub total_users: i64,
    #[diesel(sql_type = BigInt)]
    pub total_games: i64,
    #[diesel(sql_type = Integer)]
    pub high_score: i32,
    #[diesel(sql_type = BigInt)]
    pub today_games: i64,
    #[diesel(sql_type = BigInt)]
    pub avg_game_time: i64,
}
