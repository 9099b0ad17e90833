//! Domain events pushed to admin observers.
//!
//! Events are immutable snapshots taken at publish time; they carry no
//! references back into mutable state and no delivery guarantee.

use chrono::{DateTime, Utc};

use super::game::GameRecord;
use super::user::{User, UserId};

/// Snapshot broadcast when a game result has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GameCompletedEvent {
    /// Owning user.
    pub user_id: UserId,
    /// Employee number at broadcast time, if any.
    pub employee_number: Option<String>,
    /// Display name at broadcast time.
    pub username: String,
    /// Submitted score.
    pub score: i32,
    /// Level reached.
    pub level: i32,
    /// Lines cleared.
    pub lines_cleared: i32,
    /// Game duration in seconds.
    pub game_duration_secs: i32,
    /// Completion timestamp.
    pub timestamp: DateTime<Utc>,
    /// Whether the score strictly exceeded the previous high score.
    pub is_new_high_score: bool,
}

impl GameCompletedEvent {
    /// Build a snapshot from the persisted record and the owning user.
    pub fn new(user: &User, record: &GameRecord, is_new_high_score: bool) -> Self {
        Self {
            user_id: user.user_id,
            employee_number: user
                .employee_number
                .as_ref()
                .map(|n| n.as_ref().to_owned()),
            username: user.username.as_ref().to_owned(),
            score: record.score.as_i32(),
            level: record.level_reached,
            lines_cleared: record.lines_cleared,
            game_duration_secs: record.game_duration,
            timestamp: record.played_at,
            is_new_high_score,
        }
    }
}

/// Snapshot of the acting user's refreshed aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsUpdatedEvent {
    /// The user's game count after the write.
    pub total_games: i32,
    /// The user's high score after the write.
    pub user_high_score: i32,
}

/// Event fan-out payload for admin observers.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A game result was persisted.
    GameCompleted(GameCompletedEvent),
    /// A user's aggregates changed.
    StatsUpdated(StatsUpdatedEvent),
}
