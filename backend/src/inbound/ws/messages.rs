//! Wire-level message definitions for the WebSocket adapter.
//!
//! Domain events are transformed into these payloads before being
//! serialized to JSON and sent to joined admin sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GameCompletedEvent, GameEvent, StatsUpdatedEvent, UserId};

/// Control messages accepted from clients.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Subscribe this connection to the admin event feed.
    AdminJoin,
}

/// Frames pushed to joined admin sessions.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    /// Acknowledges an `admin-join` command.
    AdminJoined,
    /// A game result was persisted.
    #[serde(rename_all = "camelCase")]
    GameCompleted {
        user_id: UserId,
        #[serde(skip_serializing_if = "Option::is_none")]
        employee_number: Option<String>,
        username: String,
        score: i32,
        level: i32,
        lines_cleared: i32,
        game_time: i32,
        timestamp: DateTime<Utc>,
        is_new_high_score: bool,
    },
    /// The acting user's aggregates changed.
    #[serde(rename_all = "camelCase")]
    StatsUpdated {
        total_games: i32,
        user_high_score: i32,
    },
}

impl From<GameEvent> for ServerFrame {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::GameCompleted(GameCompletedEvent {
                user_id,
                employee_number,
                username,
                score,
                level,
                lines_cleared,
                game_duration_secs,
                timestamp,
                is_new_high_score,
            }) => Self::GameCompleted {
                user_id,
                employee_number,
                username,
                score,
                level,
                lines_cleared,
                game_time: game_duration_secs,
                timestamp,
                is_new_high_score,
            },
            GameEvent::StatsUpdated(StatsUpdatedEvent {
                total_games,
                user_high_score,
            }) => Self::StatsUpdated {
                total_games,
                user_high_score,
            },
        }
    }
}
