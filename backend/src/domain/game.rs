//! Game record data model.
//!
//! A [`GameRecord`] is immutable once created; it can only be deleted. The
//! owning user's aggregates are maintained by the scoreboard service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Upper bound accepted for a single game score.
pub const SCORE_MAX: i32 = 999_999;
/// Upper bound accepted for the level reached.
pub const LEVEL_MAX: i32 = 99;

/// Validation errors raised when constructing a [`GameSubmission`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameValidationError {
    /// Score is negative or exceeds [`SCORE_MAX`].
    #[error("score must be between 0 and {SCORE_MAX}")]
    ScoreOutOfRange,
    /// Level is outside `1..=99`.
    #[error("level must be between 1 and {LEVEL_MAX}")]
    LevelOutOfRange,
    /// Lines cleared is negative.
    #[error("lines cleared must be 0 or greater")]
    NegativeLinesCleared,
    /// Game duration is negative.
    #[error("game time must be 0 or greater")]
    NegativeDuration,
}

/// Stable game record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct GameRecordId(Uuid);

impl GameRecordId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for GameRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated score in `0..=999_999`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Score(i32);

impl Score {
    /// Validate and construct a [`Score`].
    pub fn new(value: i32) -> Result<Self, GameValidationError> {
        if (0..=SCORE_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GameValidationError::ScoreOutOfRange)
        }
    }

    /// Access the raw score value.
    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

impl From<Score> for i32 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl TryFrom<i32> for Score {
    type Error = GameValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated game-completion payload before persistence.
///
/// Optional fields take the same defaults the game client omits them with:
/// level 1, zero lines, zero duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSubmission {
    /// Owning user.
    pub user_id: UserId,
    /// Final score.
    pub score: Score,
    /// Level reached, `1..=99`.
    pub level: i32,
    /// Lines cleared, non-negative.
    pub lines_cleared: i32,
    /// Game duration in seconds, non-negative.
    pub game_duration_secs: i32,
}

impl GameSubmission {
    /// Validate raw submission fields.
    pub fn new(
        user_id: UserId,
        score: i32,
        level: Option<i32>,
        lines_cleared: Option<i32>,
        game_duration_secs: Option<i32>,
    ) -> Result<Self, GameValidationError> {
        let score = Score::new(score)?;
        let level = level.unwrap_or(1);
        if !(1..=LEVEL_MAX).contains(&level) {
            return Err(GameValidationError::LevelOutOfRange);
        }
        let lines_cleared = lines_cleared.unwrap_or(0);
        if lines_cleared < 0 {
            return Err(GameValidationError::NegativeLinesCleared);
        }
        let game_duration_secs = game_duration_secs.unwrap_or(0);
        if game_duration_secs < 0 {
            return Err(GameValidationError::NegativeDuration);
        }
        Ok(Self {
            user_id,
            score,
            level,
            lines_cleared,
            game_duration_secs,
        })
    }
}

/// Immutable record of one completed game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Stable identifier.
    pub game_id: GameRecordId,
    /// Owning user.
    pub user_id: UserId,
    /// Final score.
    pub score: Score,
    /// Level reached.
    pub level_reached: i32,
    /// Lines cleared.
    pub lines_cleared: i32,
    /// Duration in seconds.
    pub game_duration: i32,
    /// Completion timestamp.
    pub played_at: DateTime<Utc>,
}

impl GameRecord {
    /// Materialise a record from a validated submission at the given instant.
    pub fn from_submission(submission: &GameSubmission, played_at: DateTime<Utc>) -> Self {
        Self {
            game_id: GameRecordId::random(),
            user_id: submission.user_id,
            score: submission.score,
            level_reached: submission.level,
            lines_cleared: submission.lines_cleared,
            game_duration: submission.game_duration_secs,
            played_at,
        }
    }
}
