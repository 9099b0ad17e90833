//! Game record API handlers.
//!
//! ```text
//! POST /api/games {"userId":"...","score":1234,"level":5,"linesCleared":42,"gameTime":180}
//! GET /api/games?userId=...&limit=50
//! DELETE /api/games/{id}
//! DELETE /api/games
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    Error, GameRecordId, GameSubmission, GameValidationError, PlayerGameRecord, UserId,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{AckResponse, ApiResult};

/// Submission body for `POST /api/games`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGameRequest {
    /// Owning user.
    pub user_id: Uuid,
    /// Final score, `0..=999999`.
    pub score: i32,
    /// Level reached, `1..=99`; defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    /// Lines cleared; defaults to 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_cleared: Option<i32>,
    /// Duration in seconds; defaults to 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_time: Option<i32>,
}

/// Response for a stored game result.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGameResponse {
    pub success: bool,
    /// Identifier of the stored record.
    pub game_id: GameRecordId,
    /// Whether the score strictly beat the user's previous high score.
    pub is_new_high_score: bool,
}

/// Query parameters for `GET /api/games`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListGamesQuery {
    /// Restrict to one user's records.
    pub user_id: Option<Uuid>,
    /// Maximum records returned; clamped to `[1, 100]`, default 50.
    pub limit: Option<i64>,
}

fn map_game_validation_error(err: GameValidationError) -> Error {
    let field = match err {
        GameValidationError::ScoreOutOfRange => "score",
        GameValidationError::LevelOutOfRange => "level",
        GameValidationError::NegativeLinesCleared => "linesCleared",
        GameValidationError::NegativeDuration => "gameTime",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Persist a completed game and refresh the owner's aggregates.
///
/// Broadcasts `gameCompleted` and `statsUpdated` to joined admin sessions.
#[utoipa::path(
    post,
    path = "/api/games",
    request_body = SubmitGameRequest,
    responses(
        (status = 201, description = "Record stored", body = SubmitGameResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["games"],
    operation_id = "submitGame"
)]
#[post("/games")]
pub async fn submit_game(
    state: web::Data<HttpState>,
    payload: web::Json<SubmitGameRequest>,
) -> ApiResult<HttpResponse> {
    let SubmitGameRequest {
        user_id,
        score,
        level,
        lines_cleared,
        game_time,
    } = payload.into_inner();
    let submission = GameSubmission::new(
        UserId::from_uuid(user_id),
        score,
        level,
        lines_cleared,
        game_time,
    )
    .map_err(map_game_validation_error)?;

    let outcome = state.scoreboard.record_game(submission).await?;
    Ok(HttpResponse::Created().json(SubmitGameResponse {
        success: true,
        game_id: outcome.game_id,
        is_new_high_score: outcome.is_new_high_score,
    }))
}

/// Recent game records joined with player identity, newest first.
#[utoipa::path(
    get,
    path = "/api/games",
    params(ListGamesQuery),
    responses(
        (status = 200, description = "Game records", body = [PlayerGameRecord]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["games"],
    operation_id = "listGames"
)]
#[get("/games")]
pub async fn list_games(
    state: web::Data<HttpState>,
    query: web::Query<ListGamesQuery>,
) -> ApiResult<web::Json<Vec<PlayerGameRecord>>> {
    let user_id = query.user_id.map(UserId::from_uuid);
    let records = state
        .scoreboard
        .list_games(user_id.as_ref(), query.limit)
        .await?;
    Ok(web::Json(records))
}

/// Delete every game record and zero all user aggregates.
#[utoipa::path(
    delete,
    path = "/api/games",
    responses(
        (status = 200, description = "All records deleted", body = AckResponse),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["games"],
    operation_id = "deleteAllGames"
)]
#[delete("/games")]
pub async fn delete_all_games(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.scoreboard.delete_all_games().await?;
    Ok(HttpResponse::Ok().json(AckResponse::new(
        "all game records deleted and user stats reset",
    )))
}

/// Delete one game record and recompute the owner's aggregates.
#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    params(("id" = Uuid, Path, description = "Game record identifier")),
    responses(
        (status = 200, description = "Record deleted", body = AckResponse),
        (status = 404, description = "Unknown record", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["games"],
    operation_id = "deleteGame"
)]
#[delete("/games/{id}")]
pub async fn delete_game(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = GameRecordId::from_uuid(path.into_inner());
    state.scoreboard.delete_game(&id).await?;
    Ok(HttpResponse::Ok().json(AckResponse::new("game record deleted")))
}
