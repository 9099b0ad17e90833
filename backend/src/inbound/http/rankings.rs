//! Ranking API handlers.
//!
//! ```text
//! GET /api/rankings?limit=10
//! GET /api/rankings/all?limit=50
//! DELETE /api/rankings
//! ```

use actix_web::{delete, get, web, HttpResponse};
use serde::Deserialize;

use crate::domain::{Error, PlayerGameRecord, RankedUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{AckResponse, ApiResult};

/// Query parameters shared by the ranking reads.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RankingsQuery {
    /// Maximum entries returned; clamped to `[1, 100]`.
    pub limit: Option<i64>,
}

/// Top users by high score. Users who have never scored are excluded.
#[utoipa::path(
    get,
    path = "/api/rankings",
    params(RankingsQuery),
    responses(
        (status = 200, description = "Ranked users", body = [RankedUser]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["rankings"],
    operation_id = "getRankings"
)]
#[get("/rankings")]
pub async fn get_rankings(
    state: web::Data<HttpState>,
    query: web::Query<RankingsQuery>,
) -> ApiResult<web::Json<Vec<RankedUser>>> {
    let entries = state.scoreboard.leaderboard(query.limit).await?;
    Ok(web::Json(entries))
}

/// Top individual game records across all players.
#[utoipa::path(
    get,
    path = "/api/rankings/all",
    params(RankingsQuery),
    responses(
        (status = 200, description = "Top game records", body = [PlayerGameRecord]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["rankings"],
    operation_id = "getAllTimeRankings"
)]
#[get("/rankings/all")]
pub async fn get_all_time_rankings(
    state: web::Data<HttpState>,
    query: web::Query<RankingsQuery>,
) -> ApiResult<web::Json<Vec<PlayerGameRecord>>> {
    let records = state.scoreboard.all_time_leaderboard(query.limit).await?;
    Ok(web::Json(records))
}

/// Zero every user's high score, clearing the rankings.
#[utoipa::path(
    delete,
    path = "/api/rankings",
    responses(
        (status = 200, description = "Rankings reset", body = AckResponse),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["rankings"],
    operation_id = "resetRankings"
)]
#[delete("/rankings")]
pub async fn reset_rankings(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.scoreboard.reset_rankings().await?;
    Ok(HttpResponse::Ok().json(AckResponse::new("rankings reset")))
}
