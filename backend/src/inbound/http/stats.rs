//! Global statistics handler.
//!
//! ```text
//! GET /api/stats
//! ```

use actix_web::{get, web};

use crate::domain::{Error, GlobalStats};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Aggregate statistics across all users and game records.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Aggregate statistics", body = GlobalStats),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["stats"],
    operation_id = "getStats"
)]
#[get("/stats")]
pub async fn get_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<GlobalStats>> {
    let stats = state.scoreboard.global_stats().await?;
    Ok(web::Json(stats))
}
