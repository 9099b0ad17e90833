//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API. It
//! registers every `/api` path from the inbound layer together with the
//! domain and wire schemas they reference. The generated document backs
//! Swagger UI, which is mounted in debug builds only.

use utoipa::OpenApi;

use crate::domain::ports::{GlobalStats, PlayerGameRecord, RankedUser};
use crate::domain::{Error, ErrorCode, GameRecord, User};
use crate::inbound::http::games::{SubmitGameRequest, SubmitGameResponse};
use crate::inbound::http::users::{LoginRequest, LoginResponse};
use crate::inbound::http::AckResponse;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scoreboard backend API",
        description = "HTTP interface for player identity, game records, rankings, and statistics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::games::submit_game,
        crate::inbound::http::games::list_games,
        crate::inbound::http::games::delete_all_games,
        crate::inbound::http::games::delete_game,
        crate::inbound::http::rankings::get_rankings,
        crate::inbound::http::rankings::get_all_time_rankings,
        crate::inbound::http::rankings::reset_rankings,
        crate::inbound::http::stats::get_stats,
    ),
    components(schemas(
        User,
        GameRecord,
        RankedUser,
        PlayerGameRecord,
        GlobalStats,
        LoginRequest,
        LoginResponse,
        SubmitGameRequest,
        SubmitGameResponse,
        AckResponse,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "users", description = "Player identity and account management"),
        (name = "games", description = "Game record submission and history"),
        (name = "rankings", description = "Leaderboards over persisted scores"),
        (name = "stats", description = "Aggregate statistics across all players")
    )
)]
pub struct ApiDoc;
