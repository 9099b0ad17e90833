//! User API handlers.
//!
//! ```text
//! POST /api/users/login {"username":"Alice","employeeNumber":"EMP001"}
//! GET /api/users
//! DELETE /api/users/{id}
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, User, UserId};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{AckResponse, ApiResult};

/// Login request body for `POST /api/users/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Display name; also the fallback identity key.
    pub username: String,
    /// Optional employee number; blank is treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
}

/// Login response carrying the resolved user.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: User,
}

/// Resolve a login to an existing user or create a fresh one.
///
/// A returning user keeps their aggregates; only the display name and
/// last-login timestamp are refreshed.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Resolved user", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login"
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest {
        username,
        employee_number,
    } = payload.into_inner();
    let user = state
        .identity
        .resolve(&username, employee_number.as_deref())
        .await?;
    Ok(web::Json(LoginResponse {
        success: true,
        user,
    }))
}

/// List all users ordered by high score.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users ordered by high score", body = [User]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.scoreboard.list_users().await?;
    Ok(web::Json(users))
}

/// Delete a user together with all their game records.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted", body = AckResponse),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = UserId::from_uuid(path.into_inner());
    state.scoreboard.delete_user(&id).await?;
    Ok(HttpResponse::Ok().json(AckResponse::new("user and game records deleted")))
}
