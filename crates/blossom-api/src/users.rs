use axum::{Json, extract::State};

use blossom_types::api::{ErrorResponse, ListResponse};
use blossom_types::models::User;

use crate::error::AppError;
use crate::state::AppState;

/// GET /users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Every registered user", body = ListResponse<User>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ListResponse<User>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(ListResponse::new(users)))
}
