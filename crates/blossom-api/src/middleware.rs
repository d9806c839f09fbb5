use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, CurrentUser};
use crate::error::AppError;
use crate::state::AppState;

/// Extract the bearer token, resolve it to a user, and attach it as [`CurrentUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
        .ok_or_else(AppError::unauthorized)?;

    let user = auth::authenticate(&state, &token).await?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Only lets admins through. Must run after `require_auth`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    match req.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) if user.is_admin => Ok(next.run(req).await),
        Some(_) => Err(AppError::forbidden()),
        None => Err(AppError::unauthorized()),
    }
}
