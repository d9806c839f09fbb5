pub mod google;
pub mod token;

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;
use uuid::Uuid;

use blossom_types::api::{AuthResponse, DataResponse, ErrorResponse, OAuthCallbackQuery};
use blossom_types::models::User;

use crate::error::AppError;
use crate::state::{AppState, AppStateInner};

const STATE_COOKIE: &str = "blossom_oauth_state";
const STATE_COOKIE_PATH: &str = "/api/auth";

/// The authenticated caller, inserted by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolve a bearer token to a stored user: verify the token, then load its user.
pub async fn authenticate(state: &AppStateInner, bearer: &str) -> Result<User, AppError> {
    let claims = token::verify_token(&state.jwt_secret, bearer).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        AppError::unauthorized()
    })?;

    state.users.find(claims.id).await?.ok_or_else(|| {
        warn!("Bearer token for unknown user {}", claims.id);
        AppError::unauthorized()
    })
}

fn google_unconfigured() -> AppError {
    AppError::status(
        StatusCode::SERVICE_UNAVAILABLE,
        "Google sign-in is not configured.",
    )
}

fn sign_in_failed() -> AppError {
    AppError::status(StatusCode::UNAUTHORIZED, "Google sign-in failed.")
}

/// GET /auth/google: send the browser to Google's consent screen.
#[utoipa::path(
    get,
    path = "/api/auth/google",
    tag = "Auth",
    responses(
        (status = 303, description = "Redirect to Google's consent screen"),
        (status = 503, description = "Google sign-in is not configured", body = ErrorResponse)
    )
)]
pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let google = state.google.as_ref().ok_or_else(google_unconfigured)?;

    let csrf = Uuid::new_v4().to_string();
    let url = google::authorize_url(google, &csrf)?;

    let cookie = Cookie::build((STATE_COOKIE, csrf))
        .path(STATE_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Redirect::to(url.as_str())))
}

/// GET /auth/google/callback: finish sign-in and issue a bearer token.
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    tag = "Auth",
    params(OAuthCallbackQuery),
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Missing authorization code", body = ErrorResponse),
        (status = 401, description = "Google sign-in failed", body = ErrorResponse),
        (status = 503, description = "Google sign-in is not configured", body = ErrorResponse)
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    let google = state.google.as_ref().ok_or_else(google_unconfigured)?;

    if let Some(error) = query.error {
        warn!("Google sign-in denied: {}", error);
        return Err(sign_in_failed());
    }
    let code = query
        .code
        .ok_or_else(|| AppError::status(StatusCode::BAD_REQUEST, "Missing authorization code."))?;

    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_owned());
    if expected.is_none() || expected != query.state {
        warn!("Google sign-in state mismatch");
        return Err(sign_in_failed());
    }

    let profile = google::exchange_code(&state.http, google, &code)
        .await
        .map_err(|e| {
            warn!("Google code exchange failed: {:#}", e);
            sign_in_failed()
        })?;

    let user = state.users.find_or_create_google(profile).await?;
    let token = token::generate_token(&state.jwt_secret, &user)?;

    let jar = jar.remove(Cookie::build(STATE_COOKIE).path(STATE_COOKIE_PATH));
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            token,
            data: user,
        }),
    ))
}

/// GET /auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "The signed-in user", body = DataResponse<User>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    )
)]
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<DataResponse<User>> {
    Json(DataResponse::new(user))
}
