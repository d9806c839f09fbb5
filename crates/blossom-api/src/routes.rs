use axum::{
    Router,
    http::{Method, StatusCode, Uri},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};

use crate::error::AppError;
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;
use crate::{auth, categories, docs, flowers, users};

/// The full HTTP surface. Transport layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    let catalogue = Router::new()
        .route(
            "/flowers",
            get(flowers::list_flowers).post(flowers::create_flower),
        )
        .route(
            "/flowers/{id}",
            get(flowers::get_flower)
                .put(flowers::update_flower)
                .delete(flowers::delete_flower),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        );

    let public_auth = Router::new()
        .route("/auth/google", get(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback));

    let signed_in = Router::new()
        .route("/auth/me", get(auth::me))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    // Layers wrap outside-in, so require_auth runs before require_admin.
    let admin = Router::new()
        .route("/users", get(users::list_users))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .merge(catalogue)
        .merge(public_auth)
        .merge(signed_in)
        .merge(admin);

    Router::new()
        .route("/", get(health))
        .route("/api-docs", get(docs::swagger_ui))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .nest("/api", api)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .with_state(state)
}

async fn health() -> &'static str {
    "BlossomHub API is running!"
}

async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::status(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {} not allowed on {}", method, uri.path()),
    )
}

async fn not_found(uri: Uri) -> AppError {
    AppError::status(StatusCode::NOT_FOUND, format!("Route {} not found", uri.path()))
}
