use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use blossom_types::api::{
    CreateCategoryRequest, DataResponse, DeleteResponse, ErrorResponse, ListResponse,
    UpdateCategoryRequest,
};
use blossom_types::models::Category;

use crate::error::AppError;
use crate::state::AppState;
use crate::validation::Validated;

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses((status = 200, description = "All categories", body = ListResponse<Category>))
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Category>>, AppError> {
    let categories = state.categories.list().await?;
    Ok(Json(ListResponse::new(categories)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "The category", body = DataResponse<Category>),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Category>>, AppError> {
    let category = state.categories.get_by_id(&id).await?;
    Ok(Json(DataResponse::new(category)))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Validated(req): Validated<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category = state.categories.create(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category after the update", body = Category),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(req): Validated<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = state.categories.update_by_id(&id, req).await?;
    Ok(Json(category))
}

/// Flowers pointing at the deleted category are left untouched.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "Category ID")),
    responses((status = 200, description = "Delete acknowledgement", body = DeleteResponse))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let result = state.categories.delete_by_id(&id).await?;
    Ok(Json(result))
}
