use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use blossom_types::api::{
    CreateFlowerRequest, DataResponse, DeleteResponse, ErrorResponse, FlowerQuery, ListResponse,
    UpdateFlowerRequest,
};
use blossom_types::models::Flower;

use crate::error::AppError;
use crate::state::AppState;
use crate::validation::{QueryParams, Validated};

/// GET /flowers
#[utoipa::path(
    get,
    path = "/api/flowers",
    tag = "Flowers",
    params(FlowerQuery),
    responses(
        (status = 200, description = "Flowers matching every supplied filter", body = ListResponse<Flower>),
        (status = 400, description = "Malformed filter value", body = ErrorResponse),
        (status = 404, description = "Malformed category id", body = ErrorResponse)
    )
)]
pub async fn list_flowers(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<FlowerQuery>,
) -> Result<Json<ListResponse<Flower>>, AppError> {
    let flowers = state.flowers.list(query).await?;
    Ok(Json(ListResponse::new(flowers)))
}

/// GET /flowers/{id}
#[utoipa::path(
    get,
    path = "/api/flowers/{id}",
    tag = "Flowers",
    params(("id" = String, Path, description = "Flower ID")),
    responses(
        (status = 200, description = "The flower with its category populated", body = DataResponse<Flower>),
        (status = 404, description = "Flower not found", body = ErrorResponse)
    )
)]
pub async fn get_flower(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Flower>>, AppError> {
    let flower = state.flowers.get_by_id(&id).await?;
    Ok(Json(DataResponse::new(flower)))
}

/// POST /flowers
#[utoipa::path(
    post,
    path = "/api/flowers",
    tag = "Flowers",
    request_body = CreateFlowerRequest,
    responses(
        (status = 201, description = "Flower created", body = Flower),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
pub async fn create_flower(
    State(state): State<AppState>,
    Validated(req): Validated<CreateFlowerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let flower = state.flowers.create(req).await?;
    Ok((StatusCode::CREATED, Json(flower)))
}

/// PUT /flowers/{id}
#[utoipa::path(
    put,
    path = "/api/flowers/{id}",
    tag = "Flowers",
    params(("id" = String, Path, description = "Flower ID")),
    request_body = UpdateFlowerRequest,
    responses(
        (status = 200, description = "Flower after the update", body = Flower),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Flower or category not found", body = ErrorResponse)
    )
)]
pub async fn update_flower(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(req): Validated<UpdateFlowerRequest>,
) -> Result<Json<Flower>, AppError> {
    let flower = state.flowers.update_by_id(&id, req).await?;
    Ok(Json(flower))
}

/// DELETE /flowers/{id}. Deleting an absent flower is not an error.
#[utoipa::path(
    delete,
    path = "/api/flowers/{id}",
    tag = "Flowers",
    params(("id" = String, Path, description = "Flower ID")),
    responses(
        (status = 200, description = "Delete acknowledgement", body = DeleteResponse),
        (status = 404, description = "Malformed id", body = ErrorResponse)
    )
)]
pub async fn delete_flower(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let result = state.flowers.delete_by_id(&id).await?;
    Ok(Json(result))
}
