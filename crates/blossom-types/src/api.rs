use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::User;

// -- JWT Claims --

/// Claims carried by BlossomHub bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub exp: usize,
}

// -- Flowers --

/// Body accepted by `POST /flowers`, after schema validation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlowerRequest {
    #[schema(example = "Tulip")]
    pub name: Option<String>,
    #[schema(example = "Bright and cheerful spring flower")]
    pub description: Option<String>,
    #[schema(example = 12.99)]
    pub price: f64,
    #[schema(example = "0b7f3c1e-3f0a-4a51-9d5e-2f6a2d1c9b10")]
    pub category_id: String,
    pub image_url: Option<String>,
    #[schema(example = 20)]
    pub stock: f64,
    #[schema(example = true)]
    pub is_featured: bool,
}

/// Body accepted by `PUT /flowers/{id}`. Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlowerRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<String>,
    pub image_url: Option<String>,
    pub stock: Option<f64>,
    pub is_featured: Option<bool>,
}

/// Raw query-string filters for `GET /flowers`. Empty values are treated as unset.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FlowerQuery {
    /// Filter by category ID
    pub category: Option<String>,
    /// Search by flower name (case-insensitive)
    pub search: Option<String>,
    /// Filter by minimum price
    pub min_price: Option<String>,
    /// Filter by maximum price
    pub max_price: Option<String>,
    /// Filter by featured status (true/false)
    pub is_featured: Option<String>,
}

// -- Categories --

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[schema(example = "Roses")]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub create_at: Option<String>,
}

// -- Envelopes --

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

// -- Auth --

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub data: User,
}
