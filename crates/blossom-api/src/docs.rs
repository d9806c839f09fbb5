use axum::{Json, response::Html};
use utoipa::OpenApi;

use blossom_types::api::{
    AuthResponse, CreateCategoryRequest, CreateFlowerRequest, DeleteResponse, ErrorResponse,
    UpdateCategoryRequest, UpdateFlowerRequest,
};
use blossom_types::models::{Category, CategoryRef, Flower, User};

use crate::{auth, categories, flowers, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BlossomHub API",
        version = "1.0.0",
        description = "API documentation for the BlossomHub flower shop"
    ),
    paths(
        flowers::list_flowers,
        flowers::get_flower,
        flowers::create_flower,
        flowers::update_flower,
        flowers::delete_flower,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        auth::google_login,
        auth::google_callback,
        auth::me,
        users::list_users,
    ),
    components(schemas(
        Flower,
        Category,
        CategoryRef,
        User,
        CreateFlowerRequest,
        UpdateFlowerRequest,
        CreateCategoryRequest,
        UpdateCategoryRequest,
        DeleteResponse,
        ErrorResponse,
        AuthResponse,
    )),
    tags(
        (name = "Flowers", description = "Flower catalogue"),
        (name = "Categories", description = "Flower categories"),
        (name = "Auth", description = "Google sign-in and bearer tokens"),
        (name = "Users", description = "User administration")
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>BlossomHub API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/api-docs/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

/// GET /api-docs
pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/flowers",
            "/api/flowers/{id}",
            "/api/categories",
            "/api/categories/{id}",
            "/api/auth/google",
            "/api/auth/google/callback",
            "/api/auth/me",
            "/api/users",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
        assert_eq!(doc.info.title, "BlossomHub API");
    }

    #[test]
    fn swagger_page_points_at_the_document() {
        assert!(SWAGGER_UI.contains(r##"dom_id: "#swagger-ui""##));
        assert!(SWAGGER_UI.contains("/api-docs/openapi.json"));
        assert!(SWAGGER_UI.trim_end().ends_with("</html>"));
    }
}
