use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::ErrorCode;
use thiserror::Error;
use tracing::{debug, error};

use blossom_types::api::ErrorResponse;

use crate::validation::ValidationErrors;

const FALLBACK_MESSAGE: &str = "Something went wrong on the server.";

/// Every failure a request can end in. Handlers and repositories propagate these
/// with `?`; [`classify`] alone turns them into a status and message.
#[derive(Debug, Error)]
pub enum AppError {
    /// A deliberate domain outcome carrying its own status (e.g. "Category not found").
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// An identity that could not be parsed.
    #[error("malformed id {value:?}")]
    InvalidId { value: String },

    /// A unique constraint rejected the write.
    #[error("duplicate value for {field}")]
    Duplicate { field: String },

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl AppError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized() -> Self {
        Self::status(
            StatusCode::UNAUTHORIZED,
            "Unauthorized: No token provided or token invalid.",
        )
    }

    pub fn forbidden() -> Self {
        Self::status(StatusCode::FORBIDDEN, "Forbidden: Admin access required.")
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match duplicate_field(&err) {
            Some(field) => Self::Duplicate { field },
            None => Self::Internal(err),
        }
    }
}

/// Pull the offending column out of a SQLite UNIQUE violation, reported in the
/// camelCase spelling used on the wire.
fn duplicate_field(err: &anyhow::Error) -> Option<String> {
    let rusqlite::Error::SqliteFailure(code, Some(message)) = err.downcast_ref::<rusqlite::Error>()?
    else {
        return None;
    };
    if code.code != ErrorCode::ConstraintViolation {
        return None;
    }

    // "UNIQUE constraint failed: categories.name[, categories.other]"
    let columns = message.strip_prefix("UNIQUE constraint failed: ")?;
    let first = columns.split(',').next()?.trim();
    let column = first.rsplit('.').next()?;
    Some(camel_case(column))
}

fn camel_case(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut upper = false;
    for c in column.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Decide the HTTP status and client-facing message for a failure.
pub fn classify(err: &AppError) -> (StatusCode, String) {
    match err {
        AppError::Status { status, message } => (*status, message.clone()),
        AppError::Validation(errors) => (StatusCode::BAD_REQUEST, errors.to_string()),
        AppError::InvalidId { value } => (
            StatusCode::NOT_FOUND,
            format!("Resource not found with ID of {value}"),
        ),
        AppError::Duplicate { field } => (
            StatusCode::CONFLICT,
            format!("Duplicate field value: {field} already exists."),
        ),
        AppError::Internal(inner) => {
            let message = inner.to_string();
            if message.trim().is_empty() {
                (StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_MESSAGE.to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = classify(&self);

        if status.is_server_error() {
            // Full cause chain stays in the server log.
            error!("{:?}", self);
        } else {
            debug!("{} {}", status.as_u16(), message);
        }

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blossom_db::Database;
    use blossom_db::models::CategoryRow;

    #[test]
    fn explicit_status_wins_verbatim() {
        let err = AppError::not_found("Category not found with ID of 42");
        assert_eq!(
            classify(&err),
            (StatusCode::NOT_FOUND, "Category not found with ID of 42".to_string())
        );
    }

    #[test]
    fn validation_joins_field_messages() {
        let mut errors = ValidationErrors::default();
        errors.push("name", "Flower name is required.");
        errors.push("price", "Price cannot be negative.");

        assert_eq!(
            classify(&AppError::from(errors)),
            (
                StatusCode::BAD_REQUEST,
                "Flower name is required., Price cannot be negative.".to_string()
            )
        );
    }

    #[test]
    fn malformed_id_is_not_found() {
        let err = AppError::InvalidId { value: "abc".into() };
        assert_eq!(
            classify(&err),
            (StatusCode::NOT_FOUND, "Resource not found with ID of abc".to_string())
        );
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let db = Database::open_in_memory().unwrap();
        let row = |id: &str| CategoryRow {
            id: id.into(),
            name: Some("Roses".into()),
            description: None,
            create_at: None,
        };
        db.insert_category(&row("c1")).unwrap();
        let err = AppError::from(db.insert_category(&row("c2")).unwrap_err());

        assert_eq!(
            classify(&err),
            (
                StatusCode::CONFLICT,
                "Duplicate field value: name already exists.".to_string()
            )
        );
    }

    #[test]
    fn column_names_are_reported_in_camel_case() {
        assert_eq!(camel_case("google_id"), "googleId");
        assert_eq!(camel_case("email"), "email");
    }

    #[test]
    fn internal_errors_keep_their_message_or_fall_back() {
        let err = AppError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(
            classify(&err),
            (StatusCode::INTERNAL_SERVER_ERROR, "disk on fire".to_string())
        );

        let silent = AppError::from(anyhow::anyhow!(""));
        assert_eq!(
            classify(&silent),
            (StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_MESSAGE.to_string())
        );
    }
}
