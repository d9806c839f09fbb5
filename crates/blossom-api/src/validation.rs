//! Declarative payload validation.
//!
//! A [`Schema`] is a list of [`FieldRule`]s. Validation strips unknown fields,
//! coerces numeric and boolean strings, and reports every violated field at once.

use std::fmt;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use blossom_types::api::{
    CreateCategoryRequest, CreateFlowerRequest, UpdateCategoryRequest, UpdateFlowerRequest,
};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    String,
    Boolean,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldType,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldType) -> Self {
        Self { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: FieldType) -> Self {
        Self { name, kind, required: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field-level violation found in one payload, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// `Ok(())` when nothing was collected, otherwise the whole set as an error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    rules: &'static [FieldRule],
}

impl Schema {
    pub const fn new(rules: &'static [FieldRule]) -> Self {
        Self { rules }
    }

    /// Check `payload` against every rule. On success returns only the declared
    /// fields that were present, after coercion.
    pub fn validate(&self, payload: Value) -> Result<Map<String, Value>, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let Value::Object(mut input) = payload else {
            errors.push("value", "\"value\" must be of type object");
            return Err(errors);
        };

        let mut normalized = Map::new();
        for rule in self.rules {
            match input.remove(rule.name) {
                None | Some(Value::Null) if rule.required => {
                    errors.push(rule.name, format!("\"{}\" is required", rule.name));
                }
                None => {}
                Some(value) => match coerce(rule, value) {
                    Ok(value) => {
                        normalized.insert(rule.name.to_string(), value);
                    }
                    Err(message) => errors.push(rule.name, message),
                },
            }
        }

        errors.into_result().map(|()| normalized)
    }
}

fn coerce(rule: &FieldRule, value: Value) -> Result<Value, String> {
    let name = rule.name;
    match (rule.kind, value) {
        (FieldType::Number, Value::Number(n)) => Ok(Value::Number(n)),
        (FieldType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("\"{name}\" must be a number")),
        (FieldType::Number, _) => Err(format!("\"{name}\" must be a number")),

        (FieldType::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (FieldType::Boolean, Value::String(s)) if s.eq_ignore_ascii_case("true") => {
            Ok(Value::Bool(true))
        }
        (FieldType::Boolean, Value::String(s)) if s.eq_ignore_ascii_case("false") => {
            Ok(Value::Bool(false))
        }
        (FieldType::Boolean, _) => Err(format!("\"{name}\" must be a boolean")),

        (FieldType::String, Value::String(s)) if s.is_empty() => {
            Err(format!("\"{name}\" is not allowed to be empty"))
        }
        (FieldType::String, Value::String(s)) => Ok(Value::String(s)),
        (FieldType::String, _) => Err(format!("\"{name}\" must be a string")),
    }
}

// -- Schemas --

pub const CREATE_FLOWER: Schema = Schema::new(&[
    FieldRule::optional("name", FieldType::String),
    FieldRule::optional("description", FieldType::String),
    FieldRule::required("price", FieldType::Number),
    FieldRule::required("categoryId", FieldType::String),
    FieldRule::optional("imageUrl", FieldType::String),
    FieldRule::required("stock", FieldType::Number),
    FieldRule::required("isFeatured", FieldType::Boolean),
]);

pub const UPDATE_FLOWER: Schema = Schema::new(&[
    FieldRule::optional("name", FieldType::String),
    FieldRule::optional("description", FieldType::String),
    FieldRule::optional("price", FieldType::Number),
    FieldRule::optional("categoryId", FieldType::String),
    FieldRule::optional("imageUrl", FieldType::String),
    FieldRule::optional("stock", FieldType::Number),
    FieldRule::optional("isFeatured", FieldType::Boolean),
]);

pub const CREATE_CATEGORY: Schema = Schema::new(&[
    FieldRule::optional("name", FieldType::String),
    FieldRule::optional("description", FieldType::String),
]);

pub const UPDATE_CATEGORY: Schema = Schema::new(&[
    FieldRule::optional("name", FieldType::String),
    FieldRule::optional("description", FieldType::String),
    FieldRule::optional("createAt", FieldType::String),
]);

/// A request body type guarded by a schema.
pub trait SchemaBody: DeserializeOwned {
    const SCHEMA: Schema;
}

impl SchemaBody for CreateFlowerRequest {
    const SCHEMA: Schema = CREATE_FLOWER;
}

impl SchemaBody for UpdateFlowerRequest {
    const SCHEMA: Schema = UPDATE_FLOWER;
}

impl SchemaBody for CreateCategoryRequest {
    const SCHEMA: Schema = CREATE_CATEGORY;
}

impl SchemaBody for UpdateCategoryRequest {
    const SCHEMA: Schema = UPDATE_CATEGORY;
}

/// JSON body extractor that runs `T::SCHEMA` before deserializing into `T`.
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: SchemaBody,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::status(StatusCode::BAD_REQUEST, rejection.body_text()))?;

        let normalized = T::SCHEMA.validate(payload)?;
        let body = serde_json::from_value(Value::Object(normalized))
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self(body))
    }
}

/// Query-string extractor whose rejection goes through [`AppError`] like every
/// other client error.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::status(StatusCode::BAD_REQUEST, rejection.body_text()))?;
        Ok(Self(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accumulates_every_violation() {
        let err = CREATE_FLOWER
            .validate(json!({ "name": 7, "price": "cheap" }))
            .unwrap_err();

        assert_eq!(
            err.fields(),
            vec!["name", "price", "categoryId", "stock", "isFeatured"]
        );
        assert_eq!(
            err.to_string(),
            "\"name\" must be a string, \"price\" must be a number, \"categoryId\" is required, \
             \"stock\" is required, \"isFeatured\" is required"
        );
    }

    #[test]
    fn strips_unknown_fields_and_coerces_primitives() {
        let normalized = CREATE_FLOWER
            .validate(json!({
                "name": "Tulip",
                "price": "12.99",
                "categoryId": "abc",
                "stock": 20,
                "isFeatured": "TRUE",
                "color": "red"
            }))
            .unwrap();

        assert_eq!(normalized.get("price"), Some(&json!(12.99)));
        assert_eq!(normalized.get("isFeatured"), Some(&json!(true)));
        assert!(!normalized.contains_key("color"));
        assert!(!normalized.contains_key("description"));
    }

    #[test]
    fn null_counts_as_missing_for_required_and_wrong_type_for_optional() {
        let err = CREATE_FLOWER
            .validate(json!({
                "price": null,
                "categoryId": "abc",
                "stock": 1,
                "isFeatured": false,
                "imageUrl": null
            }))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "\"price\" is required, \"imageUrl\" must be a string"
        );
    }

    #[test]
    fn empty_strings_are_rejected() {
        let err = UPDATE_CATEGORY.validate(json!({ "name": "" })).unwrap_err();
        assert_eq!(err.to_string(), "\"name\" is not allowed to be empty");
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = UPDATE_FLOWER.validate(json!([1, 2])).unwrap_err();
        assert_eq!(err.fields(), vec!["value"]);
    }

    #[test]
    fn update_schema_accepts_empty_object() {
        assert!(UPDATE_FLOWER.validate(json!({})).unwrap().is_empty());
    }
}
