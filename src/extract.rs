use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Form, Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Request body sent either as JSON or as an HTML form. A body without a
/// content type carries no fields.
pub struct Payload<T>(pub T);

enum BodyKind {
    Form,
    Json,
    Unknown,
}

fn body_kind(req: &Request) -> BodyKind {
    match req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        None => BodyKind::Unknown,
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => BodyKind::Form,
        Some(_) => BodyKind::Json,
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Form => {
                let Form(value) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                Ok(Payload(value))
            }
            BodyKind::Json => {
                let Json(value) = Json::<T>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                Ok(Payload(value))
            }
            BodyKind::Unknown => serde_json::from_value(Value::Object(Map::new()))
                .map(Payload)
                .map_err(|e| AppError::bad_request(e.to_string())),
        }
    }
}

/// Path parameters with `{ "error": .. }` rejections.
pub struct Params<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        Ok(Params(value))
    }
}

/// Query string with `{ "error": .. }` rejections.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// Reads a scalar field as text: JSON numbers and booleans are kept in their
/// textual form, `null` counts as absent.
pub fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
