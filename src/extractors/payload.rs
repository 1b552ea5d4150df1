//! JSON object body with envelope-shaped rejections.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde_json::{Map, Value};

/// Request body that must be a JSON object.
#[derive(Debug)]
pub struct JsonObject(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        match value {
            Value::Object(map) => Ok(JsonObject(map)),
            _ => Err(AppError::BadRequest("body must be a JSON object".into())),
        }
    }
}
