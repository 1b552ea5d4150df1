//! Resource CRUD handlers: list, read, create, update, delete.
//! The path segment selects the catalog descriptor; every handler requires a bearer token.

use crate::catalog::{self, Operation, Resource};
use crate::error::AppError;
use crate::extractors::{AuthUser, JsonObject};
use crate::response::{success_created, success_ok};
use crate::service::{CrudService, Mode, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

fn resolve(path_segment: &str, op: Operation) -> Result<&'static Resource, AppError> {
    let resource = catalog::by_path(path_segment).ok_or_else(|| AppError::NotFound(path_segment.to_string()))?;
    if !resource.allows(op) {
        return Err(AppError::MethodNotAllowed(format!("{} not allowed on {}", op.as_str(), resource.path)));
    }
    Ok(resource)
}

fn parse_id(id_str: &str) -> Result<i32, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(path_segment): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment, Operation::List)?;
    let rows = CrudService::list(&state.gateway, resource).await?;
    Ok(success_ok(rows))
}

pub async fn read(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment, Operation::Read)?;
    let id = parse_id(&id_str)?;
    let row = CrudService::read(&state.gateway, resource, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", resource.path, id)))?;
    Ok(success_ok(row))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(path_segment): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment, Operation::Create)?;
    let payload = RequestValidator::validate(&body, resource, Mode::Create)?;
    let row = CrudService::create(&state.gateway, resource, &payload).await?;
    tracing::info!(resource = resource.path, user = %identity.username, id = ?row.get(resource.pk), "created");
    Ok(success_created(row))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((path_segment, id_str)): Path<(String, String)>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment, Operation::Update)?;
    let id = parse_id(&id_str)?;
    let payload = RequestValidator::validate(&body, resource, Mode::Replace)?;
    let row = CrudService::update(&state.gateway, resource, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", resource.path, id)))?;
    tracing::info!(resource = resource.path, user = %identity.username, id, "updated");
    Ok(success_ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&path_segment, Operation::Delete)?;
    let id = parse_id(&id_str)?;
    let affected = CrudService::delete(&state.gateway, resource, id).await?;
    if affected == 0 {
        return Err(AppError::NotFound(format!("{} {}", resource.path, id)));
    }
    tracing::info!(resource = resource.path, user = %identity.username, id, "deleted");
    Ok(success_ok(json!({ "affected": affected })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn unknown_resource_is_404() {
        assert_eq!(resolve("courses", Operation::List).unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn read_only_resources_refuse_writes() {
        for op in [Operation::Create, Operation::Update, Operation::Delete] {
            let err = resolve("restrictions", op).unwrap_err();
            assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
        assert!(resolve("occupations", Operation::Read).is_ok());
    }

    #[test]
    fn ids_must_be_int4() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("abc").is_err());
        assert!(parse_id("4294967296").is_err());
    }
}
