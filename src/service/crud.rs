//! Generic CRUD over catalog resources. Resources with an association write the
//! row and its join rows in one transaction.

use super::validation::Payload;
use crate::catalog::{Association, Resource};
use crate::error::AppError;
use crate::gateway::{self, Gateway, Outcome, Record};
use crate::sql::{delete, delete_members, insert, insert_member, select_by_id, select_list, update};
use sqlx::PgConnection;

pub struct CrudService;

impl CrudService {
    /// Every row ordered by primary key, hidden rows included.
    pub async fn list(gateway: &Gateway, resource: &Resource) -> Result<Vec<Record>, AppError> {
        let mut conn = gateway.acquire().await?;
        Ok(gateway::execute(&mut conn, &select_list(resource)).await?.into_rows())
    }

    pub async fn read(gateway: &Gateway, resource: &Resource, id: i32) -> Result<Option<Record>, AppError> {
        let mut conn = gateway.acquire().await?;
        gateway::fetch_one(&mut conn, &select_by_id(resource, id)).await
    }

    /// Insert a row (and its members) and return it as re-read from storage.
    pub async fn create(gateway: &Gateway, resource: &Resource, payload: &Payload) -> Result<Record, AppError> {
        match &resource.association {
            Some(assoc) => {
                let mut tx = gateway.begin().await?;
                let id = insert_row(&mut tx, resource, payload).await?;
                if let Some(members) = &payload.members {
                    replace_members(&mut tx, assoc, id, members).await?;
                }
                let row = reread(&mut tx, resource, id).await?;
                tx.commit().await?;
                Ok(row)
            }
            None => {
                let mut conn = gateway.acquire().await?;
                let id = insert_row(&mut conn, resource, payload).await?;
                reread(&mut conn, resource, id).await
            }
        }
    }

    /// Replace a row's columns (and its members when supplied). `None` when the id does not exist.
    pub async fn update(
        gateway: &Gateway,
        resource: &Resource,
        id: i32,
        payload: &Payload,
    ) -> Result<Option<Record>, AppError> {
        match &resource.association {
            Some(assoc) => {
                let mut tx = gateway.begin().await?;
                if !update_row(&mut tx, resource, id, payload).await? {
                    return Ok(None);
                }
                if let Some(members) = &payload.members {
                    replace_members(&mut tx, assoc, id, members).await?;
                }
                let row = reread(&mut tx, resource, id).await?;
                tx.commit().await?;
                Ok(Some(row))
            }
            None => {
                let mut conn = gateway.acquire().await?;
                if !update_row(&mut conn, resource, id, payload).await? {
                    return Ok(None);
                }
                reread(&mut conn, resource, id).await.map(Some)
            }
        }
    }

    /// Delete a row, join rows first. Returns the number of rows removed from the resource table.
    pub async fn delete(gateway: &Gateway, resource: &Resource, id: i32) -> Result<u64, AppError> {
        match &resource.association {
            Some(assoc) => {
                let mut tx = gateway.begin().await?;
                gateway::execute(&mut tx, &delete_members(assoc, id)).await?;
                let removed = gateway::execute(&mut tx, &delete(resource, id)).await?.affected();
                if removed == 0 {
                    // nothing to delete; dropping tx rolls back
                    return Ok(0);
                }
                tx.commit().await?;
                Ok(removed)
            }
            None => {
                let mut conn = gateway.acquire().await?;
                Ok(gateway::execute(&mut conn, &delete(resource, id)).await?.affected())
            }
        }
    }
}

async fn insert_row(conn: &mut PgConnection, resource: &Resource, payload: &Payload) -> Result<i32, AppError> {
    match gateway::execute(conn, &insert(resource, &payload.values)).await? {
        Outcome::Inserted { id } => Ok(id),
        other => Err(AppError::Internal(format!(
            "insert into {} returned {:?}",
            resource.table, other
        ))),
    }
}

/// True when a row with this id exists.
async fn update_row(conn: &mut PgConnection, resource: &Resource, id: i32, payload: &Payload) -> Result<bool, AppError> {
    match update(resource, id, &payload.values) {
        Some(stmt) => Ok(gateway::execute(conn, &stmt).await?.affected() > 0),
        None => Ok(gateway::fetch_one(conn, &select_by_id(resource, id)).await?.is_some()),
    }
}

/// Delete-all-then-insert; the member set is never diffed.
async fn replace_members(
    conn: &mut PgConnection,
    assoc: &Association,
    owner: i32,
    members: &std::collections::BTreeSet<i32>,
) -> Result<(), AppError> {
    gateway::execute(conn, &delete_members(assoc, owner)).await?;
    for member in members {
        gateway::execute(conn, &insert_member(assoc, owner, *member)).await?;
    }
    tracing::debug!(table = assoc.table, owner, count = members.len(), "members replaced");
    Ok(())
}

async fn reread(conn: &mut PgConnection, resource: &Resource, id: i32) -> Result<Record, AppError> {
    gateway::fetch_one(conn, &select_by_id(resource, id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", resource.path, id)))
}
