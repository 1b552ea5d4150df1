//! Resource CRUD routes.
//! Parameterized paths so handlers receive the segment and id and resolve the resource from the catalog.

use crate::handlers::resource::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/:resource", get(list).post(create))
        .route("/:resource/:id", get(read).put(update).delete(delete_handler))
}
