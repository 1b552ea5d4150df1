//! Common routes: health and version. No token required.

use crate::handlers::common::{health, version};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}
