//! Unauthenticated routes: health, version and the root redirect.

use crate::response::success_ok;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde_json::json;

/// Always 200; the message says whether the database answered.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = if state.gateway.ping().await {
        "Connected to DB"
    } else {
        "Not connected to DB"
    };
    success_ok(format!("I am fine! {}", db_status))
}

pub async fn version() -> impl IntoResponse {
    success_ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&format!("{}/health", state.settings.route_prefix()))
}
