//! Login (public) and registration (token required).

use crate::handlers::auth::{login, register};
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}
