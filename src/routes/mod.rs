//! Router assembly: everything under the versioned prefix, plus the root redirect.

mod auth;
mod common;
mod resource;

pub use auth::auth_routes;
pub use common::common_routes;
pub use resource::resource_routes;

use crate::error::AppError;
use crate::handlers::common::root;
use crate::state::AppState;
use axum::{
    extract::OriginalUri,
    http::{header, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full application router. Unknown paths get an envelope-shaped 404, and a known path
/// hit with an unrouted method gets an envelope-shaped 405.
pub fn api_router(state: AppState) -> Router {
    let prefix = state.settings.route_prefix();
    let body_limit = state.settings.body_limit;
    let api = Router::new()
        .merge(common_routes())
        .merge(auth_routes())
        .merge(resource_routes());
    Router::new()
        .route("/", get(root))
        .nest(&prefix, api)
        .fallback(not_found)
        .layer(middleware::map_response(envelope_method_not_allowed))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// The router's own 405 has an empty body; handler 405s already carry a JSON envelope.
async fn envelope_method_not_allowed(method: Method, OriginalUri(uri): OriginalUri, res: Response) -> Response {
    if res.status() != StatusCode::METHOD_NOT_ALLOWED || res.headers().contains_key(header::CONTENT_TYPE) {
        return res;
    }
    let allow = res.headers().get(header::ALLOW).cloned();
    let mut wrapped = AppError::MethodNotAllowed(format!("{} not allowed on {}", method, uri.path())).into_response();
    if let Some(allow) = allow {
        wrapped.headers_mut().insert(header::ALLOW, allow);
    }
    wrapped
}
