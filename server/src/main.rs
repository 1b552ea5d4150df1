//! Schedule API server: reads configuration, prepares the schema and serves the router.
//!
//! Run from repo root: `cargo run -p schedule-server`

use schedule_api::{api_router, ensure_bootstrap_user, ensure_schema, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("schedule_api=info,schedule_server=info")
            }),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::debug!(?settings, "settings loaded");
    let state = AppState::new(settings);

    // The database may come up after the server; /health reports it meanwhile.
    match ensure_schema(&state.gateway).await {
        Ok(()) => {
            if let Err(e) = ensure_bootstrap_user(&state.gateway, &state.credentials, &state.settings.auth).await {
                tracing::error!(error = %e, "bootstrap user not created");
            }
        }
        Err(e) => tracing::warn!(error = %e, "schema bootstrap skipped"),
    }

    let listener = TcpListener::bind(state.settings.bind_addr()).await?;
    let addr = listener.local_addr()?;
    let prefix = state.settings.route_prefix();
    let app = api_router(state);
    tracing::info!("schedule api listening on http://{}{}", addr, prefix);
    axum::serve(listener, app).await?;
    Ok(())
}
