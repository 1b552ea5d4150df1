//! Shared application state for all routes. Built once at startup and never mutated.

use crate::auth::CredentialService;
use crate::gateway::Gateway;
use crate::settings::Settings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub credentials: Arc<CredentialService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Lazy pool: no connection is attempted until the first request needs one.
    pub fn new(settings: Settings) -> Self {
        AppState {
            gateway: Gateway::connect_lazy(&settings.database),
            credentials: Arc::new(CredentialService::new(&settings.auth)),
            settings: Arc::new(settings),
        }
    }
}
