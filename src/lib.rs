//! Schedule API: authenticated CRUD over the schedule database
//! (events, lecturers, rooms, blocks, restrictions, occupations, users).

pub mod auth;
pub mod catalog;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod time;

pub use auth::{CredentialService, Identity};
pub use catalog::{Resource, RESOURCES};
pub use error::{AppError, ConfigError};
pub use gateway::{Gateway, Outcome, Record};
pub use response::{envelope, success_created, success_ok, Envelope};
pub use routes::api_router;
pub use service::CrudService;
pub use settings::Settings;
pub use state::AppState;
pub use store::{ensure_bootstrap_user, ensure_schema};
pub use time::ClockTime;
