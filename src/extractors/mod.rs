//! Request extractors: bearer authentication and JSON object bodies.

mod auth;
mod payload;
pub use auth::AuthUser;
pub use payload::JsonObject;
