//! HTTP handlers for resource CRUD, authentication and service endpoints.

pub mod auth;
pub mod common;
pub mod resource;
