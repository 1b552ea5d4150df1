//! CrudService: catalog-driven CRUD using the safe SQL builder.

mod crud;
mod validation;
pub use crud::CrudService;
pub use validation::{Mode, Payload, RequestValidator};
