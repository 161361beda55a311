pub mod query;
pub mod rest;

pub use query::QueryService;
pub use rest::{create_router, ApiState};
