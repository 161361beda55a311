pub mod types;
pub mod price_infra;
pub mod store;
pub mod api;
pub mod error;
pub mod config;
pub mod observability;
pub mod utils;

pub const APP_NAME: &str = "price-tracker";
