pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{open_gateway, MemoryGateway, SqliteGateway};
pub use api::AppState;
pub use config::ServiceConfig;
pub use core::catalog::Catalog;
pub use domain::ports::Gateway;
pub use utils::error::{Result, ServiceError};
