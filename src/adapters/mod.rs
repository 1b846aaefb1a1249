// Adapters layer: concrete Gateway implementations.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

use crate::config::toml_config::{Backend, DatabaseConfig, DEFAULT_DATABASE_PATH};
use crate::domain::ports::Gateway;
use crate::utils::error::Result;
use std::sync::Arc;

pub fn open_gateway(config: &DatabaseConfig) -> Result<Arc<dyn Gateway>> {
    match config.backend {
        Backend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryGateway::new()))
        }
        Backend::Sqlite => {
            let path = config.path.as_deref().unwrap_or(DEFAULT_DATABASE_PATH);
            tracing::info!("Using SQLite store at {}", path);
            Ok(Arc::new(SqliteGateway::open(path)?))
        }
    }
}
