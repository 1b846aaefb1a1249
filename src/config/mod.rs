pub mod toml_config;

pub use toml_config::{Backend, ServiceConfig};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "pizza-service")]
#[command(about = "JSON API for restaurants, pizzas and their prices")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address to listen on, overrides server.bind_address
    #[arg(long)]
    pub bind: Option<String>,

    /// Storage backend, overrides database.backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// SQLite file path (or ":memory:"), overrides database.path
    #[arg(long)]
    pub database: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入 TOML (若有指定) 後套用命令列覆蓋，並驗證結果
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(backend) = self.backend {
            config.database.backend = backend;
        }
        if let Some(database) = &self.database {
            config.database.path = Some(database.clone());
        }
        if self.json_logs {
            config.logging.get_or_insert_with(Default::default).json = Some(true);
        }

        config.validate()?;
        Ok(config)
    }
}
