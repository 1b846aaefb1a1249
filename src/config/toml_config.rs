use crate::domain::model::{NewPizza, NewRestaurant};
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{validate_path, validate_price, validate_required_field, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5555";
pub const DEFAULT_DATABASE_PATH: &str = "app.db";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub logging: Option<LoggingConfig>,
    pub seed: Option<SeedConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_database_path")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

/// 啟動時寫入的種子資料；restaurant_pizzas 以 1 起算的位置參照上面兩個清單
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub restaurants: Vec<NewRestaurant>,
    #[serde(default)]
    pub pizzas: Vec<NewPizza>,
    #[serde(default)]
    pub restaurant_pizzas: Vec<SeedRestaurantPizza>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRestaurantPizza {
    pub restaurant: usize,
    pub pizza: usize,
    pub price: i64,
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_database_path() -> Option<String> {
    Some(DEFAULT_DATABASE_PATH.to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: default_database_path(),
        }
    }
}

static ENV_VAR_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ServiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATABASE_PATH})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = ENV_VAR_PATTERN
            .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").ok())
            .as_ref()
            .ok_or_else(|| ServiceError::ConfigError {
                message: "environment substitution pattern failed to compile".to_string(),
            })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.bind_address()?;

        if self.database.backend == Backend::Sqlite {
            let path = validate_required_field("database.path", &self.database.path)?;
            validate_path("database.path", path)?;
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(ServiceError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        if let Some(seed) = &self.seed {
            for (index, restaurant) in seed.restaurants.iter().enumerate() {
                restaurant.validate().map_err(|e| seed_error("restaurants", index, e))?;
            }
            for (index, pizza) in seed.pizzas.iter().enumerate() {
                pizza.validate().map_err(|e| seed_error("pizzas", index, e))?;
            }
            for (index, entry) in seed.restaurant_pizzas.iter().enumerate() {
                validate_price(Some(&serde_json::Value::from(entry.price)))
                    .map_err(|e| seed_error("restaurant_pizzas", index, e))?;
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server
            .bind_address
            .parse()
            .map_err(|e| ServiceError::InvalidConfigValueError {
                field: "server.bind_address".to_string(),
                value: self.server.bind_address.clone(),
                reason: format!("Invalid socket address: {}", e),
            })
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

fn seed_error(section: &str, index: usize, err: ServiceError) -> ServiceError {
    ServiceError::InvalidConfigValueError {
        field: format!("seed.{}[{}]", section, index),
        value: String::new(),
        reason: err.to_string(),
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
