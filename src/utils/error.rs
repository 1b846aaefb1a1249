use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Integrity error: {message}")]
    IntegrityError { message: String },

    #[error("Storage error: {0}")]
    StorageError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// 儲存層內的資料彼此矛盾 (例如關聯指向不存在的 pizza)；屬於伺服器端錯誤
    #[error("Inconsistent data: {message}")]
    InconsistentData { message: String },

    #[error("Blocking task failed: {message}")]
    BlockingTaskError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Storage,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::IntegrityError {
            message: message.into(),
        }
    }

    /// 呼叫端送入的資料有問題 (400 類錯誤)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError { .. } | Self::IntegrityError { .. }
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::ValidationError { .. } | Self::IntegrityError { .. } => {
                ErrorCategory::Client
            }
            Self::StorageError(_) | Self::InconsistentData { .. } => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::BlockingTaskError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client => ErrorSeverity::Low,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Setting '{}' is required", field),
            Self::StorageError(_) => "The database could not be opened or queried".to_string(),
            Self::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML config file and command line flags",
            ErrorCategory::Storage => "Check the database path and that the file is writable",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Client => "Fix the request payload and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(ServiceError::validation("price out of range").is_client_error());
        assert!(ServiceError::integrity("unknown pizza").is_client_error());
        assert!(!ServiceError::NotFound { entity: "Restaurant" }.is_client_error());
    }

    #[test]
    fn test_not_found_message() {
        let err = ServiceError::NotFound { entity: "Restaurant" };
        assert_eq!(err.to_string(), "Restaurant not found");
        assert_eq!(err.category(), ErrorCategory::Client);
    }

    #[test]
    fn test_inconsistent_data_is_not_a_client_error() {
        let err = ServiceError::InconsistentData {
            message: "restaurant_pizza 1 references missing pizza 1".to_string(),
        };
        assert!(!err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = ServiceError::MissingConfigError {
            field: "server.bind_address".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("server.bind_address"));
    }
}
