use crate::domain::model::Category;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OmikujiError {
    #[error("Storage error during {operation}: {message}")]
    Storage { operation: String, message: String },

    #[error("Draw of {outcome} could not be recorded: {source}")]
    DrawNotRecorded {
        outcome: Category,
        #[source]
        source: Box<OmikujiError>,
    },

    #[error("Invalid date range: {message}")]
    InvalidRange { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {}", fields.join(", "))]
    MissingConfigError { fields: Vec<String> },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// 對外暴露的錯誤種類 (machine-readable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Storage,
    InvalidRange,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Storage => "storage_error",
            ErrorKind::InvalidRange => "invalid_range",
            ErrorKind::Configuration => "configuration_error",
        }
    }
}

impl OmikujiError {
    pub fn storage(operation: &str, cause: impl std::fmt::Display) -> Self {
        OmikujiError::Storage {
            operation: operation.to_string(),
            message: cause.to_string(),
        }
    }

    /// Prefixes a storage error's message with the parameters of the failed
    /// call. Other variants pass through untouched.
    pub fn with_parameters(self, parameters: impl std::fmt::Display) -> Self {
        match self {
            OmikujiError::Storage { operation, message } => OmikujiError::Storage {
                operation,
                message: format!("{}: {}", parameters, message),
            },
            other => other,
        }
    }

    pub fn invalid_range(message: impl Into<String>) -> Self {
        OmikujiError::InvalidRange {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OmikujiError::Storage { .. } | OmikujiError::DrawNotRecorded { .. } => {
                ErrorKind::Storage
            }
            OmikujiError::InvalidRange { .. } => ErrorKind::InvalidRange,
            OmikujiError::ConfigError { .. }
            | OmikujiError::MissingConfigError { .. }
            | OmikujiError::InvalidConfigValueError { .. }
            | OmikujiError::IoError(_) => ErrorKind::Configuration,
        }
    }

    /// 給終端使用者的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self.kind() {
            ErrorKind::Storage => "The fortune service could not reach its storage.".to_string(),
            ErrorKind::InvalidRange => match self {
                OmikujiError::InvalidRange { message } => format!("Invalid date range: {}", message),
                _ => "Invalid date range.".to_string(),
            },
            ErrorKind::Configuration => "The fortune service is not configured correctly.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Storage => "Check that the store directory exists and is writable, then try again",
            ErrorKind::InvalidRange => "Use YYYY-MM-DD dates with the start date on or before the end date",
            ErrorKind::Configuration => "Check the [store] section of the config file and the CLI overrides",
        }
    }
}

pub type Result<T> = std::result::Result<T, OmikujiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_not_recorded_is_a_storage_error() {
        let err = OmikujiError::DrawNotRecorded {
            outcome: Category::Kyo,
            source: Box::new(OmikujiError::storage("append", "disk full")),
        };
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.kind().as_str(), "storage_error");
        assert!(err.to_string().contains("凶"));
        assert!(!err.user_friendly_message().contains("disk full"));
    }

    #[test]
    fn test_with_parameters_only_touches_storage_errors() {
        let err = OmikujiError::storage("recent", "connection refused").with_parameters("limit 5");
        assert_eq!(
            err.to_string(),
            "Storage error during recent: limit 5: connection refused"
        );

        let range = OmikujiError::invalid_range("backwards").with_parameters("ignored");
        assert_eq!(range.to_string(), "Invalid date range: backwards");
    }

    #[test]
    fn test_missing_config_lists_fields() {
        let err = OmikujiError::MissingConfigError {
            fields: vec!["store.path".to_string(), "store.collection".to_string()],
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            err.to_string(),
            "Missing configuration: store.path, store.collection"
        );
    }
}
