//! Error types for coaweb-core
//!
//! Errors carry a stable code and severity, and can be turned into
//! [`ErrorDetails`] with suggestions for API responses.

use coaweb_import::ImportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AccountId;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Entity is not configured
    EntityNotFound,
    /// Entity is configured but has no snapshot yet
    NotLoaded,
    /// Account not found in the snapshot
    AccountNotFound,
    /// Snapshot or budget file missing
    FileNotFound,
    /// Snapshot could not be parsed
    InvalidFormat,
    /// IO error
    IoError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::EntityNotFound => write!(f, "ENTITY_NOT_FOUND"),
            ErrorCode::NotLoaded => write!(f, "NOT_LOADED"),
            ErrorCode::AccountNotFound => write!(f, "ACCOUNT_NOT_FOUND"),
            ErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    /// Operation may be affected
    Warning,
    /// Operation failed
    Error,
}

impl ErrorSeverity {
    /// Log level used when an error of this severity is reported
    pub fn level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for coaweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Entity not found: {entity}")]
    EntityNotFound { entity: String },

    #[error("Entity not loaded: {entity}")]
    NotLoaded { entity: String },

    #[error("Account {id} not found in {entity}")]
    AccountNotFound { entity: String, id: AccountId },

    #[error("Import failed for {entity}: {source}")]
    Import {
        entity: String,
        #[source]
        source: ImportError,
    },
}

impl CoreError {
    pub fn import(entity: &str, source: ImportError) -> Self {
        CoreError::Import {
            entity: entity.to_string(),
            source,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::EntityNotFound { .. } => ErrorCode::EntityNotFound,
            CoreError::NotLoaded { .. } => ErrorCode::NotLoaded,
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::Import { source, .. } => match source {
                ImportError::NotFound { .. } => ErrorCode::FileNotFound,
                ImportError::IoError(_) => ErrorCode::IoError,
                _ => ErrorCode::InvalidFormat,
            },
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::EntityNotFound { .. } => ErrorSeverity::Info,
            CoreError::NotLoaded { .. } => ErrorSeverity::Warning,
            CoreError::AccountNotFound { .. } => ErrorSeverity::Info,
            CoreError::Import { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::EntityNotFound { entity } => {
                details = details.with_suggestion(format!(
                    "Add '{}' under data.entities in the configuration file.", entity
                ));
                details = details.with_suggestion(
                    "Use the /api/entities endpoint to list configured entities.".to_string()
                );
            }
            CoreError::NotLoaded { .. } => {
                details = details.with_suggestion(
                    "Trigger a load with POST /api/reload.".to_string()
                );
            }
            CoreError::AccountNotFound { entity, .. } => {
                details = details.with_suggestion(format!(
                    "Use /api/entities/{}/accounts to list account ids.", entity
                ));
            }
            CoreError::Import { source, .. } => {
                details = details.with_detail(serde_json::json!({ "import_message": source.to_string() }));
                match source {
                    ImportError::NotFound { .. } => {
                        details = details.with_suggestion(
                            "Check data.path and the entity's accounts_file.".to_string()
                        );
                    }
                    ImportError::MissingColumn { .. } | ImportError::BadRow { .. } => {
                        details = details.with_suggestion(
                            "Sheets need at least an id and a balance column with plain numbers.".to_string()
                        );
                    }
                    _ => {}
                }
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error logger trait
pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, operation: &str);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, operation: &str) {
        let severity = error.severity();
        log::log!(
            target: "coaweb::error",
            severity.level(),
            "{} [{}] {} - Operation: {}",
            severity.to_string().to_uppercase(),
            error.code(),
            error.to_details(),
            operation
        );
    }
}

// ==================== Tests ====================
