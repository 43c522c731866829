use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Source file not found: {path}")]
    SourceNotFound { path: String },

    #[error("Failed to read {path}: {reason}")]
    ReadFailure { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    WriteFailure { path: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Output,
    Data,
    Config,
    System,
}

/// 嚴重程度決定 CLI 退出碼：Low=0, Medium=2, High=1, Critical=3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::SourceNotFound { .. } | EtlError::ReadFailure { .. } => ErrorCategory::Source,
            EtlError::WriteFailure { .. } => ErrorCategory::Output,
            EtlError::SerializationError(_) => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Config,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::SourceNotFound { .. }
            | EtlError::ReadFailure { .. }
            | EtlError::WriteFailure { .. } => ErrorSeverity::High,
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorSeverity::Critical,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::SourceNotFound { .. } => {
                "Check that the source file exists and the path is spelled correctly".to_string()
            }
            EtlError::ReadFailure { .. } => {
                "Check file permissions and that the file is readable".to_string()
            }
            EtlError::WriteFailure { .. } => {
                "Check the output directory permissions and available disk space".to_string()
            }
            EtlError::IoError(_) => "Check file permissions and disk space".to_string(),
            EtlError::SerializationError(_) => {
                "Re-run with --verbose to see which record could not be serialized".to_string()
            }
            EtlError::ConfigError { .. } => {
                "Review the job file syntax against the documented format".to_string()
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and run again", field)
            }
            EtlError::MissingConfigError { field } => {
                format!(
                    "Provide '{}' on the command line or in the job file",
                    field
                )
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::SourceNotFound { path } => format!("Source file not found: {}", path),
            EtlError::ReadFailure { path, reason } => {
                format!("Could not read '{}': {}", path, reason)
            }
            EtlError::WriteFailure { path, reason } => {
                format!("Could not write '{}': {}", path, reason)
            }
            EtlError::IoError(e) => format!("File system error: {}", e),
            EtlError::SerializationError(e) => format!("Could not serialize output: {}", e),
            EtlError::ConfigError { message } => format!("Configuration problem: {}", message),
            EtlError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Invalid {} '{}': {}", field, value, reason),
            EtlError::MissingConfigError { field } => {
                format!("Missing required option: {}", field)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
