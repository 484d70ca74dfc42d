use std::fmt::Display;
use thiserror::Error;

use crate::config::ConfigError;
use crate::executor::ExecutorError;
use crate::metrics::AggregationError;
use crate::query::{RegistryError, TemplateError};

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::ErrorExt;

/// The unified error type for sitreps
///
/// Module-level errors (`TemplateError`, `RegistryError`, ...) convert into
/// this type at the command boundary so the binary can report a stable code
/// and exit status.
#[derive(Error, Debug)]
pub enum SitrepsError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Template error: {message}")]
    Template {
        code: u16,
        message: String,
        parameter: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Filter registry error: {message}")]
    Registry {
        code: u16,
        message: String,
        filter: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Query execution error: {message}")]
    Executor {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Aggregation error: {message}")]
    Aggregation {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SitrepsError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a template error with specific code and parameter name
    pub fn template_with_code(
        code: u16,
        message: impl Into<String>,
        parameter: Option<String>,
    ) -> Self {
        Self::Template {
            code,
            message: message.into(),
            parameter,
            source: None,
        }
    }

    /// Create a registry error with specific code and filter name
    pub fn registry_with_code(code: u16, message: impl Into<String>, filter: Option<String>) -> Self {
        Self::Registry {
            code,
            message: message.into(),
            filter,
            source: None,
        }
    }

    /// Create an executor error with specific code
    pub fn executor_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Executor {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create an aggregation error with specific code
    pub fn aggregation_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Aggregation {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::other_with_code(ErrorCode::OTHER_GENERIC, message)
    }

    /// Create an other error with specific code
    pub fn other_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Other {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Template { source: src, .. }
            | Self::Registry { source: src, .. }
            | Self::Executor { source: src, .. }
            | Self::Aggregation { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Template { message, .. }
            | Self::Registry { message, .. }
            | Self::Executor { message, .. }
            | Self::Aggregation { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Template { .. } => 3,
            Self::Registry { .. } => 4,
            Self::Executor { .. } => 5,
            Self::Aggregation { .. } => 6,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Template { code, .. }
            | Self::Registry { code, .. }
            | Self::Executor { code, .. }
            | Self::Aggregation { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Template {
                message, parameter, ..
            } => match parameter {
                Some(name) => format!("Template parameter '{}': {}", name, message),
                None => format!("Template problem: {}", message),
            },
            Self::Registry { message, filter, .. } => match filter {
                Some(name) => format!("Filter '{}': {}", name, message),
                None => format!("Filter problem: {}", message),
            },
            Self::Executor { message, .. } => format!("Query failed: {}", message),
            Self::Aggregation { message, .. } => format!("Collection failed: {}", message),
            Self::Other { message, .. } => message.clone(),
        }
    }
}

impl From<ConfigError> for SitrepsError {
    fn from(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::NotFound(_) => ErrorCode::CONFIG_NOT_FOUND,
            ConfigError::Yaml { .. } | ConfigError::Parse(_) => ErrorCode::CONFIG_INVALID_YAML,
            ConfigError::Json { .. } => ErrorCode::CONFIG_INVALID_JSON,
            ConfigError::UnsupportedFormat(_) => ErrorCode::CONFIG_UNSUPPORTED_FORMAT,
            ConfigError::Empty(_) => ErrorCode::CONFIG_EMPTY,
            ConfigError::Validation(_) => ErrorCode::CONFIG_VALIDATION_FAILED,
            ConfigError::Io { .. } => ErrorCode::CONFIG_GENERIC,
        };
        SitrepsError::config_with_code(code, err.to_string()).with_source(err)
    }
}

impl From<TemplateError> for SitrepsError {
    fn from(err: TemplateError) -> Self {
        match &err {
            TemplateError::MissingParameter { name } => SitrepsError::template_with_code(
                ErrorCode::TEMPLATE_MISSING_PARAMETER,
                err.to_string(),
                Some(name.clone()),
            ),
            TemplateError::Malformed { .. } => {
                SitrepsError::template_with_code(ErrorCode::TEMPLATE_MALFORMED, err.to_string(), None)
            }
        }
    }
}

impl From<RegistryError> for SitrepsError {
    fn from(err: RegistryError) -> Self {
        match &err {
            RegistryError::DuplicateFilter(name) => SitrepsError::registry_with_code(
                ErrorCode::REGISTRY_DUPLICATE_FILTER,
                err.to_string(),
                Some(name.clone()),
            ),
            RegistryError::UnknownFilter(name) => SitrepsError::registry_with_code(
                ErrorCode::REGISTRY_UNKNOWN_FILTER,
                err.to_string(),
                Some(name.clone()),
            ),
        }
    }
}

impl From<ExecutorError> for SitrepsError {
    fn from(err: ExecutorError) -> Self {
        let code = match &err {
            ExecutorError::Authentication(_) => ErrorCode::EXECUTOR_AUTHENTICATION,
            ExecutorError::TransientService(_) => ErrorCode::EXECUTOR_TRANSIENT,
            ExecutorError::InvalidQuery(_) => ErrorCode::EXECUTOR_INVALID_QUERY,
        };
        SitrepsError::executor_with_code(code, err.to_string())
    }
}

impl From<AggregationError> for SitrepsError {
    fn from(err: AggregationError) -> Self {
        let code = match &err {
            AggregationError::EmptyRegistry => ErrorCode::AGGREGATION_EMPTY_REGISTRY,
            AggregationError::InvalidBaseTemplate(_) => {
                ErrorCode::AGGREGATION_INVALID_BASE_TEMPLATE
            }
            AggregationError::ServiceDisabled(_) => ErrorCode::AGGREGATION_SERVICE_DISABLED,
            AggregationError::MissingBaseQuery(_) => ErrorCode::AGGREGATION_MISSING_BASE_QUERY,
            AggregationError::InvalidFilters(_) => ErrorCode::AGGREGATION_INVALID_FILTERS,
        };
        SitrepsError::aggregation_with_code(code, err.to_string()).with_source(err)
    }
}

impl From<std::io::Error> for SitrepsError {
    fn from(err: std::io::Error) -> Self {
        SitrepsError::other_with_code(ErrorCode::OTHER_IO, err.to_string()).with_source(err)
    }
}

/// Result type alias using SitrepsError
pub type Result<T> = std::result::Result<T, SitrepsError>;
