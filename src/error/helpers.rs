use super::{ErrorCode, SitrepsError};

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to SitrepsError with context
    fn to_sitreps(self, context: impl Into<String>) -> Result<T, SitrepsError>;

    /// Convert to a configuration error
    fn to_config_error(self, message: impl Into<String>) -> Result<T, SitrepsError>;

    /// Convert to a parse error, used for CI logs and coverage payloads
    fn to_parse_error(self, message: impl Into<String>) -> Result<T, SitrepsError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_sitreps(self, context: impl Into<String>) -> Result<T, SitrepsError> {
        self.map_err(|e| SitrepsError::other(context).with_source(e))
    }

    fn to_config_error(self, message: impl Into<String>) -> Result<T, SitrepsError> {
        self.map_err(|e| SitrepsError::config(message).with_source(e))
    }

    fn to_parse_error(self, message: impl Into<String>) -> Result<T, SitrepsError> {
        self.map_err(|e| SitrepsError::other_with_code(ErrorCode::OTHER_PARSE, message).with_source(e))
    }
}
