/// Error code registry for sitreps
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Template errors
/// - 3000-3999: Filter registry errors
/// - 4000-4999: Query executor errors
/// - 5000-5999: Aggregation errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_INVALID_JSON: u16 = 1003;
    pub const CONFIG_UNSUPPORTED_FORMAT: u16 = 1004;
    pub const CONFIG_EMPTY: u16 = 1005;
    pub const CONFIG_VALIDATION_FAILED: u16 = 1008;

    // Template errors (2000-2999)
    pub const TEMPLATE_MISSING_PARAMETER: u16 = 2001;
    pub const TEMPLATE_MALFORMED: u16 = 2002;

    // Filter registry errors (3000-3999)
    pub const REGISTRY_DUPLICATE_FILTER: u16 = 3001;
    pub const REGISTRY_UNKNOWN_FILTER: u16 = 3002;

    // Query executor errors (4000-4999)
    pub const EXECUTOR_AUTHENTICATION: u16 = 4001;
    pub const EXECUTOR_TRANSIENT: u16 = 4002;
    pub const EXECUTOR_INVALID_QUERY: u16 = 4003;

    // Aggregation errors (5000-5999)
    pub const AGGREGATION_EMPTY_REGISTRY: u16 = 5001;
    pub const AGGREGATION_INVALID_BASE_TEMPLATE: u16 = 5002;
    pub const AGGREGATION_SERVICE_DISABLED: u16 = 5003;
    pub const AGGREGATION_MISSING_BASE_QUERY: u16 = 5004;
    pub const AGGREGATION_INVALID_FILTERS: u16 = 5005;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_IO: u16 = 9001;
    pub const OTHER_PARSE: u16 = 9002;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_YAML => "Invalid YAML syntax in configuration",
        ErrorCode::CONFIG_INVALID_JSON => "Invalid JSON syntax in configuration",
        ErrorCode::CONFIG_UNSUPPORTED_FORMAT => "Configuration file must be YAML or JSON",
        ErrorCode::CONFIG_EMPTY => "Configuration file is empty",
        ErrorCode::CONFIG_VALIDATION_FAILED => "Configuration validation failed",

        ErrorCode::TEMPLATE_MISSING_PARAMETER => "Template placeholder has no parameter value",
        ErrorCode::TEMPLATE_MALFORMED => "Template syntax is malformed",

        ErrorCode::REGISTRY_DUPLICATE_FILTER => "Filter name registered more than once",
        ErrorCode::REGISTRY_UNKNOWN_FILTER => "Filter name not registered",

        ErrorCode::EXECUTOR_AUTHENTICATION => "Service rejected the credentials",
        ErrorCode::EXECUTOR_TRANSIENT => "Service temporarily unavailable",
        ErrorCode::EXECUTOR_INVALID_QUERY => "Service rejected the query",

        ErrorCode::AGGREGATION_EMPTY_REGISTRY => "No filters registered",
        ErrorCode::AGGREGATION_INVALID_BASE_TEMPLATE => "Base query template is malformed",
        ErrorCode::AGGREGATION_SERVICE_DISABLED => "Service has no url configured",
        ErrorCode::AGGREGATION_MISSING_BASE_QUERY => "Service has no base query configured",
        ErrorCode::AGGREGATION_INVALID_FILTERS => "Service filters could not be registered",

        ErrorCode::OTHER_GENERIC => "An error occurred",
        ErrorCode::OTHER_IO => "I/O error",
        ErrorCode::OTHER_PARSE => "Parse error",

        _ => "Unknown error",
    }
}
