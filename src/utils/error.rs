use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Network error while requesting {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} returned by {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Response from {url} is not valid JSON: {source}")]
    DecodeError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected response shape from {url}: {field} {message}")]
    SchemaError {
        url: String,
        field: String,
        message: String,
    },

    #[error("Paging metadata from {url} asks for {requested} follow-up pages, limit is {limit}")]
    PaginationBoundError {
        url: String,
        requested: u64,
        limit: u64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Output serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Unknown script: {name}")]
    UnknownScript { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Data,
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

impl ProbeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProbeError::NetworkError { .. } => ErrorCategory::Network,
            ProbeError::HttpStatusError { .. } => ErrorCategory::Remote,
            ProbeError::DecodeError { .. }
            | ProbeError::SchemaError { .. }
            | ProbeError::PaginationBoundError { .. } => ErrorCategory::Data,
            ProbeError::IoError(_) | ProbeError::SerializationError(_) => ErrorCategory::System,
            ProbeError::ConfigError { .. }
            | ProbeError::InvalidConfigValueError { .. }
            | ProbeError::ConfigValidationError { .. }
            | ProbeError::UnknownScript { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路與 5xx 錯誤通常重試即可
            ProbeError::NetworkError { .. } => ErrorSeverity::Medium,
            ProbeError::HttpStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            ProbeError::HttpStatusError { .. } => ErrorSeverity::High,
            ProbeError::DecodeError { .. }
            | ProbeError::SchemaError { .. }
            | ProbeError::PaginationBoundError { .. } => ErrorSeverity::High,
            ProbeError::IoError(_) | ProbeError::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 是否值得重試（只有網路層錯誤）
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProbeError::NetworkError { .. })
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ProbeError::NetworkError { .. } => {
                "Check network connectivity and the base URL, or raise --retry-attempts / --timeout-secs".to_string()
            }
            ProbeError::HttpStatusError { status, .. } if *status == 404 => {
                "The endpoint path does not exist on this API; check the endpoint name and ids".to_string()
            }
            ProbeError::HttpStatusError { status, .. } if *status >= 500 => {
                "The API is failing server-side; try again later".to_string()
            }
            ProbeError::HttpStatusError { .. } => {
                "The API rejected the request; check query parameters and app_id".to_string()
            }
            ProbeError::DecodeError { .. } => {
                "The endpoint did not return JSON; make sure the base URL points at the JSON API".to_string()
            }
            ProbeError::SchemaError { field, .. } => format!(
                "The response has no usable '{}'; this endpoint may not be paged, run it without pagination",
                field
            ),
            ProbeError::PaginationBoundError { limit, .. } => format!(
                "Raise --max-pages above {} if you really want to follow every page",
                limit
            ),
            ProbeError::IoError(_) => "Check file permissions and that the path exists".to_string(),
            ProbeError::SerializationError(_) => "Report this as a bug".to_string(),
            ProbeError::ConfigError { .. }
            | ProbeError::ConfigValidationError { .. }
            | ProbeError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            ProbeError::UnknownScript { .. } => {
                "Use a built-in script (lender-search, newest-loans) or one defined in --config".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProbeError::NetworkError { url, .. } => format!("Could not reach {}", url),
            ProbeError::HttpStatusError { url, status } => {
                format!("Request to {} failed with HTTP {}", url, status)
            }
            ProbeError::DecodeError { url, .. } => format!("{} returned a body that is not JSON", url),
            ProbeError::SchemaError { url, field, .. } => {
                format!("{} returned JSON without a valid '{}'", url, field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
