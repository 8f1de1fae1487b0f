//! # Routing Errors
//!
//! Startup and configuration errors. All of them are fatal: a router is
//! never built from a catalog that failed validation.

use thiserror::Error;

/// Result type for routing setup
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Routing setup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    // ==================
    // Catalog Errors
    // ==================

    /// No endpoints configured at all
    #[error("No endpoints configured")]
    NoEndpoints,

    /// Endpoints configured but none is the primary
    #[error("No primary endpoint configured")]
    MissingPrimary,

    /// More than one endpoint claims the primary role
    #[error("Multiple primary endpoints configured: {0} and {1}")]
    MultiplePrimaries(String, String),

    /// Key carries no role and none can be inferred from it
    #[error("Cannot infer role for endpoint '{0}'; set \"role\" explicitly")]
    UnknownEndpointRole(String),

    /// Endpoint parameters are unusable
    #[error("Invalid endpoint '{key}': {reason}")]
    InvalidEndpoint { key: String, reason: String },

    // ==================
    // Config File Errors
    // ==================

    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    ConfigIo(String),

    /// Config file is not valid JSON for the expected shape
    #[error("Invalid config JSON: {0}")]
    ConfigParse(String),
}

impl RoutingError {
    /// Create an invalid endpoint error
    pub fn invalid_endpoint(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoEndpoints => "RWSPLIT_NO_ENDPOINTS",
            Self::MissingPrimary => "RWSPLIT_MISSING_PRIMARY",
            Self::MultiplePrimaries(..) => "RWSPLIT_MULTIPLE_PRIMARIES",
            Self::UnknownEndpointRole(_) => "RWSPLIT_UNKNOWN_ENDPOINT_ROLE",
            Self::InvalidEndpoint { .. } => "RWSPLIT_INVALID_ENDPOINT",
            Self::ConfigIo(_) => "RWSPLIT_CONFIG_IO",
            Self::ConfigParse(_) => "RWSPLIT_CONFIG_PARSE",
        }
    }
}
