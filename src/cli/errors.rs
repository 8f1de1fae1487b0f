//! CLI errors
//!
//! Startup errors are fatal; per-line request errors are reported on stdout
//! and processing continues.

use std::io;

use thiserror::Error;

use crate::routing::RoutingError;

/// Which class of CLI failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    ConfigError,
    IoError,
    InvalidRequest,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "RWSPLIT_CLI_CONFIG_ERROR",
            Self::IoError => "RWSPLIT_CLI_IO_ERROR",
            Self::InvalidRequest => "RWSPLIT_CLI_INVALID_REQUEST",
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file or catalog rejected
    #[error("RWSPLIT_CLI_CONFIG_ERROR: {0}")]
    Config(String),

    /// stdin/stdout failure
    #[error("RWSPLIT_CLI_IO_ERROR: {0}")]
    Io(String),

    /// One request line could not be understood
    #[error("RWSPLIT_CLI_INVALID_REQUEST: {0}")]
    InvalidRequest(String),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn code(&self) -> CliErrorCode {
        match self {
            Self::Config(_) => CliErrorCode::ConfigError,
            Self::Io(_) => CliErrorCode::IoError,
            Self::InvalidRequest(_) => CliErrorCode::InvalidRequest,
        }
    }

    /// Stable code written to error response lines
    pub fn code_str(&self) -> &'static str {
        self.code().code()
    }

    /// Message without the code prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Config(m) | Self::Io(m) | Self::InvalidRequest(m) => m,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<RoutingError> for CliError {
    fn from(e: RoutingError) -> Self {
        Self::config_error(format!("{} ({})", e, e.code()))
    }
}

pub type CliResult<T> = Result<T, CliError>;
