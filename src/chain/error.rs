//! Data Access Error Types
//!
//! Errors surfaced by the data-access collaborator. The engine only looks at
//! the kind to decide on recovery; the message is passed through unchanged.

use std::fmt;

/// Data-access error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAccessErrorKind {
    /// Connection reset, timeout, endpoint unavailable. Safe to re-run.
    Transient,

    /// Constraint violation, syntax error and the like. Re-running won't help.
    Permanent,

    /// Endpoint refused the operation (e.g. write sent to a read-only node)
    Rejected,
}

/// Data-access error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAccessError {
    kind: DataAccessErrorKind,
    message: String,
}

impl DataAccessError {
    /// Create a new error
    pub fn new(kind: DataAccessErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a transient error
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(DataAccessErrorKind::Transient, message)
    }

    /// Create a permanent error
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(DataAccessErrorKind::Permanent, message)
    }

    /// Create a rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(DataAccessErrorKind::Rejected, message)
    }

    /// Get the error kind
    pub fn kind(&self) -> DataAccessErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if re-running the operation may succeed
    pub fn is_transient(&self) -> bool {
        self.kind == DataAccessErrorKind::Transient
    }

    /// Get error code
    pub fn code(&self) -> &'static str {
        match self.kind {
            DataAccessErrorKind::Transient => "RWSPLIT_TRANSIENT",
            DataAccessErrorKind::Permanent => "RWSPLIT_PERMANENT",
            DataAccessErrorKind::Rejected => "RWSPLIT_REJECTED",
        }
    }
}

impl fmt::Display for DataAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl std::error::Error for DataAccessError {}

/// Data-access result type
pub type DataAccessResult<T> = Result<T, DataAccessError>;
