//! Routing Vocabulary
//!
//! Small value types shared by every routing stage: the endpoint class an
//! operation lands on, the SQL command kind reported by the data-access layer,
//! and the read/write access kind produced by classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Class of physical endpoint an operation is routed to.
///
/// An unset context is modelled as `Option<EndpointClass>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointClass {
    /// The single writable endpoint
    Primary,
    /// A read-only, asynchronously replicated copy
    Replica,
}

impl EndpointClass {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointClass::Primary => "primary",
            EndpointClass::Replica => "replica",
        }
    }

    /// Check if this is the primary class.
    pub fn is_primary(&self) -> bool {
        matches!(self, EndpointClass::Primary)
    }

    /// Check if this is the replica class.
    pub fn is_replica(&self) -> bool {
        matches!(self, EndpointClass::Replica)
    }
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// SQL command kind as reported by the statement layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlCommand {
    /// SELECT and other row-returning statements
    Read,
    /// INSERT, UPDATE, DELETE
    Write,
    /// Stored procedure calls, DDL, anything else
    Unknown,
}

impl SqlCommand {
    /// Infer the command kind from the leading keyword of a statement.
    ///
    /// Leading whitespace, parentheses and comments are skipped. Anything that
    /// is not recognisably a read or a DML write is `Unknown`.
    pub fn infer(sql: &str) -> Self {
        let keyword = leading_keyword(sql).to_ascii_uppercase();
        match keyword.as_str() {
            "EXPLAIN" if explain_executes_write(sql) => SqlCommand::Unknown,
            "SELECT" | "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" => SqlCommand::Read,
            "INSERT" | "UPDATE" | "DELETE" | "REPLACE" | "MERGE" | "UPSERT" => SqlCommand::Write,
            _ => SqlCommand::Unknown,
        }
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlCommand::Read => "read",
            SqlCommand::Write => "write",
            SqlCommand::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SqlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First keyword of a statement, skipping whitespace, `(` and SQL comments.
fn leading_keyword(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map(|(_, tail)| tail).unwrap_or("");
        } else {
            break;
        }
    }
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    &rest[..end]
}

const WRITE_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE", "REPLACE", "MERGE", "UPSERT"];

/// `EXPLAIN ANALYZE` runs the statement it explains.
fn explain_executes_write(sql: &str) -> bool {
    let words: Vec<String> = sql
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_uppercase)
        .collect();
    let analyzes = words.iter().any(|w| w == "ANALYZE" || w == "ANALYSE");
    analyzes && words.iter().any(|w| WRITE_KEYWORDS.contains(&w.as_str()))
}

/// Read/write access kind produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    /// Endpoint class this access kind routes to when nothing outranks it.
    pub fn endpoint_class(&self) -> EndpointClass {
        match self {
            AccessKind::Read => EndpointClass::Replica,
            AccessKind::Write => EndpointClass::Primary,
        }
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
