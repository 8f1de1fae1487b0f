//! Operation Descriptor
//!
//! Read-only snapshot of one data-access call, supplied by the collaborator
//! that invokes the operation. Force-primary directives are an explicit
//! capability on the descriptor, resolved once at the call site.

use serde::{Deserialize, Serialize};

use super::types::SqlCommand;

/// Where a force-primary directive was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveScope {
    /// Declared on the invoked operation itself
    Method,
    /// Declared on the enclosing type and inherited by its operations
    Type,
}

impl DirectiveScope {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveScope::Method => "method",
            DirectiveScope::Type => "type",
        }
    }
}

fn default_directive_reason() -> String {
    "force primary".to_string()
}

fn default_log_enabled() -> bool {
    true
}

/// Explicit requirement that an operation run against the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcePrimary {
    /// Declaration scope
    pub scope: DirectiveScope,

    /// Human-readable justification carried into logs
    #[serde(default = "default_directive_reason")]
    pub reason: String,

    /// Whether each pinned call is logged at INFO
    #[serde(default = "default_log_enabled")]
    pub log_enabled: bool,
}

impl ForcePrimary {
    /// Directive declared on the operation.
    pub fn method() -> Self {
        Self::new(DirectiveScope::Method)
    }

    /// Directive declared on the enclosing type.
    pub fn on_type() -> Self {
        Self::new(DirectiveScope::Type)
    }

    fn new(scope: DirectiveScope) -> Self {
        Self {
            scope,
            reason: default_directive_reason(),
            log_enabled: default_log_enabled(),
        }
    }

    /// Attach a justification.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Suppress the per-call INFO log line.
    pub fn quiet(mut self) -> Self {
        self.log_enabled = false;
        self
    }
}

/// Ambient transaction state at the time of the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    /// Transaction was opened read-only
    #[serde(default)]
    pub read_only: bool,
}

impl TransactionState {
    /// A read-write transaction.
    pub fn read_write() -> Self {
        Self { read_only: false }
    }

    /// A transaction marked read-only.
    pub fn read_only() -> Self {
        Self { read_only: true }
    }

    /// A write transaction pins the primary; a read-only one does not.
    pub fn is_write(&self) -> bool {
        !self.read_only
    }
}

/// Snapshot describing one data-access call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Logical operation name, optionally `Type.method` qualified
    name: String,

    /// Raw SQL text, when the statement layer exposes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sql: Option<String>,

    /// Reported command kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<SqlCommand>,

    /// Force-primary directive, method scope preferred over type scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    directive: Option<ForcePrimary>,

    /// Active ambient transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transaction: Option<TransactionState>,
}

impl OperationDescriptor {
    /// Describe an operation known only by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: None,
            command: None,
            directive: None,
            transaction: None,
        }
    }

    /// Describe a statement whose command kind is reported as READ.
    pub fn read(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(name).with_sql(sql).with_command(SqlCommand::Read)
    }

    /// Describe a statement whose command kind is reported as WRITE.
    pub fn write(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(name).with_sql(sql).with_command(SqlCommand::Write)
    }

    /// Attach raw SQL text.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    /// Attach the command kind.
    pub fn with_command(mut self, command: SqlCommand) -> Self {
        self.command = Some(command);
        self
    }

    /// Attach a force-primary directive.
    ///
    /// A method-scoped directive already present is never replaced by a
    /// type-scoped one.
    pub fn with_directive(mut self, directive: ForcePrimary) -> Self {
        let keep_existing = matches!(
            (&self.directive, directive.scope),
            (Some(existing), DirectiveScope::Type) if existing.scope == DirectiveScope::Method
        );
        if !keep_existing {
            self.directive = Some(directive);
        }
        self
    }

    /// Shorthand for a method-scoped directive.
    pub fn force_primary(self) -> Self {
        self.with_directive(ForcePrimary::method())
    }

    /// Mark the call as running inside an ambient transaction.
    pub fn in_transaction(mut self, transaction: TransactionState) -> Self {
        self.transaction = Some(transaction);
        self
    }

    /// Logical operation name as supplied.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unqualified method segment of the name (after the last `.` or `::`).
    pub fn method_name(&self) -> &str {
        let name = self.name.as_str();
        let after_colons = name.rsplit("::").next().unwrap_or(name);
        after_colons.rsplit('.').next().unwrap_or(after_colons)
    }

    /// Raw SQL text, if any. Blank text counts as absent.
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Reported command kind, if any.
    pub fn command(&self) -> Option<SqlCommand> {
        self.command
    }

    /// Force-primary directive, if any.
    pub fn directive(&self) -> Option<&ForcePrimary> {
        self.directive.as_ref()
    }

    /// Ambient transaction, if any.
    pub fn transaction(&self) -> Option<TransactionState> {
        self.transaction
    }

    /// Whether the call runs inside a transaction that is not read-only.
    pub fn in_write_transaction(&self) -> bool {
        self.transaction.map(|t| t.is_write()).unwrap_or(false)
    }
}
