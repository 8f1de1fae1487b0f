//! Observability events for rwsplit
//!
//! Every observable routing event is explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in rwsplit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Routing configuration file read and parsed
    ConfigLoaded,
    /// Endpoint catalog validated and built
    CatalogLoaded,
    /// Startup aborted (no endpoints, missing primary)
    CatalogRejected,

    // Decisions
    /// A routing decision was made for one operation
    RouteDecided,
    /// A replica-intended read resolved against the primary
    RouteDegraded,
    /// Transaction-boundary guard pinned the primary
    TransactionPinned,
    /// Explicit-directive guard pinned the primary
    DirectivePinned,
    /// Collaborator opened a scoped force-primary block
    ScopedPrimaryPinned,

    // Context hygiene
    /// A stale context entry was found at a unit-of-work boundary and cleared
    ContextLeakCleared,
    /// Context force-cleared on request
    ContextForceCleared,

    // Execution
    /// Operation completed
    OperationComplete,
    /// Operation failed
    OperationFailed,
    /// Replica failure re-run on the primary
    ReplicaFailover,
    /// Re-run on the primary failed as well
    ReplicaFailoverFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::CatalogRejected => "CATALOG_REJECTED",

            Event::RouteDecided => "ROUTE_DECIDED",
            Event::RouteDegraded => "ROUTE_DEGRADED",
            Event::TransactionPinned => "TRANSACTION_PINNED",
            Event::DirectivePinned => "DIRECTIVE_PINNED",
            Event::ScopedPrimaryPinned => "SCOPED_PRIMARY_PINNED",

            Event::ContextLeakCleared => "CONTEXT_LEAK_CLEARED",
            Event::ContextForceCleared => "CONTEXT_FORCE_CLEARED",

            Event::OperationComplete => "OPERATION_COMPLETE",
            Event::OperationFailed => "OPERATION_FAILED",
            Event::ReplicaFailover => "REPLICA_FAILOVER",
            Event::ReplicaFailoverFailed => "REPLICA_FAILOVER_FAILED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::CatalogRejected => Severity::Fatal,
            Event::ReplicaFailoverFailed | Event::OperationFailed => Severity::Error,
            Event::RouteDegraded
            | Event::ContextLeakCleared
            | Event::ContextForceCleared
            | Event::ReplicaFailover => Severity::Warn,
            Event::ConfigLoaded | Event::CatalogLoaded | Event::DirectivePinned => Severity::Info,
            Event::RouteDecided
            | Event::TransactionPinned
            | Event::ScopedPrimaryPinned
            | Event::OperationComplete => Severity::Trace,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::CatalogRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
