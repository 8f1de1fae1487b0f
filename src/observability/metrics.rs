//! Routing metrics for rwsplit
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of routing counters
///
/// All counters use atomic operations with Relaxed ordering; eventual
/// consistency is fine for metrics.
#[derive(Debug, Default)]
pub struct RoutingMetrics {
    /// Operations routed to the primary (including degraded ones)
    primary_routes: AtomicU64,
    /// Operations routed to a replica
    replica_routes: AtomicU64,
    /// Replica-intended reads resolved against the primary
    degraded_routes: AtomicU64,
    /// Transaction-boundary pins
    transaction_pins: AtomicU64,
    /// Explicit-directive pins
    directive_pins: AtomicU64,
    /// Stale context entries cleared at a boundary
    leaks_cleared: AtomicU64,
    /// Replica failures re-run on the primary
    replica_failovers: AtomicU64,
    /// Re-runs that failed as well
    failover_failures: AtomicU64,
    /// Operations that returned Ok
    operations_succeeded: AtomicU64,
    /// Operations that returned Err
    operations_failed: AtomicU64,
}

impl RoutingMetrics {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment primary routes
    pub fn increment_primary_routes(&self) {
        self.primary_routes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment replica routes
    pub fn increment_replica_routes(&self) {
        self.replica_routes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment degraded routes
    pub fn increment_degraded_routes(&self) {
        self.degraded_routes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment transaction pins
    pub fn increment_transaction_pins(&self) {
        self.transaction_pins.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment directive pins
    pub fn increment_directive_pins(&self) {
        self.directive_pins.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment leaks cleared
    pub fn increment_leaks_cleared(&self) {
        self.leaks_cleared.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment replica failovers
    pub fn increment_replica_failovers(&self) {
        self.replica_failovers.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failover failures
    pub fn increment_failover_failures(&self) {
        self.failover_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one operation
    pub fn record_outcome(&self, success: bool) {
        if success {
            self.operations_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.operations_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get degraded routes
    pub fn degraded_routes(&self) -> u64 {
        self.degraded_routes.load(Ordering::Relaxed)
    }

    /// Get replica failovers
    pub fn replica_failovers(&self) -> u64 {
        self.replica_failovers.load(Ordering::Relaxed)
    }

    /// Get current snapshot of all metrics as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            primary_routes: self.primary_routes.load(Ordering::Relaxed),
            replica_routes: self.replica_routes.load(Ordering::Relaxed),
            degraded_routes: self.degraded_routes.load(Ordering::Relaxed),
            transaction_pins: self.transaction_pins.load(Ordering::Relaxed),
            directive_pins: self.directive_pins.load(Ordering::Relaxed),
            leaks_cleared: self.leaks_cleared.load(Ordering::Relaxed),
            replica_failovers: self.replica_failovers.load(Ordering::Relaxed),
            failover_failures: self.failover_failures.load(Ordering::Relaxed),
            operations_succeeded: self.operations_succeeded.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub primary_routes: u64,
    pub replica_routes: u64,
    pub degraded_routes: u64,
    pub transaction_pins: u64,
    pub directive_pins: u64,
    pub leaks_cleared: u64,
    pub replica_failovers: u64,
    pub failover_failures: u64,
    pub operations_succeeded: u64,
    pub operations_failed: u64,
}
