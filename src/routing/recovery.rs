//! Failure Recovery Policy
//!
//! A replica-routed operation that fails transiently is re-run once, in
//! full, on the primary. Anything else propagates unchanged. Primary-routed
//! operations are never retried on a replica.

use super::selector::Route;
use crate::chain::DataAccessError;

/// What to do with a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Re-run the whole operation with the context pinned to the primary
    RetryOnPrimary,
    /// Return the error to the caller
    Propagate,
}

/// Replica failure recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecoveryPolicy {
    enabled: bool,
}

impl FailureRecoveryPolicy {
    /// Retry transient replica failures on the primary.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Never retry.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Policy from the `failover_to_primary` setting.
    pub fn from_flag(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if retries are enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide how to handle a failure of an operation sent along `route`.
    ///
    /// Only the endpoint actually used counts: a replica request degraded to
    /// the primary already ran on the primary and is not retried.
    pub fn on_failure(&self, route: &Route<'_>, error: &DataAccessError) -> RecoveryAction {
        if self.enabled && route.is_replica() && error.is_transient() {
            RecoveryAction::RetryOnPrimary
        } else {
            RecoveryAction::Propagate
        }
    }
}

impl Default for FailureRecoveryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
