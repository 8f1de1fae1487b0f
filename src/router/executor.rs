//! Routed Executor
//!
//! Terminal chain stage: turns the decision left in the context into an
//! endpoint, hands the call to the data-access collaborator, and applies the
//! replica failure recovery policy.

use std::future::Future;
use std::pin::Pin;

use crate::chain::{OperationExecutor, OperationResult};
use crate::observability::{log_event, Event, RoutingMetrics};
use crate::routing::{
    DataSourceSelector, DecisionReason, FailureRecoveryPolicy, GuardKind, OperationDescriptor,
    RecoveryAction, Route, RoutingContext, RoutingDecision,
};

/// The collaborator that actually talks to the database.
///
/// It receives the selected route and the live context, so calls it makes
/// through the same router while handling `op` inherit any pin.
pub trait DataAccess: Send + Sync {
    /// Run `op` against `route.endpoint`
    fn execute<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        route: &'a Route<'a>,
        ctx: &'a mut RoutingContext,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>>;
}

/// Executor bound to one collaborator for one call.
pub(crate) struct RoutedExecutor<'r> {
    pub(crate) selector: &'r DataSourceSelector,
    pub(crate) policy: FailureRecoveryPolicy,
    pub(crate) metrics: &'r RoutingMetrics,
    pub(crate) access: &'r dyn DataAccess,
}

impl OperationExecutor for RoutedExecutor<'_> {
    fn execute<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        Box::pin(async move {
            let route = self.selector.select(ctx.decision());
            let error = match self.access.execute(op, &route, ctx).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if self.policy.on_failure(&route, &error) == RecoveryAction::Propagate {
                return Err(error);
            }

            self.metrics.increment_replica_failovers();
            let unit = ctx.unit_id().to_string();
            log_event(Event::ReplicaFailover, &[
                ("code", error.code()),
                ("endpoint", route.key()),
                ("error", error.message()),
                ("operation", op.name()),
                ("unit", unit.as_str()),
            ]);

            // Re-run the whole operation; nested calls see the primary too
            let mut pin = ctx.pin(
                RoutingDecision::forced_primary(DecisionReason::ReplicaFailover),
                GuardKind::Failover,
            );
            let retry_route = self.selector.select(pin.decision());
            let retried = self.access.execute(op, &retry_route, &mut pin).await;

            if let Err(retry_error) = &retried {
                self.metrics.increment_failover_failures();
                log_event(Event::ReplicaFailoverFailed, &[
                    ("code", retry_error.code()),
                    ("endpoint", retry_route.key()),
                    ("error", retry_error.message()),
                    ("operation", op.name()),
                    ("unit", unit.as_str()),
                ]);
            }
            retried
        })
    }
}
