//! Transaction-Boundary Guard
//!
//! Outermost routing guard. A write transaction pins the primary for the
//! whole call, including nested calls made through the same context. A
//! read-only transaction pins nothing and defers to the inner guards.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::chain::pipeline::{Next, OperationResult};
use crate::observability::{log_event, Event, RoutingMetrics};
use crate::routing::{
    transaction_decision, GuardKind, OperationDescriptor, PrecedenceTier, RoutingContext,
};

use super::Guard;

/// Transaction-boundary guard
pub struct TransactionGuard {
    metrics: Arc<RoutingMetrics>,
}

impl TransactionGuard {
    pub fn new(metrics: Arc<RoutingMetrics>) -> Self {
        Self { metrics }
    }
}

impl Guard for TransactionGuard {
    fn name(&self) -> &'static str {
        "transaction"
    }

    fn process<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        Box::pin(async move {
            // An enclosing transaction or directive already holds the primary
            let already_pinned = ctx
                .decision()
                .map_or(false, |d| d.tier >= PrecedenceTier::Transaction);

            let decision = match transaction_decision(op) {
                Some(decision) if !already_pinned => decision,
                _ => return next.run(op, ctx).await,
            };

            self.metrics.increment_transaction_pins();
            let unit = ctx.unit_id().to_string();
            log_event(Event::TransactionPinned, &[
                ("operation", op.name()),
                ("unit", unit.as_str()),
            ]);

            let mut pin = ctx.pin(decision, GuardKind::Transaction);
            next.run(op, &mut pin).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::testing::ProbeExecutor;
    use crate::chain::ChainBuilder;
    use crate::routing::{RoutingDecision, DecisionReason, TransactionState};

    fn chain(metrics: &Arc<RoutingMetrics>) -> crate::chain::InterceptionChain {
        ChainBuilder::new()
            .with(TransactionGuard::new(Arc::clone(metrics)))
            .build(Arc::clone(metrics))
    }

    #[tokio::test]
    async fn test_write_transaction_pins_primary() {
        let metrics = Arc::new(RoutingMetrics::new());
        let chain = chain(&metrics);
        let mut ctx = RoutingContext::new();
        let op = OperationDescriptor::new("findUser").in_transaction(TransactionState::read_write());

        let result = chain.run(&op, &mut ctx, &ProbeExecutor::ok()).await.unwrap();
        assert_eq!(result["class"], "primary");
        assert_eq!(result["tier"], 2);
        assert_eq!(metrics.snapshot().transaction_pins, 1);
        assert_eq!(ctx.get(), None);
    }

    #[tokio::test]
    async fn test_read_only_transaction_pins_nothing() {
        let metrics = Arc::new(RoutingMetrics::new());
        let chain = chain(&metrics);
        let mut ctx = RoutingContext::new();
        let op = OperationDescriptor::new("findUser").in_transaction(TransactionState::read_only());

        let result = chain.run(&op, &mut ctx, &ProbeExecutor::ok()).await.unwrap();
        assert_eq!(result["class"], "unset");
        assert_eq!(metrics.snapshot().transaction_pins, 0);
    }

    #[tokio::test]
    async fn test_existing_directive_pin_is_kept() {
        let metrics = Arc::new(RoutingMetrics::new());
        let chain = chain(&metrics);
        let mut ctx = RoutingContext::new();
        let mut outer = ctx.pin(
            RoutingDecision::forced_primary(DecisionReason::ScopedPrimary),
            GuardKind::Scoped,
        );
        let op = OperationDescriptor::new("saveUser").in_transaction(TransactionState::read_write());

        let result = chain.run(&op, &mut outer, &ProbeExecutor::ok()).await.unwrap();
        assert_eq!(result["owner"], "scoped");
        assert_eq!(metrics.snapshot().transaction_pins, 0);
    }
}
