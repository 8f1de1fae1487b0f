//! Per-Call Guard
//!
//! Innermost routing guard. When no outer pin is active it resolves this
//! call's own decision and installs it for the duration of the call only.

use std::future::Future;
use std::pin::Pin;

use crate::chain::pipeline::{Next, OperationResult};
use crate::observability::{log_event, Event, Logger, Severity};
use crate::routing::{GuardKind, OperationDescriptor, PrecedenceResolver, RoutingContext};

use super::Guard;

/// Per-call guard
pub struct PerCallGuard {
    resolver: PrecedenceResolver,
}

impl PerCallGuard {
    pub fn new(resolver: PrecedenceResolver) -> Self {
        Self { resolver }
    }
}

impl Guard for PerCallGuard {
    fn name(&self) -> &'static str {
        "per-call"
    }

    fn process<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        Box::pin(async move {
            let inherited = ctx.decision().map_or(false, |d| d.is_pin());
            let decision = self.resolver.combine(ctx.decision(), op);

            if Logger::enabled(Severity::Trace) {
                let unit = ctx.unit_id().to_string();
                let reason = decision.reason.tag();
                let tier = decision.tier.value().to_string();
                log_event(Event::RouteDecided, &[
                    ("class", decision.endpoint_class.as_str()),
                    ("inherited", if inherited { "true" } else { "false" }),
                    ("operation", op.name()),
                    ("reason", reason.as_str()),
                    ("tier", tier.as_str()),
                    ("unit", unit.as_str()),
                ]);
            }

            if inherited {
                return next.run(op, ctx).await;
            }

            let mut pin = ctx.pin(decision, GuardKind::PerCall);
            next.run(op, &mut pin).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::testing::ProbeExecutor;
    use crate::chain::{ChainBuilder, InterceptionChain};
    use crate::observability::RoutingMetrics;
    use crate::routing::{EndpointClass, ForcePrimary, TransactionState};
    use std::sync::Arc;

    fn chain() -> InterceptionChain {
        ChainBuilder::new()
            .with(PerCallGuard::new(PrecedenceResolver::default()))
            .build(Arc::new(RoutingMetrics::new()))
    }

    #[tokio::test]
    async fn test_read_name_routes_to_replica() {
        let mut ctx = RoutingContext::new();
        let result = chain()
            .run(&OperationDescriptor::new("findUserById"), &mut ctx, &ProbeExecutor::ok())
            .await
            .unwrap();
        assert_eq!(result["class"], "replica");
        assert_eq!(result["reason"], "read-name");
    }

    #[tokio::test]
    async fn test_locking_select_routes_to_primary() {
        let mut ctx = RoutingContext::new();
        let op = OperationDescriptor::read("findUser", "SELECT * FROM users WHERE id = 1 FOR UPDATE");
        let result = chain().run(&op, &mut ctx, &ProbeExecutor::ok()).await.unwrap();
        assert_eq!(result["class"], "primary");
        assert_eq!(result["tier"], 1);
    }

    #[tokio::test]
    async fn test_resolves_higher_tiers_without_outer_guards() {
        let mut ctx = RoutingContext::new();
        let op = OperationDescriptor::new("findUser")
            .in_transaction(TransactionState::read_write());
        let result = chain().run(&op, &mut ctx, &ProbeExecutor::ok()).await.unwrap();
        assert_eq!(result["class"], "primary");
        assert_eq!(result["reason"], "write-transaction");

        let op = OperationDescriptor::new("findUser").with_directive(ForcePrimary::method().quiet());
        let result = chain().run(&op, &mut ctx, &ProbeExecutor::ok()).await.unwrap();
        assert_eq!(result["reason"], "directive:method");
    }

    #[tokio::test]
    async fn test_outer_pin_is_not_downgraded() {
        let mut ctx = RoutingContext::new();
        let mut pin = ctx.force_primary("batch");
        let op = OperationDescriptor::read("listOrders", "SELECT * FROM orders");

        let result = chain().run(&op, &mut pin, &ProbeExecutor::ok()).await.unwrap();
        assert_eq!(result["class"], "primary");
        assert_eq!(result["owner"], "scoped");
        assert!(pin.is_primary());
    }

    #[tokio::test]
    async fn test_manual_replica_does_not_outrank_a_write() {
        let mut ctx = RoutingContext::new();
        let mut scope = ctx.enter();
        scope.set(EndpointClass::Replica);

        let op = OperationDescriptor::write("saveOrder", "INSERT INTO orders VALUES (?)");
        let result = chain().run(&op, &mut scope, &ProbeExecutor::ok()).await.unwrap();
        assert_eq!(result["class"], "primary");
        assert_eq!(result["owner"], "per-call");
        assert!(scope.is_replica());
    }
}
