//! Observability Guard
//!
//! Outermost stage. Counts outcomes and logs completion or failure with the
//! elapsed time. Never changes the result.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use crate::chain::pipeline::{Next, OperationResult};
use crate::observability::{log_event, Event, RoutingMetrics};
use crate::routing::{OperationDescriptor, RoutingContext};

use super::Guard;

/// Observability guard
pub struct ObserveGuard {
    metrics: Arc<RoutingMetrics>,
}

impl ObserveGuard {
    pub fn new(metrics: Arc<RoutingMetrics>) -> Self {
        Self { metrics }
    }
}

impl Guard for ObserveGuard {
    fn name(&self) -> &'static str {
        "observe"
    }

    fn process<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        Box::pin(async move {
            let started = Instant::now();
            let unit = ctx.unit_id().to_string();

            let result = next.run(op, ctx).await;

            self.metrics.record_outcome(result.is_ok());
            let duration_ms = started.elapsed().as_millis().to_string();
            match &result {
                Ok(_) => log_event(Event::OperationComplete, &[
                    ("duration_ms", duration_ms.as_str()),
                    ("operation", op.name()),
                    ("unit", unit.as_str()),
                ]),
                Err(e) => log_event(Event::OperationFailed, &[
                    ("code", e.code()),
                    ("duration_ms", duration_ms.as_str()),
                    ("error", e.message()),
                    ("operation", op.name()),
                    ("unit", unit.as_str()),
                ]),
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::testing::ProbeExecutor;
    use crate::chain::{ChainBuilder, DataAccessError};

    #[tokio::test]
    async fn test_outcomes_are_counted() {
        let metrics = Arc::new(RoutingMetrics::new());
        let chain = ChainBuilder::new()
            .with(ObserveGuard::new(Arc::clone(&metrics)))
            .build(Arc::clone(&metrics));
        let mut ctx = RoutingContext::new();
        let op = OperationDescriptor::new("findUser");

        chain.run(&op, &mut ctx, &ProbeExecutor::ok()).await.unwrap();
        let failed = chain
            .run(&op, &mut ctx, &ProbeExecutor::failing(DataAccessError::transient("reset")))
            .await;

        assert_eq!(failed.unwrap_err(), DataAccessError::transient("reset"));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.operations_succeeded, 1);
        assert_eq!(snapshot.operations_failed, 1);
    }
}
