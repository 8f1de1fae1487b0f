//! Explicit-Directive Guard
//!
//! Pins the primary for a call whose operation (or enclosing type) carries a
//! force-primary directive, then restores whatever was there before.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::chain::pipeline::{Next, OperationResult};
use crate::observability::{log_event, Event, RoutingMetrics};
use crate::routing::{
    directive_decision, GuardKind, OperationDescriptor, PrecedenceTier, RoutingContext,
};

use super::Guard;

/// Explicit-directive guard
pub struct DirectiveGuard {
    metrics: Arc<RoutingMetrics>,
}

impl DirectiveGuard {
    pub fn new(metrics: Arc<RoutingMetrics>) -> Self {
        Self { metrics }
    }
}

impl Guard for DirectiveGuard {
    fn name(&self) -> &'static str {
        "directive"
    }

    fn process<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        Box::pin(async move {
            let (directive, decision) = match (op.directive(), directive_decision(op)) {
                (Some(directive), Some(decision)) => (directive, decision),
                _ => return next.run(op, ctx).await,
            };

            // Nothing outranks a directive already in place
            if ctx.decision().map_or(false, |d| d.tier == PrecedenceTier::Directive) {
                return next.run(op, ctx).await;
            }

            self.metrics.increment_directive_pins();
            if directive.log_enabled {
                let unit = ctx.unit_id().to_string();
                log_event(Event::DirectivePinned, &[
                    ("operation", op.name()),
                    ("reason", directive.reason.as_str()),
                    ("scope", directive.scope.as_str()),
                    ("unit", unit.as_str()),
                ]);
            }

            let mut pin = ctx.pin(decision, GuardKind::Directive);
            next.run(op, &mut pin).await
        })
    }
}
