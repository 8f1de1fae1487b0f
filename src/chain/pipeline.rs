//! Interception Chain
//!
//! Statically ordered guards wrapping one data-access call:
//! Observe → Transaction boundary → Explicit directive → Per-call → Execute
//!
//! The order is the `Vec` the builder produced; nothing is sorted at runtime.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::error::DataAccessResult;
use super::guards::directive::DirectiveGuard;
use super::guards::observe::ObserveGuard;
use super::guards::per_call::PerCallGuard;
use super::guards::transaction::TransactionGuard;
use super::guards::Guard;
use crate::observability::RoutingMetrics;
use crate::routing::{OperationDescriptor, PrecedenceResolver, RoutingContext};

/// Result of an operation
pub type OperationResult = DataAccessResult<Value>;

/// Next guard in chain
pub struct Next<'a> {
    guards: &'a [Arc<dyn Guard>],
    executor: &'a dyn OperationExecutor,
}

impl<'a> Next<'a> {
    /// Run the next guard or executor
    pub fn run(
        self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        Box::pin(async move {
            if let Some((first, rest)) = self.guards.split_first() {
                let next = Next {
                    guards: rest,
                    executor: self.executor,
                };
                first.process(op, ctx, next).await
            } else {
                // End of guard chain, execute operation
                self.executor.execute(op, ctx).await
            }
        })
    }
}

/// Operation executor (final stage of the chain)
///
/// Reads the decision left in the context by the guards.
pub trait OperationExecutor: Send + Sync {
    /// Execute the operation
    fn execute<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>>;
}

/// The interception chain
pub struct InterceptionChain {
    guards: Vec<Arc<dyn Guard>>,
    metrics: Arc<RoutingMetrics>,
}

impl InterceptionChain {
    /// Observe, transaction boundary, explicit directive, per-call.
    pub fn standard(resolver: PrecedenceResolver, metrics: Arc<RoutingMetrics>) -> Self {
        ChainBuilder::new()
            .with(ObserveGuard::new(Arc::clone(&metrics)))
            .with(TransactionGuard::new(Arc::clone(&metrics)))
            .with(DirectiveGuard::new(Arc::clone(&metrics)))
            .with(PerCallGuard::new(resolver))
            .build(metrics)
    }

    /// Run an operation through every guard, then the executor.
    ///
    /// The whole run is one unit-of-work scope on `ctx`: a stale entry is
    /// cleared on entry, and nothing set inside survives the outermost exit.
    pub fn run<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
        executor: &'a dyn OperationExecutor,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        Box::pin(async move {
            let mut scope = ctx.enter_observed(&self.metrics);
            let next = Next {
                guards: &self.guards,
                executor,
            };
            next.run(op, &mut scope).await
        })
    }

    /// Guard names, outermost first
    pub fn guard_names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    /// Get the number of guards
    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    /// Metrics shared by this chain
    pub fn metrics(&self) -> &Arc<RoutingMetrics> {
        &self.metrics
    }
}

/// Builder for chain construction
pub struct ChainBuilder {
    guards: Vec<Arc<dyn Guard>>,
}

impl ChainBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { guards: Vec::new() }
    }

    /// Append a guard inside the ones already added
    pub fn with(mut self, g: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(g));
        self
    }

    /// Build the chain
    pub fn build(self, metrics: Arc<RoutingMetrics>) -> InterceptionChain {
        InterceptionChain {
            guards: self.guards,
            metrics,
        }
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
