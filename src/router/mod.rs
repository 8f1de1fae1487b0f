//! Router
//!
//! The surface data-access collaborators use:
//! - `resolve_endpoint`: one fresh decision, mapped to an endpoint
//! - `resolve_in`: same, honouring a pin already in a context
//! - `execute` / `execute_in`: run an operation through the interception chain
//! - `with_forced_primary`: a block of calls that must all hit the primary
//!
//! Built once at startup from a validated catalog; read-only afterwards and
//! safe to share between tasks.

mod executor;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use executor::DataAccess;

use executor::RoutedExecutor;

use crate::chain::{InterceptionChain, OperationResult};
use crate::observability::{log_event, Event, Logger, RoutingMetrics, Severity};
use crate::routing::{
    ContextPin, DataSourceSelector, EndpointCatalog, EndpointClass, FailureRecoveryPolicy,
    OperationDescriptor, PrecedenceResolver, Route, RoutingConfig, RoutingContext,
    RoutingDecision, RoutingResult, SignalClassifier,
};

/// Read/write router
pub struct Router {
    resolver: PrecedenceResolver,
    selector: DataSourceSelector,
    chain: InterceptionChain,
    policy: FailureRecoveryPolicy,
    metrics: Arc<RoutingMetrics>,
}

impl Router {
    /// Start building a router over a catalog.
    pub fn builder(catalog: EndpointCatalog) -> RouterBuilder {
        RouterBuilder::new(catalog)
    }

    /// Validate a configuration and build a router from it.
    pub fn from_config(config: &RoutingConfig) -> RoutingResult<Self> {
        let catalog = config.catalog()?;
        Ok(Self::builder(catalog)
            .unset_route(config.unset_route)
            .recovery(FailureRecoveryPolicy::from_flag(config.failover_to_primary))
            .build())
    }

    /// Endpoint for one operation, decided in isolation.
    pub fn resolve_endpoint(&self, op: &OperationDescriptor) -> Route<'_> {
        let decision = self.resolver.resolve(op);
        self.select(op, decision)
    }

    /// Endpoint for one operation inside an existing unit of work.
    ///
    /// A transaction or directive pin held by `ctx` is kept unless the
    /// operation's own decision outranks it.
    pub fn resolve_in(&self, ctx: &RoutingContext, op: &OperationDescriptor) -> Route<'_> {
        let decision = self.resolver.combine(ctx.decision(), op);
        self.select(op, decision)
    }

    fn select(&self, op: &OperationDescriptor, decision: RoutingDecision) -> Route<'_> {
        let route = self.selector.select(Some(&decision));
        if Logger::enabled(Severity::Trace) {
            let reason = decision.reason.tag();
            log_event(Event::RouteDecided, &[
                ("class", decision.endpoint_class.as_str()),
                ("endpoint", route.key()),
                ("operation", op.name()),
                ("reason", reason.as_str()),
            ]);
        }
        route
    }

    /// Run an operation as its own unit of work.
    pub async fn execute(
        &self,
        op: &OperationDescriptor,
        access: &dyn DataAccess,
    ) -> OperationResult {
        let mut ctx = RoutingContext::new();
        self.execute_in(&mut ctx, op, access).await
    }

    /// Run an operation inside an existing unit of work.
    ///
    /// Collaborators call this for nested operations so they inherit the
    /// enclosing pin. The context is back to its prior state when the
    /// returned future completes or is dropped.
    pub fn execute_in<'a>(
        &'a self,
        ctx: &'a mut RoutingContext,
        op: &'a OperationDescriptor,
        access: &'a dyn DataAccess,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        Box::pin(async move {
            let executor = RoutedExecutor {
                selector: &self.selector,
                policy: self.policy,
                metrics: &self.metrics,
                access,
            };
            self.chain.run(op, ctx, &executor).await
        })
    }

    /// Run `body` with every call it makes through `ctx` pinned to the primary.
    ///
    /// The prior context entry is restored when `body` finishes, fails,
    /// panics or is cancelled.
    pub async fn with_forced_primary<'a, F, T>(
        &self,
        ctx: &'a mut RoutingContext,
        reason: &str,
        body: F,
    ) -> T
    where
        F: for<'c> FnOnce(&'c mut ContextPin<'a>) -> Pin<Box<dyn Future<Output = T> + Send + 'c>>,
    {
        let mut pin = ctx.force_primary(reason);
        self.metrics.increment_directive_pins();
        body(&mut pin).await
    }

    /// Catalog the router selects from
    pub fn catalog(&self) -> &EndpointCatalog {
        self.selector.catalog()
    }

    /// Class used when no decision exists
    pub fn unset_route(&self) -> EndpointClass {
        self.selector.unset_route()
    }

    /// Failure recovery policy in effect
    pub fn recovery_policy(&self) -> FailureRecoveryPolicy {
        self.policy
    }

    /// Guard names, outermost first
    pub fn guard_names(&self) -> Vec<&'static str> {
        self.chain.guard_names()
    }

    /// Routing counters
    pub fn metrics(&self) -> &Arc<RoutingMetrics> {
        &self.metrics
    }
}

/// Builder for router construction
pub struct RouterBuilder {
    catalog: EndpointCatalog,
    classifier: SignalClassifier,
    unset_route: EndpointClass,
    policy: FailureRecoveryPolicy,
    metrics: Arc<RoutingMetrics>,
}

impl RouterBuilder {
    /// Create a new builder
    pub fn new(catalog: EndpointCatalog) -> Self {
        Self {
            catalog,
            classifier: SignalClassifier::new(),
            unset_route: EndpointClass::Replica,
            policy: FailureRecoveryPolicy::new(),
            metrics: Arc::new(RoutingMetrics::new()),
        }
    }

    /// Class used when no decision exists
    pub fn unset_route(mut self, class: EndpointClass) -> Self {
        self.unset_route = class;
        self
    }

    /// Failure recovery policy
    pub fn recovery(mut self, policy: FailureRecoveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shared metrics registry
    pub fn metrics(mut self, metrics: Arc<RoutingMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build the router with the standard guard order
    pub fn build(self) -> Router {
        let resolver = PrecedenceResolver::new(self.classifier);
        let selector = DataSourceSelector::new(Arc::new(self.catalog))
            .with_unset_route(self.unset_route)
            .with_metrics(Arc::clone(&self.metrics));
        let chain = InterceptionChain::standard(resolver, Arc::clone(&self.metrics));

        Router {
            resolver,
            selector,
            chain,
            policy: self.policy,
            metrics: self.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::DataAccessError;
    use crate::routing::{Endpoint, TransactionState};
    use serde_json::json;

    fn router(replicas: usize) -> Router {
        let mut endpoints = vec![Endpoint::new("primary", EndpointClass::Primary, "db://0")];
        for i in 1..=replicas {
            endpoints.push(Endpoint::new(
                format!("replica-{}", i),
                EndpointClass::Replica,
                format!("db://{}", i),
            ));
        }
        Router::builder(EndpointCatalog::new(endpoints).unwrap()).build()
    }

    /// Echoes the endpoint it was given.
    struct Echo;

    impl DataAccess for Echo {
        fn execute<'a>(
            &'a self,
            _op: &'a OperationDescriptor,
            route: &'a Route<'a>,
            _ctx: &'a mut RoutingContext,
        ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
            let endpoint = route.key().to_string();
            Box::pin(async move { Ok(json!({ "endpoint": endpoint })) })
        }
    }

    #[test]
    fn test_resolve_endpoint_read_and_write() {
        let router = router(1);
        assert_eq!(router.resolve_endpoint(&OperationDescriptor::new("findUser")).key(), "replica-1");
        assert_eq!(router.resolve_endpoint(&OperationDescriptor::new("saveUser")).key(), "primary");
    }

    #[test]
    fn test_resolve_in_keeps_outer_pin() {
        let router = router(1);
        let mut ctx = RoutingContext::new();
        let pin = ctx.force_primary("report");

        let route = router.resolve_in(&pin, &OperationDescriptor::new("findUser"));
        assert_eq!(route.key(), "primary");
    }

    #[test]
    fn test_from_config() {
        let config = RoutingConfig::from_json_str(
            r#"{"endpoints": {"primary": {"url": "db://0"}}, "unset_route": "primary", "failover_to_primary": false}"#,
        )
        .unwrap();
        let router = Router::from_config(&config).unwrap();
        assert_eq!(router.unset_route(), EndpointClass::Primary);
        assert!(!router.recovery_policy().is_enabled());
        assert_eq!(router.catalog().len(), 1);
        assert_eq!(
            router.guard_names(),
            vec!["observe", "transaction", "directive", "per-call"]
        );
    }

    #[tokio::test]
    async fn test_execute_routes_through_chain() {
        let router = router(2);
        let op = OperationDescriptor::read("listOrders", "SELECT * FROM orders")
            .in_transaction(TransactionState::read_write());

        let value = router.execute(&op, &Echo).await.unwrap();
        assert_eq!(value["endpoint"], "primary");
    }

    #[tokio::test]
    async fn test_with_forced_primary_block() {
        let router = router(2);
        let mut ctx = RoutingContext::new();
        let op = OperationDescriptor::new("findUser");

        let value = router
            .with_forced_primary(&mut ctx, "report", |scope| {
                let router = &router;
                let op = &op;
                Box::pin(async move { router.execute_in(scope, op, &Echo).await })
            })
            .await
            .unwrap();

        assert_eq!(value["endpoint"], "primary");
        assert_eq!(ctx.get(), None);
    }

    #[tokio::test]
    async fn test_forced_primary_failure_restores_context() {
        let router = router(1);
        let mut ctx = RoutingContext::new();

        let result: Result<(), DataAccessError> = router
            .with_forced_primary(&mut ctx, "failing", |_scope| {
                Box::pin(async move { Err(DataAccessError::permanent("boom")) })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(ctx.get(), None);
    }
}
