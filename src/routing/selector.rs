//! Data Source Selector
//!
//! Maps a routing decision onto one concrete endpoint of the catalog:
//! - Primary → the single primary
//! - Replica → uniform random pick among replicas, no stickiness
//! - Replica with no replicas → the primary, recorded as degraded
//! - No decision → the configured default (replica with fallback unless
//!   declared otherwise)

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use super::catalog::{Endpoint, EndpointCatalog};
use super::precedence::RoutingDecision;
use super::types::EndpointClass;
use crate::observability::{log_event, Event, RoutingMetrics};

/// Why a route did not land on the requested class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegradeReason {
    /// Replica requested but the catalog has none
    NoReplicaAvailable,
}

impl DegradeReason {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradeReason::NoReplicaAvailable => "no-replica-available",
        }
    }
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Selected endpoint for one operation.
#[derive(Debug, Clone)]
pub struct Route<'a> {
    /// Chosen endpoint
    pub endpoint: &'a Endpoint,
    /// Class asked for, after applying the unset default
    pub requested: EndpointClass,
    /// Decision that produced the request, `None` when the context was unset
    pub decision: Option<RoutingDecision>,
    /// Set when the route fell back to the primary
    pub degraded: Option<DegradeReason>,
}

impl Route<'_> {
    /// Endpoint key, the value handed to the connection layer
    pub fn key(&self) -> &str {
        self.endpoint.key()
    }

    /// Class of the endpoint actually chosen
    pub fn class(&self) -> EndpointClass {
        self.endpoint.class()
    }

    /// Check if the chosen endpoint is a replica
    pub fn is_replica(&self) -> bool {
        self.class().is_replica()
    }

    /// Check if this route fell back to the primary
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Endpoint selector over an immutable catalog.
#[derive(Debug, Clone)]
pub struct DataSourceSelector {
    catalog: Arc<EndpointCatalog>,
    unset_route: EndpointClass,
    metrics: Arc<RoutingMetrics>,
}

impl DataSourceSelector {
    /// Create a selector. Unset decisions go to a replica.
    pub fn new(catalog: Arc<EndpointCatalog>) -> Self {
        Self {
            catalog,
            unset_route: EndpointClass::Replica,
            metrics: Arc::new(RoutingMetrics::new()),
        }
    }

    /// Declare the class used when no decision exists.
    pub fn with_unset_route(mut self, class: EndpointClass) -> Self {
        self.unset_route = class;
        self
    }

    /// Count routes in a shared registry.
    pub fn with_metrics(mut self, metrics: Arc<RoutingMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The catalog this selector reads
    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    /// Class used when no decision exists
    pub fn unset_route(&self) -> EndpointClass {
        self.unset_route
    }

    /// Select an endpoint using the thread-local RNG.
    pub fn select(&self, decision: Option<&RoutingDecision>) -> Route<'_> {
        self.select_with(decision, &mut rand::thread_rng())
    }

    /// Select an endpoint with a caller-supplied RNG.
    pub fn select_with<R: Rng>(
        &self,
        decision: Option<&RoutingDecision>,
        rng: &mut R,
    ) -> Route<'_> {
        let requested = decision.map_or(self.unset_route, |d| d.endpoint_class);
        let replicas = self.catalog.replicas();

        let (endpoint, degraded) = match requested {
            EndpointClass::Primary => (self.catalog.primary(), None),
            EndpointClass::Replica if replicas.is_empty() => {
                (self.catalog.primary(), Some(DegradeReason::NoReplicaAvailable))
            }
            EndpointClass::Replica => (&replicas[rng.gen_range(0..replicas.len())], None),
        };

        match endpoint.class() {
            EndpointClass::Primary => self.metrics.increment_primary_routes(),
            EndpointClass::Replica => self.metrics.increment_replica_routes(),
        }
        if let Some(reason) = degraded {
            self.metrics.increment_degraded_routes();
            log_event(Event::RouteDegraded, &[
                ("endpoint", endpoint.key()),
                ("reason", reason.as_str()),
            ]);
        }

        Route {
            endpoint,
            requested,
            decision: decision.cloned(),
            degraded,
        }
    }
}
