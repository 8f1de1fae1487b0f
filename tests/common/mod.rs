//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use serde_json::json;

use rwsplit::chain::{DataAccessError, OperationResult};
use rwsplit::router::{DataAccess, Router};
use rwsplit::routing::{Endpoint, EndpointCatalog, EndpointClass, FailureRecoveryPolicy};
use rwsplit::{OperationDescriptor, Route, RoutingContext};

/// Catalog with one primary and `replicas` replicas named `replica-1..N`.
pub fn catalog(replicas: usize) -> EndpointCatalog {
    let mut endpoints = vec![Endpoint::new("primary", EndpointClass::Primary, "db://primary")];
    for i in 1..=replicas {
        endpoints.push(Endpoint::new(
            format!("replica-{}", i),
            EndpointClass::Replica,
            format!("db://replica-{}", i),
        ));
    }
    EndpointCatalog::new(endpoints).expect("valid catalog")
}

pub fn router(replicas: usize) -> Router {
    Router::builder(catalog(replicas)).build()
}

pub fn router_with(replicas: usize, policy: FailureRecoveryPolicy) -> Router {
    Router::builder(catalog(replicas)).recovery(policy).build()
}

/// One call observed by [`ScriptedAccess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: String,
    pub endpoint: String,
}

/// Data-access double: records every call and fails on demand.
pub struct ScriptedAccess {
    calls: Mutex<Vec<Call>>,
    replica_error: Option<DataAccessError>,
    primary_error: Option<DataAccessError>,
}

impl ScriptedAccess {
    pub fn healthy() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            replica_error: None,
            primary_error: None,
        }
    }

    pub fn failing_replicas(error: DataAccessError) -> Self {
        Self {
            replica_error: Some(error),
            ..Self::healthy()
        }
    }

    pub fn failing_primary(error: DataAccessError) -> Self {
        Self {
            primary_error: Some(error),
            ..Self::healthy()
        }
    }

    pub fn failing_everywhere(error: DataAccessError) -> Self {
        Self {
            replica_error: Some(error.clone()),
            primary_error: Some(error),
            ..Self::healthy()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }
}

impl DataAccess for ScriptedAccess {
    fn execute<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        route: &'a Route<'a>,
        _ctx: &'a mut RoutingContext,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>> {
        self.calls.lock().unwrap().push(Call {
            operation: op.name().to_string(),
            endpoint: route.key().to_string(),
        });
        let failure = if route.is_replica() {
            self.replica_error.clone()
        } else {
            self.primary_error.clone()
        };
        let endpoint = route.key().to_string();
        Box::pin(async move {
            match failure {
                Some(error) => Err(error),
                None => Ok(json!({ "endpoint": endpoint })),
            }
        })
    }
}
