//! Endpoint Catalog
//!
//! Ordered set of named physical endpoints, each tagged primary or replica.
//! Exactly one endpoint is the primary; zero or more are replicas.
//! Immutable after construction and safe to read concurrently.

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::{RoutingError, RoutingResult};
use super::types::EndpointClass;

/// One physical endpoint. Connection parameters are opaque to routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    key: String,
    class: EndpointClass,
    url: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
}

impl Endpoint {
    /// Create an endpoint with no extra properties.
    pub fn new(key: impl Into<String>, class: EndpointClass, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            class,
            url: url.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Attach connection properties.
    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    /// Logical key, e.g. `primary` or `replica-2`
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Role of this endpoint
    pub fn class(&self) -> EndpointClass {
        self.class
    }

    /// Connection URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Extra connection properties
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

/// Validated endpoint catalog.
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    primary: Endpoint,
    replicas: Vec<Endpoint>,
}

impl EndpointCatalog {
    /// Build a catalog, ordering endpoints by key.
    ///
    /// Fails when the list is empty, has no primary, has more than one
    /// primary, or reuses a key.
    pub fn new(endpoints: Vec<Endpoint>) -> RoutingResult<Self> {
        if endpoints.is_empty() {
            return Err(RoutingError::NoEndpoints);
        }

        let mut by_key: BTreeMap<String, Endpoint> = BTreeMap::new();
        for endpoint in endpoints {
            if endpoint.url.trim().is_empty() {
                return Err(RoutingError::invalid_endpoint(&endpoint.key, "url is empty"));
            }
            if by_key.contains_key(&endpoint.key) {
                return Err(RoutingError::invalid_endpoint(&endpoint.key, "duplicate key"));
            }
            by_key.insert(endpoint.key.clone(), endpoint);
        }

        let mut primary: Option<Endpoint> = None;
        let mut replicas = Vec::new();
        for endpoint in by_key.into_values() {
            match endpoint.class {
                EndpointClass::Primary => {
                    if let Some(existing) = &primary {
                        return Err(RoutingError::MultiplePrimaries(
                            existing.key.clone(),
                            endpoint.key,
                        ));
                    }
                    primary = Some(endpoint);
                }
                EndpointClass::Replica => replicas.push(endpoint),
            }
        }

        let primary = primary.ok_or(RoutingError::MissingPrimary)?;
        Ok(Self { primary, replicas })
    }

    /// The single primary endpoint
    pub fn primary(&self) -> &Endpoint {
        &self.primary
    }

    /// Replica endpoints, ordered by key
    pub fn replicas(&self) -> &[Endpoint] {
        &self.replicas
    }

    /// Check if at least one replica is configured
    pub fn has_replicas(&self) -> bool {
        !self.replicas.is_empty()
    }

    /// Look up an endpoint by key
    pub fn get(&self, key: &str) -> Option<&Endpoint> {
        if self.primary.key == key {
            return Some(&self.primary);
        }
        self.replicas.iter().find(|e| e.key == key)
    }

    /// Total number of endpoints
    pub fn len(&self) -> usize {
        1 + self.replicas.len()
    }

    /// Always false: a valid catalog has a primary
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All endpoints, primary first
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        std::iter::once(&self.primary).chain(self.replicas.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> Endpoint {
        Endpoint::new("primary", EndpointClass::Primary, "postgres://db-0/app")
    }

    fn replica(key: &str) -> Endpoint {
        Endpoint::new(key, EndpointClass::Replica, format!("postgres://{}/app", key))
    }

    #[test]
    fn test_catalog_orders_replicas_by_key() {
        let catalog =
            EndpointCatalog::new(vec![replica("replica-2"), primary(), replica("replica-1")]).unwrap();

        assert_eq!(catalog.primary().key(), "primary");
        let keys: Vec<_> = catalog.replicas().iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["replica-1", "replica-2"]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.has_replicas());
    }

    #[test]
    fn test_primary_only_catalog() {
        let catalog = EndpointCatalog::new(vec![primary()]).unwrap();
        assert!(!catalog.has_replicas());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(EndpointCatalog::new(vec![]).unwrap_err(), RoutingError::NoEndpoints);
    }

    #[test]
    fn test_missing_primary_rejected() {
        let err = EndpointCatalog::new(vec![replica("replica-1")]).unwrap_err();
        assert_eq!(err, RoutingError::MissingPrimary);
    }

    #[test]
    fn test_multiple_primaries_rejected() {
        let second = Endpoint::new("master", EndpointClass::Primary, "postgres://db-9/app");
        let err = EndpointCatalog::new(vec![primary(), second]).unwrap_err();
        assert_eq!(
            err,
            RoutingError::MultiplePrimaries("master".into(), "primary".into())
        );
    }

    #[test]
    fn test_empty_url_rejected() {
        let bad = Endpoint::new("replica-1", EndpointClass::Replica, "  ");
        let err = EndpointCatalog::new(vec![primary(), bad]).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_get_by_key() {
        let catalog = EndpointCatalog::new(vec![primary(), replica("replica-1")]).unwrap();
        assert_eq!(catalog.get("replica-1").unwrap().class(), EndpointClass::Replica);
        assert_eq!(catalog.get("primary").unwrap().class(), EndpointClass::Primary);
        assert!(catalog.get("replica-9").is_none());
        assert_eq!(catalog.iter().count(), 2);
    }
}
