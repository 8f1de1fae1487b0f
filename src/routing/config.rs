//! Routing Configuration
//!
//! JSON file supplied at startup:
//! - Endpoint map from logical key to connection parameters
//! - Explicit default for operations reaching the selector with no decision
//! - Replica-failure recovery toggle
//!
//! Validation turns the endpoint map into an [`EndpointCatalog`]. Every
//! failure here is fatal at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::catalog::{Endpoint, EndpointCatalog};
use super::errors::{RoutingError, RoutingResult};
use super::types::EndpointClass;
use crate::observability::{log_event, Event};

/// Connection parameters for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Connection URL, opaque to routing
    pub url: String,

    /// Explicit role; inferred from the key when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<EndpointClass>,

    /// Extra connection properties, opaque to routing
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl EndpointConfig {
    /// Endpoint with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            role: None,
            properties: BTreeMap::new(),
        }
    }

    /// Set the role explicitly.
    pub fn with_role(mut self, role: EndpointClass) -> Self {
        self.role = Some(role);
        self
    }
}

/// Routing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Logical key → connection parameters
    #[serde(default)]
    pub endpoints: BTreeMap<String, EndpointConfig>,

    /// Class used when the context holds no decision.
    /// Replica by default, falling back to the primary when none exist.
    #[serde(default = "default_unset_route")]
    pub unset_route: EndpointClass,

    /// Re-run transiently failed replica operations on the primary
    #[serde(default = "default_failover")]
    pub failover_to_primary: bool,
}

fn default_unset_route() -> EndpointClass {
    EndpointClass::Replica
}

fn default_failover() -> bool {
    true
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            endpoints: BTreeMap::new(),
            unset_route: default_unset_route(),
            failover_to_primary: default_failover(),
        }
    }
}

impl RoutingConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> RoutingResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| RoutingError::ConfigIo(e.to_string()))?;
        let config = Self::from_json_str(&content)?;

        let path_str = path.display().to_string();
        let count = config.endpoints.len().to_string();
        log_event(Event::ConfigLoaded, &[
            ("endpoints", count.as_str()),
            ("path", path_str.as_str()),
        ]);
        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(content: &str) -> RoutingResult<Self> {
        serde_json::from_str(content).map_err(|e| RoutingError::ConfigParse(e.to_string()))
    }

    /// Add an endpoint.
    pub fn with_endpoint(mut self, key: impl Into<String>, endpoint: EndpointConfig) -> Self {
        self.endpoints.insert(key.into(), endpoint);
        self
    }

    /// Validate and build the endpoint catalog.
    pub fn catalog(&self) -> RoutingResult<EndpointCatalog> {
        let result = self.build_catalog();
        match &result {
            Ok(catalog) => {
                let replicas = catalog.replicas().len().to_string();
                log_event(Event::CatalogLoaded, &[
                    ("primary", catalog.primary().key()),
                    ("replicas", replicas.as_str()),
                ]);
            }
            Err(e) => {
                let message = e.to_string();
                log_event(Event::CatalogRejected, &[
                    ("code", e.code()),
                    ("error", message.as_str()),
                ]);
            }
        }
        result
    }

    fn build_catalog(&self) -> RoutingResult<EndpointCatalog> {
        let endpoints = self
            .endpoints
            .iter()
            .map(|(key, cfg)| {
                let class = match cfg.role {
                    Some(role) => role,
                    None => infer_role(key)?,
                };
                Ok(Endpoint::new(key.as_str(), class, cfg.url.as_str())
                    .with_properties(cfg.properties.clone()))
            })
            .collect::<RoutingResult<Vec<_>>>()?;

        EndpointCatalog::new(endpoints)
    }
}

/// Infer an endpoint role from its key.
///
/// `primary` and `master` are the primary. `replica`, `slave` and keys
/// starting with either followed by `-` or `_` (`replica-1`, `slave_2`) are
/// replicas.
pub fn infer_role(key: &str) -> RoutingResult<EndpointClass> {
    let lowered = key.to_ascii_lowercase();
    if lowered == "primary" || lowered == "master" {
        return Ok(EndpointClass::Primary);
    }
    for prefix in ["replica", "slave"] {
        if let Some(rest) = lowered.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with('-') || rest.starts_with('_') {
                return Ok(EndpointClass::Replica);
            }
        }
    }
    Err(RoutingError::UnknownEndpointRole(key.to_string()))
}
