//! Routing Engine
//!
//! Decides, per data-access operation, whether it must run on the writable
//! primary or may run on a replica, and maps that decision onto a physical
//! endpoint.
//!
//! Leaves first:
//! - `types`, `descriptor`: routing vocabulary and the per-call operation snapshot
//! - `classifier`: SQL text, command kind and naming → read/write
//! - `precedence`: directive > write transaction > classifier
//! - `context`: per-unit-of-work decision cell with scoped pins
//! - `catalog`, `config`: validated endpoint catalog loaded at startup
//! - `selector`: decision + catalog → endpoint
//! - `recovery`: replica failure → retry once on the primary

mod catalog;
mod classifier;
mod config;
mod context;
mod descriptor;
mod errors;
mod precedence;
mod recovery;
mod selector;
mod types;

pub use catalog::{Endpoint, EndpointCatalog};
pub use classifier::{
    classify_name, classify_select, consistency_marker, Classification, ClassifyReason,
    SignalClassifier,
};
pub use config::{infer_role, EndpointConfig, RoutingConfig};
pub use context::{ContextEntry, ContextPin, GuardKind, RoutingContext, UnitScope};
pub use descriptor::{DirectiveScope, ForcePrimary, OperationDescriptor, TransactionState};
pub use errors::{RoutingError, RoutingResult};
pub use precedence::{
    directive_decision, transaction_decision, DecisionReason, PrecedenceResolver,
    PrecedenceTier, RoutingDecision,
};
pub use recovery::{FailureRecoveryPolicy, RecoveryAction};
pub use selector::{DataSourceSelector, DegradeReason, Route};
pub use types::{AccessKind, EndpointClass, SqlCommand};
