//! rwsplit - read/write routing for primary/replica database topologies
//!
//! Decides, per data-access operation, whether it must run on the writable
//! primary or may run on a replica, scopes that decision to one unit of work,
//! and maps it to a concrete endpoint.

pub mod chain;
pub mod cli;
pub mod observability;
pub mod router;
pub mod routing;

pub use chain::{DataAccessError, InterceptionChain, OperationResult};
pub use router::{DataAccess, Router, RouterBuilder};
pub use routing::{
    EndpointCatalog, EndpointClass, ForcePrimary, OperationDescriptor, Route, RoutingConfig,
    RoutingContext, RoutingError, TransactionState,
};
