//! Guard Trait and Implementations
//!
//! Guards wrap the operation call. Each may install a scoped decision in the
//! context before calling the next stage; the scoped pin puts the prior entry
//! back however the call ends.

use std::future::Future;
use std::pin::Pin;

use super::pipeline::{Next, OperationResult};
use crate::routing::{OperationDescriptor, RoutingContext};

/// Guard trait for chain stages
pub trait Guard: Send + Sync {
    /// Short stable name, used in logs and introspection
    fn name(&self) -> &'static str;

    /// Process the operation, optionally pinning a decision around `next`
    fn process<'a>(
        &'a self,
        op: &'a OperationDescriptor,
        ctx: &'a mut RoutingContext,
        next: Next<'a>,
    ) -> Pin<Box<dyn Future<Output = OperationResult> + Send + 'a>>;
}

/// Composable guard implementations
pub mod directive;
pub mod observe;
pub mod per_call;
pub mod transaction;
