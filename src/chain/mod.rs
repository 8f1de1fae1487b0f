//! Interception chain
//!
//! Guards run outer-to-inner around every data-access call:
//! Observe → Transaction boundary → Explicit directive → Per-call → Execute

mod error;
pub mod guards;
mod pipeline;

pub use error::{DataAccessError, DataAccessErrorKind, DataAccessResult};
pub use guards::directive::DirectiveGuard;
pub use guards::observe::ObserveGuard;
pub use guards::per_call::PerCallGuard;
pub use guards::transaction::TransactionGuard;
pub use guards::Guard;
pub use pipeline::{ChainBuilder, InterceptionChain, Next, OperationExecutor, OperationResult};
