//! CLI module for rwsplit
//!
//! Provides command-line interface for:
//! - check: Validate a routing configuration
//! - resolve: Resolve operation descriptors read from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, resolve, resolve_stream, run, run_command, ResolveSummary};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_response};
