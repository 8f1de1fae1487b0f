//! `rwsplit` binary
//!
//! Thin wrapper over [`rwsplit::cli::run`]. Startup failures are printed to
//! stderr and end the process with exit code 1.

use rwsplit::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
