//! CLI argument definitions using clap
//!
//! Commands:
//! - rwsplit check --config <path>
//! - rwsplit resolve --config <path> [--log-level <level>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::Severity;

/// rwsplit - read/write routing for primary/replica database topologies
#[derive(Parser, Debug)]
#[command(name = "rwsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a routing configuration and print the endpoint catalog
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./rwsplit.json")]
        config: PathBuf,

        /// Minimum log severity (trace, info, warn, error, fatal)
        #[arg(long, default_value = "info")]
        log_level: Severity,
    },

    /// Resolve one operation descriptor per stdin line to an endpoint
    Resolve {
        /// Path to configuration file
        #[arg(long, default_value = "./rwsplit.json")]
        config: PathBuf,

        /// Minimum log severity (trace, info, warn, error, fatal)
        #[arg(long, default_value = "info")]
        log_level: Severity,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::parse_from(["rwsplit", "resolve", "--config", "r.json", "--log-level", "warn"]);
        match cli.command {
            Command::Resolve { config, log_level } => {
                assert_eq!(config, PathBuf::from("r.json"));
                assert_eq!(log_level, Severity::Warn);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_defaults() {
        let cli = Cli::parse_from(["rwsplit", "check"]);
        match cli.command {
            Command::Check { config, log_level } => {
                assert_eq!(config, PathBuf::from("./rwsplit.json"));
                assert_eq!(log_level, Severity::Info);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_log_level_rejected() {
        assert!(Cli::try_parse_from(["rwsplit", "check", "--log-level", "loud"]).is_err());
    }
}
