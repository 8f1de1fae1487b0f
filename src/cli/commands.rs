//! CLI command implementations
//!
//! Both commands load and validate the configuration first; any failure
//! there is fatal. `resolve` then answers one request per input line and
//! never stops on a bad line.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::observability::Logger;
use crate::router::Router;
use crate::routing::{OperationDescriptor, Route, RoutingConfig};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response};

/// Counts reported after a `resolve` stream ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: u64,
    pub rejected: u64,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    // stdout carries one JSON result per line; logs must not interleave
    Logger::set_stderr_only(true);
    match cmd {
        Command::Check { config, log_level } => {
            Logger::set_min_severity(log_level);
            check(&config)
        }
        Command::Resolve { config, log_level } => {
            Logger::set_min_severity(log_level);
            resolve(&config)
        }
    }
}

/// Load, validate and print the endpoint catalog.
pub fn check(config_path: &Path) -> CliResult<()> {
    let router = load_router(config_path)?;
    let mut stdout = io::stdout();
    write_response(&mut stdout, catalog_summary(&router))
}

/// Resolve descriptors from stdin until EOF.
pub fn resolve(config_path: &Path) -> CliResult<()> {
    let router = load_router(config_path)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    resolve_stream(&router, stdin.lock(), &mut stdout)?;
    Ok(())
}

/// Resolve every request line from `reader`, answering on `writer`.
///
/// Only a failing writer ends the stream early.
pub fn resolve_stream<R: BufRead, W: Write>(
    router: &Router,
    reader: R,
    writer: &mut W,
) -> CliResult<ResolveSummary> {
    let mut summary = ResolveSummary::default();

    for request in read_requests(reader) {
        let parsed = request.and_then(|value| {
            serde_json::from_value::<OperationDescriptor>(value)
                .map_err(|e| CliError::invalid_request(format!("Invalid descriptor: {}", e)))
        });

        match parsed {
            Ok(op) => {
                let route = router.resolve_endpoint(&op);
                write_response(writer, route_json(&op, &route))?;
                summary.resolved += 1;
            }
            Err(e) => {
                write_error(writer, e.code_str(), e.message())?;
                summary.rejected += 1;
            }
        }
    }

    Ok(summary)
}

fn load_router(config_path: &Path) -> CliResult<Router> {
    let config = RoutingConfig::load(config_path)?;
    Ok(Router::from_config(&config)?)
}

fn route_json(op: &OperationDescriptor, route: &Route<'_>) -> Value {
    let (reason, tier) = match &route.decision {
        Some(decision) => (Value::from(decision.reason.tag()), Value::from(decision.tier.value())),
        None => (Value::Null, Value::Null),
    };
    json!({
        "operation": op.name(),
        "endpoint": route.key(),
        "class": route.class().as_str(),
        "reason": reason,
        "tier": tier,
        "degraded": route.degraded.map(|d| d.as_str()),
    })
}

fn catalog_summary(router: &Router) -> Value {
    let catalog = router.catalog();
    let replicas: Vec<&str> = catalog.replicas().iter().map(|e| e.key()).collect();
    json!({
        "primary": catalog.primary().key(),
        "replicas": replicas,
        "unset_route": router.unset_route().as_str(),
        "failover_to_primary": router.recovery_policy().is_enabled(),
        "guards": router.guard_names(),
        "log_level": Logger::min_severity().as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn router() -> Router {
        let config = RoutingConfig::from_json_str(
            r#"{"endpoints": {"primary": {"url": "db://0"}, "replica-1": {"url": "db://1"}}}"#,
        )
        .unwrap();
        Router::from_config(&config).unwrap()
    }

    fn run_lines(input: &str) -> (ResolveSummary, Vec<Value>) {
        let mut out = Vec::new();
        let summary = resolve_stream(&router(), Cursor::new(input.to_string()), &mut out).unwrap();
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (summary, lines)
    }

    #[test]
    fn test_resolve_stream() {
        let (summary, lines) = run_lines(concat!(
            "{\"name\":\"findUser\",\"sql\":\"SELECT * FROM users\"}\n",
            "{\"name\":\"saveUser\"}\n",
        ));

        assert_eq!(summary, ResolveSummary { resolved: 2, rejected: 0 });
        assert_eq!(lines[0]["data"]["endpoint"], "replica-1");
        assert_eq!(lines[0]["data"]["class"], "replica");
        assert_eq!(lines[0]["data"]["reason"], "read-command");
        assert_eq!(lines[0]["data"]["tier"], 1);
        assert_eq!(lines[0]["data"]["degraded"], Value::Null);
        assert_eq!(lines[1]["data"]["endpoint"], "primary");
        assert_eq!(lines[1]["data"]["reason"], "write-name");
    }

    #[test]
    fn test_bad_lines_do_not_stop_the_stream() {
        let (summary, lines) = run_lines(concat!(
            "not json\n",
            "{\"sql\":\"SELECT 1\"}\n",
            "{\"name\":\"countOrders\"}\n",
        ));

        assert_eq!(summary, ResolveSummary { resolved: 1, rejected: 2 });
        assert_eq!(lines[0]["status"], "error");
        assert_eq!(lines[1]["code"], "RWSPLIT_CLI_INVALID_REQUEST");
        assert_eq!(lines[2]["status"], "ok");
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_rejects_config_without_primary() {
        let file = config_file(r#"{"endpoints": {"replica-1": {"url": "db://1"}}}"#);
        let err = check(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "RWSPLIT_CLI_CONFIG_ERROR");
        assert!(err.message().contains("RWSPLIT_MISSING_PRIMARY"));
    }

    #[test]
    fn test_resolve_rejects_unreadable_config() {
        let file = config_file("{ not json");
        let err = resolve(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "RWSPLIT_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_check_accepts_valid_config() {
        let file = config_file(
            r#"{"endpoints": {"primary": {"url": "db://0"}, "replica-1": {"url": "db://1"}}}"#,
        );
        assert!(check(file.path()).is_ok());
    }

    #[test]
    fn test_catalog_summary() {
        let summary = catalog_summary(&router());
        assert_eq!(summary["primary"], "primary");
        assert_eq!(summary["replicas"][0], "replica-1");
        assert_eq!(summary["unset_route"], "replica");
        assert_eq!(summary["failover_to_primary"], true);
    }
}
