//! Structured JSON logger for rwsplit
//!
//! One event per line: `event` first, then `severity`, then the fields sorted
//! by key. Writes are synchronous and unbuffered. ERROR and FATAL go to
//! stderr, everything else to stdout unless stdout carries command output.
//! A process-wide threshold drops lines below it.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-decision detail
    Trace = 0,
    /// Startup and explicit directives
    Info = 1,
    /// Degraded routing, leaks, failovers
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Startup aborted
    Fatal = 4,
}

const SEVERITIES: [Severity; 5] = [
    Severity::Trace,
    Severity::Info,
    Severity::Warn,
    Severity::Error,
    Severity::Fatal,
];

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Lines at this severity go to stderr
    pub fn is_stderr(&self) -> bool {
        *self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = match s.to_ascii_uppercase().as_str() {
            "WARNING" => "WARN".to_string(),
            other => other.to_string(),
        };
        SEVERITIES
            .into_iter()
            .find(|sev| sev.as_str() == wanted)
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

static THRESHOLD: AtomicU8 = AtomicU8::new(Severity::Info as u8);
static STDERR_ONLY: AtomicBool = AtomicBool::new(false);

/// Process-wide JSON line logger
pub struct Logger;

impl Logger {
    /// Drop every line below `severity` from now on.
    pub fn set_min_severity(severity: Severity) {
        THRESHOLD.store(severity as u8, Ordering::Relaxed);
    }

    /// Current threshold
    pub fn min_severity() -> Severity {
        let raw = THRESHOLD.load(Ordering::Relaxed) as usize;
        SEVERITIES[raw.min(SEVERITIES.len() - 1)]
    }

    /// Send every line to stderr, keeping stdout for command output.
    pub fn set_stderr_only(enabled: bool) {
        STDERR_ONLY.store(enabled, Ordering::Relaxed);
    }

    /// Whether a line at this severity goes to stderr
    pub fn writes_to_stderr(severity: Severity) -> bool {
        STDERR_ONLY.load(Ordering::Relaxed) || severity.is_stderr()
    }

    /// Whether a line at this severity would be written
    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Write one line to stdout or stderr depending on severity.
    pub fn emit(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        let line = render(severity, event, fields);
        // Logging never fails an operation
        let _ = if Self::writes_to_stderr(severity) {
            write_line(&mut io::stderr().lock(), &line)
        } else {
            write_line(&mut io::stdout().lock(), &line)
        };
    }
}

fn write_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.flush()
}

/// Render one log line, trailing newline included.
pub(crate) fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut line = String::with_capacity(64 + fields.len() * 24);
    line.push_str("{\"event\":");
    push_json_str(&mut line, event);
    line.push_str(",\"severity\":");
    push_json_str(&mut line, severity.as_str());
    for (key, value) in sorted {
        line.push(',');
        push_json_str(&mut line, key);
        line.push(':');
        push_json_str(&mut line, value);
    }
    line.push_str("}\n");
    line
}

fn push_json_str(out: &mut String, s: &str) {
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str("\"\""),
    }
}
