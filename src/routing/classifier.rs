//! Signal Classifier
//!
//! Turns an operation descriptor into a read/write classification.
//!
//! Order of evaluation:
//! 1. WRITE command kind → write
//! 2. READ command kind with SQL text → read, unless the text carries a
//!    strict-consistency marker (row locks, advisory locks, sequence calls,
//!    `SELECT ... INTO`, last-insert-id and affected-row introspection), which
//!    forces write
//! 3. UNKNOWN command kind → write
//! 4. No SQL text → naming heuristic over the operation name; unmatched names
//!    are write
//!
//! Every ambiguous case resolves toward the primary. Ambiguity is never an
//! error.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::descriptor::OperationDescriptor;
use super::types::{AccessKind, SqlCommand};

/// Name prefixes that denote a write.
const WRITE_PREFIXES: &[&str] = &[
    "save", "insert", "update", "delete", "remove", "create", "modify", "add", "edit",
];

/// Name prefixes that denote a read.
const READ_PREFIXES: &[&str] = &[
    "find", "get", "query", "select", "search", "list", "count", "exists", "check",
];

/// Batch and conditional-update verbs matched by exact name.
const WRITE_EXACT_NAMES: &[&str] = &[
    "saveOrUpdate",
    "saveOrUpdateBatch",
    "updateById",
    "updateBatchById",
    "removeById",
    "removeByIds",
    "removeByMap",
    "remove",
    "saveBatch",
    "updateBatch",
];

/// A SQL construct that requires the primary even inside a SELECT.
struct ConsistencyMarker {
    label: &'static str,
    pattern: Regex,
}

const MARKER_PATTERNS: &[(&str, &str)] = &[
    ("FOR UPDATE", r"(?i)\bFOR\s+(NO\s+KEY\s+)?UPDATE\b"),
    ("FOR SHARE", r"(?i)\bFOR\s+(KEY\s+)?SHARE\b"),
    ("LOCK IN SHARE MODE", r"(?i)\bLOCK\s+IN\s+SHARE\s+MODE\b"),
    ("GET_LOCK", r"(?i)\bGET_LOCK\s*\("),
    ("PG_ADVISORY_LOCK", r"(?i)\bPG_(TRY_)?ADVISORY_(XACT_)?LOCK(_SHARED)?\s*\("),
    ("MASTER_POS_WAIT", r"(?i)\b(MASTER|SOURCE)_POS_WAIT\s*\("),
    // Substring match: any function name ending in these also goes to the primary
    ("FOUND_ROWS", r"(?i)FOUND_ROWS\s*\(\s*\)"),
    ("ROW_COUNT", r"(?i)ROW_COUNT\s*\(\s*\)"),
    ("LAST_INSERT_ID", r"(?i)\bLAST_INSERT_ID\s*\("),
    ("LASTVAL", r"(?i)\b(LASTVAL\s*\(\s*\)|CURRVAL\s*\()"),
    ("NEXTVAL", r"(?i)\b(NEXTVAL|SETVAL)\s*\("),
    ("SELECT INTO", r"(?i)\bINTO\b"),
];

static CONSISTENCY_MARKERS: LazyLock<Vec<ConsistencyMarker>> = LazyLock::new(|| {
    MARKER_PATTERNS
        .iter()
        .filter_map(|&(label, pattern)| {
            Regex::new(pattern)
                .ok()
                .map(|pattern| ConsistencyMarker { label, pattern })
        })
        .collect()
});

/// Why a classification came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyReason {
    /// Command kind was WRITE
    WriteCommand,
    /// Plain read statement
    ReadCommand,
    /// Read statement carrying a strict-consistency marker
    ConsistencyMarker(&'static str),
    /// Command kind was UNKNOWN
    UnknownCommand,
    /// Operation name matched a write verb
    WriteName,
    /// Operation name matched a read verb
    ReadName,
    /// Operation name matched nothing
    UnmatchedName,
}

impl ClassifyReason {
    /// Stable tag used in logs and CLI output.
    pub fn tag(&self) -> String {
        match self {
            Self::WriteCommand => "write-command".to_string(),
            Self::ReadCommand => "read-command".to_string(),
            Self::ConsistencyMarker(label) => {
                format!("consistency-marker:{}", label.to_ascii_lowercase().replace(' ', "-"))
            }
            Self::UnknownCommand => "unknown-command".to_string(),
            Self::WriteName => "write-name".to_string(),
            Self::ReadName => "read-name".to_string(),
            Self::UnmatchedName => "unmatched-name".to_string(),
        }
    }
}

impl fmt::Display for ClassifyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub access: AccessKind,
    pub reason: ClassifyReason,
}

impl Classification {
    fn write(reason: ClassifyReason) -> Self {
        Self {
            access: AccessKind::Write,
            reason,
        }
    }

    fn read(reason: ClassifyReason) -> Self {
        Self {
            access: AccessKind::Read,
            reason,
        }
    }

    /// Check if classified as a write.
    pub fn is_write(&self) -> bool {
        self.access == AccessKind::Write
    }
}

/// Stateless read/write classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalClassifier;

impl SignalClassifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify one operation.
    pub fn classify(&self, op: &OperationDescriptor) -> Classification {
        let command = match (op.command(), op.sql()) {
            (Some(command), _) => Some(command),
            (None, Some(sql)) => Some(SqlCommand::infer(sql)),
            (None, None) => None,
        };

        match (command, op.sql()) {
            (Some(SqlCommand::Write), _) => Classification::write(ClassifyReason::WriteCommand),
            (Some(SqlCommand::Unknown), _) => Classification::write(ClassifyReason::UnknownCommand),
            (Some(SqlCommand::Read), Some(sql)) => classify_select(sql),
            (Some(SqlCommand::Read), None) | (None, _) => classify_name(op.method_name()),
        }
    }
}

/// Classify the text of a statement already known to be a read.
pub fn classify_select(sql: &str) -> Classification {
    match consistency_marker(sql) {
        Some(label) => Classification::write(ClassifyReason::ConsistencyMarker(label)),
        None => Classification::read(ClassifyReason::ReadCommand),
    }
}

/// First strict-consistency marker found in the SQL text, if any.
pub fn consistency_marker(sql: &str) -> Option<&'static str> {
    CONSISTENCY_MARKERS
        .iter()
        .find(|marker| marker.pattern.is_match(sql))
        .map(|marker| marker.label)
}

/// Naming heuristic over an unqualified method name.
///
/// Prefix matching ignores ASCII case, so camelCase (`findById`), PascalCase
/// (`FindById`) and snake_case (`find_by_id`) names all match.
pub fn classify_name(method: &str) -> Classification {
    if WRITE_EXACT_NAMES.contains(&method) || has_verb_prefix(method, WRITE_PREFIXES) {
        return Classification::write(ClassifyReason::WriteName);
    }
    if has_verb_prefix(method, READ_PREFIXES) {
        return Classification::read(ClassifyReason::ReadName);
    }
    Classification::write(ClassifyReason::UnmatchedName)
}

fn has_verb_prefix(method: &str, verbs: &[&str]) -> bool {
    let lowered = method.to_ascii_lowercase();
    verbs.iter().any(|verb| lowered.starts_with(*verb))
}
