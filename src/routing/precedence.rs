//! Precedence Resolver
//!
//! Combines routing signals into one decision. Highest tier first:
//!
//! 1. Explicit force-primary directive (method scope reported over type scope)
//! 2. Active, non-read-only ambient transaction
//! 3. Classifier output (write → primary, read → replica)
//!
//! Only the highest applicable tier is evaluated. A read-only transaction does
//! not fire tier 2 and defers to the classifier.

use std::fmt;

use serde::Serialize;

use super::classifier::{ClassifyReason, SignalClassifier};
use super::descriptor::{DirectiveScope, OperationDescriptor};
use super::types::EndpointClass;

/// Precedence tier of a decision. Higher tiers win conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecedenceTier {
    Classifier = 1,
    Transaction = 2,
    Directive = 3,
}

impl PrecedenceTier {
    /// Numeric tier value
    pub fn value(&self) -> u8 {
        *self as u8
    }
}

/// Why a decision was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionReason {
    /// Force-primary directive on the operation or its type
    Directive(DirectiveScope),
    /// Active read-write transaction
    WriteTransaction,
    /// Classifier output
    Classified(ClassifyReason),
    /// Scoped force-primary block opened by a collaborator
    ScopedPrimary,
    /// Re-run on the primary after a replica failure
    ReplicaFailover,
    /// Bare `set()` on the context
    Manual,
}

impl DecisionReason {
    /// Stable tag used in logs and CLI output.
    pub fn tag(&self) -> String {
        match self {
            Self::Directive(scope) => format!("directive:{}", scope.as_str()),
            Self::WriteTransaction => "write-transaction".to_string(),
            Self::Classified(reason) => reason.tag(),
            Self::ScopedPrimary => "scoped-primary".to_string(),
            Self::ReplicaFailover => "replica-failover".to_string(),
            Self::Manual => "manual".to_string(),
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A per-operation routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    pub endpoint_class: EndpointClass,
    pub reason: DecisionReason,
    pub tier: PrecedenceTier,
}

impl RoutingDecision {
    /// Create a decision.
    pub fn new(endpoint_class: EndpointClass, reason: DecisionReason, tier: PrecedenceTier) -> Self {
        Self {
            endpoint_class,
            reason,
            tier,
        }
    }

    /// Primary decision at directive tier.
    pub fn forced_primary(reason: DecisionReason) -> Self {
        Self::new(EndpointClass::Primary, reason, PrecedenceTier::Directive)
    }

    /// Decision recorded by a bare context `set()`.
    ///
    /// A manual primary counts as an explicit directive. A manual replica only
    /// sits at classifier tier, so it never outranks a computed write.
    pub fn manual(endpoint_class: EndpointClass) -> Self {
        let tier = match endpoint_class {
            EndpointClass::Primary => PrecedenceTier::Directive,
            EndpointClass::Replica => PrecedenceTier::Classifier,
        };
        Self::new(endpoint_class, DecisionReason::Manual, tier)
    }

    /// Strictly higher tier than `other`.
    pub fn outranks(&self, other: &RoutingDecision) -> bool {
        self.tier > other.tier
    }

    /// A decision above classifier tier is a pin that inner stages keep.
    pub fn is_pin(&self) -> bool {
        self.tier > PrecedenceTier::Classifier
    }
}

/// Evaluates the precedence order over one descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecedenceResolver {
    classifier: SignalClassifier,
}

impl PrecedenceResolver {
    /// Create a resolver around a classifier.
    pub fn new(classifier: SignalClassifier) -> Self {
        Self { classifier }
    }

    /// Resolve the decision for one operation in isolation.
    pub fn resolve(&self, op: &OperationDescriptor) -> RoutingDecision {
        directive_decision(op)
            .or_else(|| transaction_decision(op))
            .unwrap_or_else(|| self.classifier_decision(op))
    }

    /// Tier 3 output for this operation.
    pub fn classifier_decision(&self, op: &OperationDescriptor) -> RoutingDecision {
        let classification = self.classifier.classify(op);
        RoutingDecision::new(
            classification.access.endpoint_class(),
            DecisionReason::Classified(classification.reason),
            PrecedenceTier::Classifier,
        )
    }

    /// Combine a decision already in the context with this operation's own.
    ///
    /// An existing pin (transaction or directive tier) is kept unless the
    /// operation resolves to a strictly higher tier. An existing classifier
    /// decision is equal-tier and falls through to the operation's own.
    pub fn combine(&self, existing: Option<&RoutingDecision>, op: &OperationDescriptor) -> RoutingDecision {
        let own = self.resolve(op);
        match existing {
            Some(current) if current.is_pin() && !own.outranks(current) => current.clone(),
            _ => own,
        }
    }
}

/// Tier 1: force-primary directive.
pub fn directive_decision(op: &OperationDescriptor) -> Option<RoutingDecision> {
    op.directive()
        .map(|d| RoutingDecision::forced_primary(DecisionReason::Directive(d.scope)))
}

/// Tier 2: active read-write transaction.
pub fn transaction_decision(op: &OperationDescriptor) -> Option<RoutingDecision> {
    if op.in_write_transaction() {
        Some(RoutingDecision::new(
            EndpointClass::Primary,
            DecisionReason::WriteTransaction,
            PrecedenceTier::Transaction,
        ))
    } else {
        None
    }
}
