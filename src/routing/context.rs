//! Routing Context
//!
//! The per-unit-of-work cell holding the current routing decision. It is an
//! explicit value owned by the logical operation and threaded through the
//! interception chain by `&mut`, never attached to a worker thread. Two units
//! of work can only share a context by sharing the value itself, which the
//! borrow checker rules out for concurrent use.
//!
//! Every write made by a guard goes through a [`ContextPin`], which puts the
//! prior entry back when it is dropped: on normal return, on error return, on
//! panic unwind, and when the enclosing future is cancelled.
//!
//! [`UnitScope`] tracks nesting depth. At the outermost boundary (depth 0,
//! no live pin) a non-empty context is a leak: it is force-cleared, logged and
//! counted, both on entry and on exit.

use std::ops::{Deref, DerefMut};

use uuid::Uuid;

use super::precedence::{DecisionReason, RoutingDecision};
use super::types::EndpointClass;
use crate::observability::{log_event, Event, RoutingMetrics};

/// Which stage wrote a context entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    /// Transaction-boundary guard
    Transaction,
    /// Explicit-directive guard
    Directive,
    /// Per-call guard
    PerCall,
    /// Collaborator-opened force-primary block
    Scoped,
    /// Re-run on the primary after a replica failure
    Failover,
    /// Bare `set()`
    Manual,
}

impl GuardKind {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardKind::Transaction => "transaction",
            GuardKind::Directive => "directive",
            GuardKind::PerCall => "per-call",
            GuardKind::Scoped => "scoped",
            GuardKind::Failover => "failover",
            GuardKind::Manual => "manual",
        }
    }
}

/// Current decision plus the stage that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub decision: RoutingDecision,
    pub owner: GuardKind,
}

/// Routing cell for one logical unit of work.
#[derive(Debug)]
pub struct RoutingContext {
    entry: Option<ContextEntry>,
    depth: usize,
    pins: usize,
    unit_id: Uuid,
}

impl RoutingContext {
    /// Create an empty context for a new unit of work.
    pub fn new() -> Self {
        Self {
            entry: None,
            depth: 0,
            pins: 0,
            unit_id: Uuid::new_v4(),
        }
    }

    /// Identifier correlating log lines of this unit of work.
    pub fn unit_id(&self) -> Uuid {
        self.unit_id
    }

    /// Set the endpoint class directly.
    ///
    /// Only meaningful inside a chain scope; a bare entry still present at the
    /// outermost boundary is treated as a leak. Prefer [`RoutingContext::pin`]
    /// or [`RoutingContext::force_primary`], which restore automatically.
    pub fn set(&mut self, class: EndpointClass) {
        self.entry = Some(ContextEntry {
            decision: RoutingDecision::manual(class),
            owner: GuardKind::Manual,
        });
    }

    /// Current endpoint class, `None` when unset.
    pub fn get(&self) -> Option<EndpointClass> {
        self.entry.as_ref().map(|e| e.decision.endpoint_class)
    }

    /// Remove the current entry.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Check if the context currently routes to the primary.
    pub fn is_primary(&self) -> bool {
        self.get() == Some(EndpointClass::Primary)
    }

    /// Check if the context currently routes to a replica.
    pub fn is_replica(&self) -> bool {
        self.get() == Some(EndpointClass::Replica)
    }

    /// Check if any decision is present.
    pub fn has_decision(&self) -> bool {
        self.entry.is_some()
    }

    /// Current decision with reason and tier.
    pub fn decision(&self) -> Option<&RoutingDecision> {
        self.entry.as_ref().map(|e| &e.decision)
    }

    /// Current entry with its owner.
    pub fn entry(&self) -> Option<&ContextEntry> {
        self.entry.as_ref()
    }

    /// Current guard nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Clear unconditionally, logging what was removed.
    pub fn force_clear(&mut self) -> Option<ContextEntry> {
        let cleared = self.entry.take();
        if let Some(entry) = &cleared {
            let unit = self.unit_id.to_string();
            let reason = entry.decision.reason.tag();
            log_event(Event::ContextForceCleared, &[
                ("class", entry.decision.endpoint_class.as_str()),
                ("owner", entry.owner.as_str()),
                ("reason", reason.as_str()),
                ("unit", unit.as_str()),
            ]);
        }
        cleared
    }

    /// Install a decision until the returned pin is dropped.
    pub fn pin(&mut self, decision: RoutingDecision, owner: GuardKind) -> ContextPin<'_> {
        let prior = self.entry.replace(ContextEntry { decision, owner });
        self.pins += 1;
        ContextPin { ctx: self, prior }
    }

    /// Route everything to the primary until the returned pin is dropped.
    pub fn force_primary(&mut self, reason: &str) -> ContextPin<'_> {
        let unit = self.unit_id.to_string();
        log_event(Event::ScopedPrimaryPinned, &[("reason", reason), ("unit", unit.as_str())]);
        self.pin(
            RoutingDecision::forced_primary(DecisionReason::ScopedPrimary),
            GuardKind::Scoped,
        )
    }

    /// Enter one nesting level of the interception chain.
    pub fn enter(&mut self) -> UnitScope<'_> {
        self.enter_inner(None)
    }

    /// Enter one nesting level, counting leaks in `metrics`.
    pub fn enter_observed<'a>(&'a mut self, metrics: &'a RoutingMetrics) -> UnitScope<'a> {
        self.enter_inner(Some(metrics))
    }

    fn enter_inner<'a>(&'a mut self, metrics: Option<&'a RoutingMetrics>) -> UnitScope<'a> {
        if self.at_outer_boundary() {
            if let Some(stale) = self.entry.take() {
                report_leak(&stale, "entry", self.unit_id, metrics);
            }
        }
        self.depth += 1;
        UnitScope { ctx: self, metrics }
    }

    fn at_outer_boundary(&self) -> bool {
        self.depth == 0 && self.pins == 0
    }
}

impl Default for RoutingContext {
    fn default() -> Self {
        Self::new()
    }
}

fn report_leak(stale: &ContextEntry, boundary: &str, unit_id: Uuid, metrics: Option<&RoutingMetrics>) {
    let unit = unit_id.to_string();
    let reason = stale.decision.reason.tag();
    log_event(Event::ContextLeakCleared, &[
        ("boundary", boundary),
        ("class", stale.decision.endpoint_class.as_str()),
        ("owner", stale.owner.as_str()),
        ("reason", reason.as_str()),
        ("unit", unit.as_str()),
    ]);
    if let Some(metrics) = metrics {
        metrics.increment_leaks_cleared();
    }
}

/// Scoped context entry. Restores the prior entry on drop.
#[derive(Debug)]
pub struct ContextPin<'a> {
    ctx: &'a mut RoutingContext,
    prior: Option<ContextEntry>,
}

impl ContextPin<'_> {
    /// Entry that will be restored when this pin drops.
    pub fn prior(&self) -> Option<&ContextEntry> {
        self.prior.as_ref()
    }
}

impl Deref for ContextPin<'_> {
    type Target = RoutingContext;

    fn deref(&self) -> &RoutingContext {
        &*self.ctx
    }
}

impl DerefMut for ContextPin<'_> {
    fn deref_mut(&mut self) -> &mut RoutingContext {
        &mut *self.ctx
    }
}

impl Drop for ContextPin<'_> {
    fn drop(&mut self) {
        self.ctx.entry = self.prior.take();
        self.ctx.pins = self.ctx.pins.saturating_sub(1);
    }
}

/// One nesting level of the chain. Clears leaks at the outermost exit.
#[derive(Debug)]
pub struct UnitScope<'a> {
    ctx: &'a mut RoutingContext,
    metrics: Option<&'a RoutingMetrics>,
}

impl Deref for UnitScope<'_> {
    type Target = RoutingContext;

    fn deref(&self) -> &RoutingContext {
        &*self.ctx
    }
}

impl DerefMut for UnitScope<'_> {
    fn deref_mut(&mut self) -> &mut RoutingContext {
        &mut *self.ctx
    }
}

impl Drop for UnitScope<'_> {
    fn drop(&mut self) {
        self.ctx.depth = self.ctx.depth.saturating_sub(1);
        if self.ctx.at_outer_boundary() {
            if let Some(stale) = self.ctx.entry.take() {
                report_leak(&stale, "exit", self.ctx.unit_id, self.metrics);
            }
        }
    }
}
