//! Routing Precedence Tests
//!
//! Directive > write transaction > classifier, end to end through the
//! router and the interception chain.

mod common;

use common::{router, ScriptedAccess};
use rwsplit::routing::{EndpointClass, SqlCommand};
use rwsplit::{ForcePrimary, OperationDescriptor, TransactionState};

const WRITE_NAMES: [&str; 10] = [
    "saveUser",
    "insertOrder",
    "updateStock",
    "deleteSession",
    "removeItem",
    "createAccount",
    "modifyProfile",
    "addTag",
    "editComment",
    "saveOrUpdate",
];

const READ_NAMES: [&str; 9] = [
    "findUser",
    "getOrder",
    "queryStock",
    "selectSessions",
    "searchItems",
    "listAccounts",
    "countProfiles",
    "existsTag",
    "checkQuota",
];

// =============================================================================
// NAMING HEURISTIC
// =============================================================================

/// Write-verb names hit the primary, with or without a read-only transaction.
#[test]
fn test_write_names_route_to_primary() {
    let router = router(2);
    for name in WRITE_NAMES {
        let plain = OperationDescriptor::new(name);
        let read_only = OperationDescriptor::new(name).in_transaction(TransactionState::read_only());

        assert_eq!(router.resolve_endpoint(&plain).key(), "primary", "{}", name);
        assert_eq!(router.resolve_endpoint(&read_only).key(), "primary", "{}", name);
    }
}

/// Read-verb names with no directive and no write transaction hit a replica.
#[test]
fn test_read_names_route_to_replica() {
    let router = router(2);
    for name in READ_NAMES {
        let route = router.resolve_endpoint(&OperationDescriptor::new(name));
        assert_eq!(route.class(), EndpointClass::Replica, "{}", name);

        let qualified = format!("OrderRepository.{}", name);
        let route = router.resolve_endpoint(&OperationDescriptor::new(qualified));
        assert_eq!(route.class(), EndpointClass::Replica, "{}", name);
    }
}

/// Names matching nothing fail safe toward the primary.
#[test]
fn test_unmatched_name_routes_to_primary() {
    let router = router(2);
    let route = router.resolve_endpoint(&OperationDescriptor::new("reconcile"));
    assert_eq!(route.key(), "primary");
}

// =============================================================================
// SQL SIGNALS
// =============================================================================

/// A locking SELECT goes to the primary although its command kind is READ.
#[test]
fn test_row_lock_select_routes_to_primary() {
    let router = router(2);
    for sql in [
        "SELECT * FROM accounts WHERE id = 1 FOR UPDATE",
        "select * from accounts where id = 1 lock in share mode",
        "SELECT GET_LOCK('job', 10)",
        "SELECT LAST_INSERT_ID()",
        "SELECT FOUND_ROWS()",
    ] {
        let op = OperationDescriptor::read("findAccount", sql);
        assert_eq!(op.command(), Some(SqlCommand::Read));
        assert_eq!(router.resolve_endpoint(&op).key(), "primary", "{}", sql);
    }
}

/// UNKNOWN command kinds fail safe toward the primary.
#[test]
fn test_unknown_command_routes_to_primary() {
    let router = router(2);
    let op = OperationDescriptor::new("findReport")
        .with_sql("CALL refresh_report()")
        .with_command(SqlCommand::Unknown);
    assert_eq!(router.resolve_endpoint(&op).key(), "primary");
}

// =============================================================================
// DIRECTIVE AND TRANSACTION TIERS
// =============================================================================

/// A method-scope directive beats a read-only transaction, a read name and
/// read-classified SQL text, all at once.
#[test]
fn test_method_directive_wins_over_every_read_signal() {
    let router = router(2);
    let op = OperationDescriptor::read("findUser", "SELECT * FROM users")
        .in_transaction(TransactionState::read_only())
        .with_directive(ForcePrimary::method().quiet());

    let route = router.resolve_endpoint(&op);
    assert_eq!(route.key(), "primary");
    assert_eq!(route.decision.unwrap().reason.tag(), "directive:method");
}

/// Method scope is reported when both method and type carry a directive.
#[test]
fn test_method_scope_reported_over_type_scope() {
    let router = router(2);
    let op = OperationDescriptor::new("findUser")
        .with_directive(ForcePrimary::on_type().quiet())
        .with_directive(ForcePrimary::method().quiet());

    let route = router.resolve_endpoint(&op);
    assert_eq!(route.decision.unwrap().reason.tag(), "directive:method");
}

/// A write transaction pins the primary even for read-classified calls, and
/// the per-call guard running inside it does not downgrade the decision.
#[tokio::test]
async fn test_write_transaction_not_downgraded_by_per_call_guard() {
    let router = router(2);
    let access = ScriptedAccess::healthy();
    let op = OperationDescriptor::read("listOrders", "SELECT * FROM orders")
        .in_transaction(TransactionState::read_write());

    router.execute(&op, &access).await.unwrap();
    assert_eq!(access.endpoints(), vec!["primary"]);
    assert_eq!(router.metrics().snapshot().transaction_pins, 1);
}

/// A read-only transaction defers to the classifier.
#[tokio::test]
async fn test_read_only_transaction_defers_to_classifier() {
    let router = router(1);
    let access = ScriptedAccess::healthy();
    let op = OperationDescriptor::read("listOrders", "SELECT * FROM orders")
        .in_transaction(TransactionState::read_only());

    router.execute(&op, &access).await.unwrap();
    assert_eq!(access.endpoints(), vec!["replica-1"]);
}
