//! Read-only levels and writes against read-only transactions.

use std::sync::Arc;

use txnest::{LevelService, Member, MemberRepository, TxInfo};

use crate::common::*;

fn level() -> (Arc<TransactionManager>, LevelService) {
    init_tracing();
    let manager = Arc::new(TransactionManager::new());
    (Arc::clone(&manager), LevelService::new(manager))
}

#[test]
fn write_runs_read_write() {
    let (_, svc) = level();
    let mut ctx = TxContext::new();
    assert_eq!(
        svc.write(&mut ctx).unwrap(),
        TxInfo {
            active: true,
            read_only: false
        }
    );
}

#[test]
fn read_runs_read_only() {
    let (_, svc) = level();
    let mut ctx = TxContext::new();
    assert_eq!(
        svc.read(&mut ctx).unwrap(),
        TxInfo {
            active: true,
            read_only: true
        }
    );
}

/// A read-write call cannot join an outer read-only transaction.
#[test]
fn write_inside_read_only_is_illegal() {
    let (manager, svc) = level();
    let mut ctx = TxContext::new();

    let err = manager
        .execute(
            &mut ctx,
            &TransactionDefinition::required().with_read_only(true),
            |ctx| svc.write(ctx),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Transaction(TxError::IllegalTransactionState { .. })
    ));
    assert!(!ctx.is_active());
    assert_eq!(manager.metrics().joined, 0);
}

/// A non-transactional repository write inside a read-only transaction is
/// rejected at the store and leaves nothing behind.
#[test]
fn insert_into_read_only_transaction_is_rejected() {
    let (manager, _) = level();
    let repo = MemberRepository::new(Arc::clone(&manager), None);
    let mut ctx = TxContext::new();

    let mut handle = manager
        .begin(&mut ctx, &TransactionDefinition::required().with_read_only(true))
        .unwrap();
    let err = repo.save(&mut ctx, Member::new("readonly")).unwrap_err();
    assert!(matches!(
        err,
        Error::Transaction(TxError::TransactionReadOnly { txn }) if txn == handle.txn_id()
    ));
    manager.rollback(&mut ctx, &mut handle).unwrap();

    assert!(repo.find("readonly").is_none());
}

/// A `RequiresNew` read-write call may write while a read-only transaction
/// is suspended.
#[test]
fn requires_new_write_inside_read_only() {
    let (manager, _) = level();
    let repo = MemberRepository::new(
        Arc::clone(&manager),
        Some(TransactionDefinition::requires_new()),
    );
    let mut ctx = TxContext::new();

    manager
        .execute(
            &mut ctx,
            &TransactionDefinition::required().with_read_only(true),
            |ctx| repo.save(ctx, Member::new("independent")),
        )
        .unwrap();

    assert!(repo.find("independent").is_some());
}
