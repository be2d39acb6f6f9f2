//! Handle completion rules and concurrent call chains.

use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;
use proptest::prelude::*;

use crate::common::*;

#[test]
fn second_rollback_fails_fast() {
    init_tracing();
    let manager = TransactionManager::new();
    let mut ctx = TxContext::new();
    let mut handle = manager
        .begin(&mut ctx, &TransactionDefinition::required())
        .unwrap();

    manager.rollback(&mut ctx, &mut handle).unwrap();
    assert_eq!(
        manager.rollback(&mut ctx, &mut handle),
        Err(TxError::TransactionCompleted {
            txn: handle.txn_id()
        })
    );
    assert_eq!(
        manager.commit(&mut ctx, &mut handle),
        Err(TxError::TransactionCompleted {
            txn: handle.txn_id()
        })
    );
}

#[test]
fn requires_new_resumes_the_suspended_transaction() {
    init_tracing();
    let manager = TransactionManager::new();
    let mut ctx = TxContext::new();

    let mut outer = manager
        .begin(&mut ctx, &TransactionDefinition::required())
        .unwrap();
    let mut inner = manager
        .begin(&mut ctx, &TransactionDefinition::requires_new())
        .unwrap();
    assert_eq!(ctx.depth(), 2);

    manager.commit(&mut ctx, &mut inner).unwrap();
    assert_eq!(ctx.current_txn_id(), Some(outer.txn_id()));
    manager.commit(&mut ctx, &mut outer).unwrap();
    assert_eq!(ctx.depth(), 0);
}

/// Dropping a context with open transactions discards their writes.
#[test]
fn dropped_context_discards_pending_writes() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::off(),
        ComponentPolicy::off(),
    );
    {
        let mut ctx = TxContext::new();
        let _handle = svc
            .manager()
            .begin(&mut ctx, &TransactionDefinition::required())
            .unwrap();
        svc.join_v1(&mut ctx, "abandoned").unwrap();
    }
    assert_eq!(presence(&svc, "abandoned"), (false, false));
    assert_eq!(svc.manager().metrics().active, 1);
}

/// Call chains on separate threads share a service but not outcomes.
#[test]
fn concurrent_call_chains_are_independent() {
    let svc = Arc::new(service(
        ComponentPolicy::required(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    ));
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let failures = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let svc = Arc::clone(&svc);
            let barrier = Arc::clone(&barrier);
            let failures = Arc::clone(&failures);
            thread::spawn(move || {
                let username = if i % 2 == 0 {
                    format!("user{}", i)
                } else {
                    format!("logException_{}", i)
                };
                let mut ctx = TxContext::new();
                barrier.wait();
                if let Err(e) = svc.join_v2(&mut ctx, &username) {
                    assert!(e.is_unexpected_rollback());
                    failures.lock().push(username);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(failures.lock().len(), threads / 2);
    for i in 0..threads {
        let expected = i % 2 == 0;
        let username = if expected {
            format!("user{}", i)
        } else {
            format!("logException_{}", i)
        };
        assert_eq!(presence(&svc, &username), (expected, expected));
    }
    assert_eq!(svc.manager().metrics().active, 0);
}

proptest! {
    /// Under the default config a name survives `join_v1` exactly when it
    /// carries no failure marker.
    #[test]
    fn join_v1_outcome_follows_marker(name in "[a-z]{1,8}", marked in any::<bool>()) {
        let svc = service(
            ComponentPolicy::required(),
            ComponentPolicy::required(),
            ComponentPolicy::required(),
        );
        let username = if marked { format!("logException{}", name) } else { name };
        let mut ctx = TxContext::new();

        let result = svc.join_v1(&mut ctx, &username);

        prop_assert_eq!(result.is_ok(), !marked);
        prop_assert_eq!(presence(&svc, &username), (!marked, !marked));
        prop_assert!(!ctx.is_active());
    }
}
