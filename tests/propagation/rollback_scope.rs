//! Scenarios where the log save fails and the error propagates (`join_v1`).

use crate::common::*;

/// Independent transactions: only the failing log save is rolled back.
#[test]
fn outer_off_inner_fails() {
    let svc = service(
        ComponentPolicy::off(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();
    let username = "로그예외_outerTxOff_fail";

    let err = svc.join_v1(&mut ctx, username).unwrap_err();

    assert_eq!(
        err,
        Error::LogPersistFailed {
            username: username.to_string()
        }
    );
    assert_eq!(presence(&svc, username), (true, false));
    let m = svc.manager().metrics();
    assert_eq!((m.committed, m.rolled_back), (1, 1));
}

/// Shared transaction: the service owner rolls back both writes.
#[test]
fn outer_on_inner_fails() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();
    let username = "로그예외_outerTxOn_fail";

    let err = svc.join_v1(&mut ctx, username).unwrap_err();

    assert!(matches!(err, Error::LogPersistFailed { .. }));
    assert_eq!(presence(&svc, username), (false, false));
    let m = svc.manager().metrics();
    assert_eq!((m.committed, m.rolled_back, m.unexpected_rollbacks), (0, 1, 0));
    assert!(!ctx.is_active());
}

/// The English marker behaves like the Korean one.
#[test]
fn english_marker_fails_log_save() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();

    assert!(svc.join_v1(&mut ctx, "logException_en").is_err());
    assert_eq!(presence(&svc, "logException_en"), (false, false));
}
