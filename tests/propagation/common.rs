//! Shared helpers for the propagation suite.

#![allow(dead_code)]

use std::sync::Once;

pub use txnest::{
    ComponentPolicy, Error, MemberService, TransactionDefinition, TransactionManager, TxContext,
    TxError, TxnestConfig,
};

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("txnest=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Service with the given service, member and log policies.
pub fn service(
    service: ComponentPolicy,
    member: ComponentPolicy,
    log: ComponentPolicy,
) -> MemberService {
    init_tracing();
    MemberService::from_config(&TxnestConfig {
        service,
        member_repository: member,
        log_repository: log,
        ..TxnestConfig::default()
    })
}

/// Whether `username` made it into both stores.
pub fn presence(service: &MemberService, username: &str) -> (bool, bool) {
    (
        service.members().find(username).is_some(),
        service.logs().find(username).is_some(),
    )
}
