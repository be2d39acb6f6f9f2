//! End-to-end propagation scenarios
//!
//! Each scenario wires a `MemberService` with a different combination of
//! component policies and checks which records survive.
//!
//! ## Running These Tests
//!
//! ```bash
//! cargo test --test propagation
//! ```

mod common;

mod basic;
mod level;
mod recover;
mod rollback_scope;
mod stack_discipline;
