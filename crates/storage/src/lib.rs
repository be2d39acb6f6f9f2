//! Storage layer for txnest
//!
//! This crate implements the record store repositories write through:
//! - RecordStore: keyed durable records behind `parking_lot::RwLock`
//! - Per-transaction pending effect sets in a `DashMap`
//! - Enlistment with the current physical transaction on first write

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod record_store;

pub use record_store::RecordStore;
