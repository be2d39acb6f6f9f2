//! Service layer for txnest
//!
//! This crate wires business components onto the transaction manager:
//! - TxBoundary: explicit transaction demarcation per component
//! - MemberRepository / LogRepository: record stores behind boundaries
//! - MemberService: `join_v1` / `join_v2` orchestration
//! - LevelService: read-only default with a read-write override
//! - TxnestConfig: per-component policies loaded from `txnest.toml`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod config;
pub mod error;
pub mod level;
pub mod repository;
pub mod service;

pub use boundary::TxBoundary;
pub use config::{ComponentPolicy, TxnestConfig, CONFIG_FILE_NAME, DEFAULT_FAILURE_MARKERS};
pub use error::{Error, Result};
pub use level::{LevelService, TxInfo};
pub use repository::{Log, LogRepository, Member, MemberRepository};
pub use service::MemberService;
