//! Service configuration via `txnest.toml`
//!
//! Decides, per component, whether calls run inside a transaction and with
//! which propagation. Swapping a component between `Required`, `RequiresNew`
//! and "not transactional" is a config edit rather than a code change.

use serde::{Deserialize, Serialize};
use std::path::Path;
use txnest_concurrency::ManagerConfig;
use txnest_core::{Isolation, Propagation, TransactionDefinition};

use crate::error::{Error, Result};

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "txnest.toml";

/// Substrings that make a log save fail unless overridden.
pub const DEFAULT_FAILURE_MARKERS: [&str; 2] = ["로그예외", "logException"];

/// Transaction policy for one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPolicy {
    /// Run calls inside a transaction (default: true)
    #[serde(default = "default_true")]
    pub transactional: bool,
    /// Propagation when transactional (default: `required`)
    #[serde(default)]
    pub propagation: Propagation,
    /// Read-only hint (default: false)
    #[serde(default)]
    pub read_only: bool,
    /// Isolation hint (default: `default`)
    #[serde(default)]
    pub isolation: Isolation,
}

fn default_true() -> bool {
    true
}

impl Default for ComponentPolicy {
    fn default() -> Self {
        Self::required()
    }
}

impl ComponentPolicy {
    /// Not transactional: calls use whatever is current.
    pub fn off() -> Self {
        Self {
            transactional: false,
            ..Self::required()
        }
    }

    /// Join or create.
    pub fn required() -> Self {
        Self {
            transactional: true,
            propagation: Propagation::Required,
            read_only: false,
            isolation: Isolation::Default,
        }
    }

    /// Always create, suspending any current transaction.
    pub fn requires_new() -> Self {
        Self {
            propagation: Propagation::RequiresNew,
            ..Self::required()
        }
    }

    /// Definition for this policy, `None` when not transactional.
    pub fn definition(&self, name: &str) -> Option<TransactionDefinition> {
        if !self.transactional {
            return None;
        }
        Some(TransactionDefinition {
            propagation: self.propagation,
            read_only: self.read_only,
            isolation: self.isolation,
            name: Some(name.to_string()),
        })
    }
}

/// Configuration loaded from `txnest.toml`.
///
/// # Example
///
/// ```toml
/// failure_markers = ["logException"]
///
/// [manager]
/// global_rollback_on_participation_failure = true
///
/// [service]
/// transactional = false
///
/// [log_repository]
/// propagation = "requires_new"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnestConfig {
    /// Substrings that make a log save fail.
    #[serde(default = "default_failure_markers")]
    pub failure_markers: Vec<String>,
    /// Transaction manager settings.
    #[serde(default)]
    pub manager: ManagerConfig,
    /// Policy of the orchestrating service.
    #[serde(default)]
    pub service: ComponentPolicy,
    /// Policy of the member repository.
    #[serde(default)]
    pub member_repository: ComponentPolicy,
    /// Policy of the log repository.
    #[serde(default)]
    pub log_repository: ComponentPolicy,
}

fn default_failure_markers() -> Vec<String> {
    DEFAULT_FAILURE_MARKERS.iter().map(|m| m.to_string()).collect()
}

impl Default for TxnestConfig {
    fn default() -> Self {
        Self {
            failure_markers: default_failure_markers(),
            manager: ManagerConfig::default(),
            service: ComponentPolicy::required(),
            member_repository: ComponentPolicy::required(),
            log_repository: ComponentPolicy::required(),
        }
    }
}

impl TxnestConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# txnest configuration
#
# A log save fails when the message contains one of these substrings.
failure_markers = ["로그예외", "logException"]

[manager]
# Mark the whole transaction rollback-only when a participant rolls back.
global_rollback_on_participation_failure = true

# Per-component policy:
#   transactional = true | false
#   propagation   = "required" | "requires_new"
#   read_only     = true | false
#   isolation     = "default" | "read_committed" | "repeatable_read" | "serializable"
[service]
transactional = true
propagation = "required"

[member_repository]
transactional = true
propagation = "required"

[log_repository]
transactional = true
propagation = "required"
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TxnestConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    fn validate(&self) -> Result<()> {
        if self.failure_markers.iter().any(|m| m.is_empty()) {
            return Err(Error::Config(
                "failure_markers must not contain empty strings".to_string(),
            ));
        }
        Ok(())
    }
}
