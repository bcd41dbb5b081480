//! AIRequest controller configuration.
//!
//! Loaded from a mounted YAML file at startup, with defaults suitable for
//! development. Contains only the knobs the reconciliation loop consumes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main controller configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// Reconciliation loop configuration
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// AI provider configuration
    #[serde(default)]
    pub ai: AIConfig,
}

/// Reconciliation loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconcileConfig {
    /// Upper bound on a single reconciliation attempt, in seconds. A timed
    /// out attempt abandons without a partial write and is retried later.
    #[serde(
        rename = "deadlineSeconds",
        default = "default_deadline_seconds"
    )]
    pub deadline_seconds: u64,

    /// How many optimistic-concurrency conflicts to absorb locally before
    /// abandoning the attempt and requeueing.
    #[serde(
        rename = "maxConflictRetries",
        default = "default_max_conflict_retries"
    )]
    pub max_conflict_retries: u32,

    /// Requeue delay after local conflict retries are exhausted, in seconds.
    #[serde(
        rename = "conflictRequeueSeconds",
        default = "default_conflict_requeue_seconds"
    )]
    pub conflict_requeue_seconds: u64,

    /// Requeue delay applied by the error policy after a propagated store
    /// failure, in seconds.
    #[serde(
        rename = "errorRequeueSeconds",
        default = "default_error_requeue_seconds"
    )]
    pub error_requeue_seconds: u64,
}

/// AI provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AIConfig {
    /// Model identifier handed to the provider.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_deadline_seconds() -> u64 {
    120
}

fn default_max_conflict_retries() -> u32 {
    5
}

fn default_conflict_requeue_seconds() -> u64 {
    10
}

fn default_error_requeue_seconds() -> u64 {
    30
}

fn default_model() -> String {
    "placeholder".to_string()
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            deadline_seconds: default_deadline_seconds(),
            max_conflict_retries: default_max_conflict_retries(),
            conflict_requeue_seconds: default_conflict_requeue_seconds(),
            error_requeue_seconds: default_error_requeue_seconds(),
        }
    }
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reconcile: ReconcileConfig::default(),
            ai: AIConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a mounted file (e.g. from a ConfigMap volume)
    pub fn from_mounted_file(config_path: &str) -> Result<Self, anyhow::Error> {
        let config_str = std::fs::read_to_string(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {config_path}: {e}"))?;

        let config: ControllerConfig = serde_yaml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config YAML: {e}"))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.reconcile.deadline_seconds == 0 {
            return Err(anyhow::anyhow!(
                "reconcile.deadlineSeconds must be greater than zero"
            ));
        }
        if self.reconcile.max_conflict_retries == 0 {
            return Err(anyhow::anyhow!(
                "reconcile.maxConflictRetries must be greater than zero"
            ));
        }
        if self.ai.model.trim().is_empty() {
            return Err(anyhow::anyhow!("ai.model must not be empty"));
        }
        Ok(())
    }

    pub fn reconcile_deadline(&self) -> Duration {
        Duration::from_secs(self.reconcile.deadline_seconds)
    }

    pub fn conflict_requeue(&self) -> Duration {
        Duration::from_secs(self.reconcile.conflict_requeue_seconds)
    }

    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.reconcile.error_requeue_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconcile.max_conflict_retries, 5);
        assert_eq!(config.ai.model, "placeholder");
    }

    #[test]
    fn parses_partial_yaml_with_defaults() {
        let yaml = r"
reconcile:
  maxConflictRetries: 3
ai:
  model: gpt-4o
";
        let config: ControllerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.reconcile.max_conflict_retries, 3);
        assert_eq!(config.reconcile.deadline_seconds, 120);
        assert_eq!(config.ai.model, "gpt-4o");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_deadline() {
        let mut config = ControllerConfig::default();
        config.reconcile.deadline_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_model() {
        let mut config = ControllerConfig::default();
        config.ai.model = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
