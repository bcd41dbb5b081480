//! Shared types for the `AIRequest` controller: error taxonomy, the
//! per-reconciliation context, and the namespaced object identity.

use crate::requests::ai::AIProvider;
use crate::requests::config::ControllerConfig;
use crate::requests::store::RequestStore;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by a reconciliation.
///
/// NotFound and write conflicts are deliberately absent: both are absorbed
/// inside the loop (NotFound terminates the pass, a conflict triggers a local
/// re-fetch-and-retry). Only failures the outer controller must back off on
/// are represented here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Reconciliation deadline exceeded for {0}")]
    DeadlineExceeded(RequestId),

    #[error("Watched object has no namespace or name")]
    MissingObjectKey,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Namespace-qualified identity of an `AIRequest` object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub namespace: String,
    pub name: String,
}

impl RequestId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Shared context handed to every reconciliation.
///
/// Collaborators are injected explicitly; there is no package-level client or
/// scheme. Both clients must be safe for concurrent use since reconciliations
/// for different identities run without coordination.
#[derive(Clone)]
pub struct Context {
    pub store: Arc<dyn RequestStore>,
    pub ai: Arc<dyn AIProvider>,
    pub config: Arc<ControllerConfig>,
}
