//! Versioned access to `AIRequest` objects.
//!
//! The reconciler never talks to the Kubernetes API directly; it goes through
//! [`RequestStore`] so the conflict-retry loop can be exercised against an
//! in-memory store in tests. The production implementation wraps
//! `kube::Api<AIRequest>` and maps the API server's optimistic-concurrency
//! responses (409, 404) to typed outcomes.

use crate::crds::{AIRequest, AIRequestStatus};
use crate::requests::types::{Error, RequestId, Result};
use async_trait::async_trait;
use kube::api::PostParams;
use kube::{Api, Client, ResourceExt};

/// An `AIRequest` together with the resourceVersion it was read at.
#[derive(Debug, Clone)]
pub struct VersionedRequest {
    pub request: AIRequest,
    pub version: String,
}

/// Outcome of a conditional status write.
#[derive(Debug, Clone)]
pub enum StatusCommit {
    /// The write landed; the store returned the new resourceVersion.
    Committed { new_version: String },
    /// The expected version was stale; nothing was written.
    Conflict,
}

/// Versioned key-object store for `AIRequest` objects.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Fetches the current object and its resourceVersion. `Ok(None)` means
    /// the object no longer exists.
    async fn get(&self, id: &RequestId) -> Result<Option<VersionedRequest>>;

    /// Writes `status` through the status subresource, conditioned on
    /// `version` still being current. A stale version yields
    /// [`StatusCommit::Conflict`] and writes nothing.
    async fn update_status(
        &self,
        request: &AIRequest,
        version: &str,
        status: &AIRequestStatus,
    ) -> Result<StatusCommit>;
}

/// Production store backed by the Kubernetes API server.
pub struct KubeRequestStore {
    client: Client,
}

impl KubeRequestStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<AIRequest> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl RequestStore for KubeRequestStore {
    async fn get(&self, id: &RequestId) -> Result<Option<VersionedRequest>> {
        match self.api(&id.namespace).get(&id.name).await {
            Ok(request) => {
                let version = request.resource_version().ok_or_else(|| {
                    Error::StoreError(format!("AIRequest {id} has no resourceVersion"))
                })?;
                Ok(Some(VersionedRequest { request, version }))
            }
            Err(kube::Error::Api(response)) if response.code == 404 => Ok(None),
            Err(err) => Err(Error::KubeError(err)),
        }
    }

    async fn update_status(
        &self,
        request: &AIRequest,
        version: &str,
        status: &AIRequestStatus,
    ) -> Result<StatusCommit> {
        let name = request.name_any();
        let namespace = request.namespace().ok_or(Error::MissingObjectKey)?;

        // replace_status with the resourceVersion read earlier makes the API
        // server reject stale writes with 409 instead of overwriting.
        let mut updated = request.clone();
        updated.metadata.resource_version = Some(version.to_string());
        updated.metadata.managed_fields = None;
        updated.status = Some(status.clone());

        let body = serde_json::to_vec(&updated)?;
        match self
            .api(&namespace)
            .replace_status(&name, &PostParams::default(), body)
            .await
        {
            Ok(persisted) => {
                let new_version = persisted.resource_version().ok_or_else(|| {
                    Error::StoreError(format!(
                        "AIRequest {namespace}/{name} has no resourceVersion after status write"
                    ))
                })?;
                Ok(StatusCommit::Committed { new_version })
            }
            Err(kube::Error::Api(response)) if response.code == 409 => Ok(StatusCommit::Conflict),
            Err(err) => Err(Error::KubeError(err)),
        }
    }
}
