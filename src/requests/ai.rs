//! AI provider seam.
//!
//! The controller only depends on the [`AIProvider`] contract: given a prompt
//! it returns proposed manifests plus an explanation, or fails. Providers must
//! be side-effect free and safe to invoke repeatedly for the same prompt; the
//! reconciler relies on that to stay idempotent under conflict retries.

use crate::requests::types::RequestId;
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a provider. Absorbed by the reconciler into a
/// `Failed` condition, never propagated as a loop error.
#[derive(Error, Debug, Clone)]
#[error("{reason}")]
pub struct AIProviderError {
    pub reason: String,
}

impl AIProviderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Output of a successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedChange {
    /// Proposed Kubernetes manifests, YAML text.
    pub manifests: String,
    /// Human-readable explanation of the proposal.
    pub explanation: String,
}

/// Turns a natural-language prompt into proposed manifests.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generates a proposal for `prompt`. The request identity is provided so
    /// generated manifests can reference the originating object; the provider
    /// must not mutate it or any other shared state.
    async fn generate(
        &self,
        id: &RequestId,
        prompt: &str,
    ) -> Result<GeneratedChange, AIProviderError>;
}

/// Placeholder provider emitting a deterministic ConfigMap manifest.
///
/// Stands in for the real generation backend, which is wired in as an
/// external collaborator. Useful for end-to-end runs without AI credentials.
pub struct TemplateAIProvider {
    model: String,
}

impl TemplateAIProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

#[async_trait]
impl AIProvider for TemplateAIProvider {
    async fn generate(
        &self,
        id: &RequestId,
        prompt: &str,
    ) -> Result<GeneratedChange, AIProviderError> {
        if prompt.trim().is_empty() {
            return Err(AIProviderError::new("prompt must not be empty"));
        }

        let manifests = format!(
            "apiVersion: v1\n\
             kind: ConfigMap\n\
             metadata:\n\
             \x20 name: proposed-{name}\n\
             \x20 namespace: {namespace}\n\
             data:\n\
             \x20 message: \"Proposal generated for prompt: {prompt}\"\n",
            name = id.name,
            namespace = id.namespace,
            prompt = prompt,
        );
        let explanation = format!(
            "Placeholder proposal from model '{}'. A generation backend will \
             replace this with manifests derived from your prompt.",
            self.model
        );

        Ok(GeneratedChange {
            manifests,
            explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn template_provider_references_request_identity() {
        let provider = TemplateAIProvider::new("placeholder");
        let id = RequestId::new("default", "req1");

        let change = provider.generate(&id, "deploy nginx").await.unwrap();
        assert!(change.manifests.contains("proposed-req1"));
        assert!(change.manifests.contains("namespace: default"));
        assert!(change.manifests.contains("deploy nginx"));
        assert!(!change.explanation.is_empty());
    }

    #[tokio::test]
    async fn template_provider_rejects_empty_prompt() {
        let provider = TemplateAIProvider::new("placeholder");
        let id = RequestId::new("default", "req1");

        let err = provider.generate(&id, "   ").await.unwrap_err();
        assert!(err.reason.contains("empty"));
    }
}
