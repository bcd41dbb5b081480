//! `AIRequest` Custom Resource Definition for the approval lifecycle

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "kubedevaiops.kubedevaiops.com",
    version = "v1alpha1",
    kind = "AIRequest"
)]
#[kube(namespaced)]
#[kube(status = "AIRequestStatus")]
#[kube(printcolumn = r#"{"name":"Prompt","type":"string","jsonPath":".spec.prompt"}"#)]
#[kube(
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.conditions[?(@.type=='AwaitingApproval')].reason"}"#
)]
#[kube(printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#)]
pub struct AIRequestSpec {
    /// Natural language request from the user. Immutable input for a given
    /// generation; changing it re-arms the lifecycle.
    pub prompt: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AIRequestStatus {
    /// Last prompt value the controller has processed. A mismatch with
    /// `spec.prompt` signals that reconciliation must re-run the lifecycle.
    #[serde(default)]
    pub observed_prompt: String,

    /// Manifests proposed by the AI provider, in YAML format. Empty until
    /// the generation step has completed for the observed prompt.
    #[serde(default)]
    pub proposed_manifests: String,

    /// Explanation from the AI provider accompanying the proposed manifests.
    #[serde(default)]
    pub ai_explanation: String,

    /// Latest available observations of the request's state. At most one
    /// record exists per condition type.
    #[serde(default)]
    pub conditions: Vec<AIRequestCondition>,
}

/// Condition for the `AIRequest`
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AIRequestCondition {
    /// Type of condition
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Status of the condition (True, False, or Unknown)
    pub status: ConditionStatus,

    /// Last time the condition transitioned (RFC3339 format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// Reason for the condition's last transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message about the condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Boolean-ish condition status, matching the Kubernetes convention.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}
