//! Core reconciliation loop for `AIRequest` objects.
//!
//! Level-triggered: each pass re-fetches the latest object, derives the target
//! status from `spec.prompt` and the current conditions, and commits it with a
//! version-conditioned write. Conflicts are absorbed by re-fetching and
//! recomputing; the generation result is cached for the duration of the pass
//! so a non-idempotent provider is never invoked twice for the same prompt.

use crate::crds::{AIRequest, AIRequestStatus, ConditionStatus};
use crate::requests::ai::GeneratedChange;
use crate::requests::conditions::{
    ConditionSet, CONDITION_TYPE_APPLIED, CONDITION_TYPE_APPROVED,
    CONDITION_TYPE_AWAITING_APPROVAL, CONDITION_TYPE_FAILED, CONDITION_TYPE_PROCESSING,
    CONDITION_TYPE_REJECTED,
};
use crate::requests::store::StatusCommit;
use crate::requests::types::{Context, RequestId, Result};
use kube::runtime::controller::Action;
use tracing::{debug, info, warn};

/// Condition types whose presence marks the observed prompt's generation as
/// already processed. The last three are written by external actors.
const OUTCOME_CONDITION_TYPES: [&str; 5] = [
    CONDITION_TYPE_AWAITING_APPROVAL,
    CONDITION_TYPE_FAILED,
    CONDITION_TYPE_APPROVED,
    CONDITION_TYPE_REJECTED,
    CONDITION_TYPE_APPLIED,
];

/// Result of the generation step, success or failure. A failure is data, not
/// an error: it is recorded as a `Failed` condition and the pass still
/// commits normally.
#[derive(Debug, Clone)]
enum GenerationOutcome {
    Proposed(GeneratedChange),
    Failed { reason: String },
}

/// Runs one reconciliation for `id`: fetch, compute, conditionally commit.
///
/// Returns `Action::await_change()` once the stored status matches the
/// desired status (including the not-found and already-processed cases), and
/// `Action::requeue` when local conflict retries are exhausted. Store
/// failures other than 404/409 propagate to the caller's error policy.
pub async fn reconcile_request(id: &RequestId, ctx: &Context) -> Result<Action> {
    let Some(mut current) = ctx.store.get(id).await? else {
        debug!("AIRequest {id} no longer exists, nothing to reconcile");
        return Ok(Action::await_change());
    };

    // One generation per pass: conflict retries reuse this instead of
    // re-invoking the provider for the same prompt.
    let mut generated: Option<(String, GenerationOutcome)> = None;

    let max_retries = ctx.config.reconcile.max_conflict_retries;
    for attempt in 0..max_retries {
        if !needs_processing(&current.request) {
            debug!(
                "AIRequest {id} already processed for prompt '{}', nothing to do",
                current.request.spec.prompt
            );
            return Ok(Action::await_change());
        }

        let prompt = current.request.spec.prompt.clone();
        let outcome = match &generated {
            Some((cached_prompt, outcome)) if *cached_prompt == prompt => outcome.clone(),
            _ => {
                info!("Generating proposal for AIRequest {id}");
                let outcome = match ctx.ai.generate(id, &prompt).await {
                    Ok(change) => GenerationOutcome::Proposed(change),
                    Err(err) => {
                        warn!("AI provider failed for AIRequest {id}: {err}");
                        GenerationOutcome::Failed { reason: err.reason }
                    }
                };
                generated = Some((prompt.clone(), outcome.clone()));
                outcome
            }
        };

        let status = next_status(&current.request, &prompt, &outcome);
        match ctx
            .store
            .update_status(&current.request, &current.version, &status)
            .await?
        {
            StatusCommit::Committed { new_version } => {
                info!(
                    "Reconciled AIRequest {id} at version {new_version}, \
                     now quiescent until the next change"
                );
                return Ok(Action::await_change());
            }
            StatusCommit::Conflict => {
                warn!(
                    "Status write for AIRequest {id} hit a version conflict \
                     (attempt {attempt}), re-fetching"
                );
                match ctx.store.get(id).await? {
                    Some(fresh) => current = fresh,
                    None => {
                        debug!("AIRequest {id} deleted during conflict retry");
                        return Ok(Action::await_change());
                    }
                }
            }
        }
    }

    warn!("Abandoning AIRequest {id} after {max_retries} conflicting writes, requeueing");
    Ok(Action::requeue(ctx.config.conflict_requeue()))
}

/// Whether the current generation still needs the AI step.
///
/// A generation counts as processed once `observedPrompt` matches
/// `spec.prompt` and some outcome condition records where it ended up. This
/// is the gate that keeps redundant invocations and conflict retries from
/// duplicating provider calls.
fn needs_processing(request: &AIRequest) -> bool {
    let Some(status) = &request.status else {
        return true;
    };
    if status.observed_prompt != request.spec.prompt {
        return true;
    }
    let conditions = ConditionSet::from_conditions(&status.conditions);
    !OUTCOME_CONDITION_TYPES
        .iter()
        .any(|condition_type| conditions.get(condition_type).is_some())
}

/// Computes the target status from the freshly fetched object.
///
/// Starts from the current status so condition types owned by other actors
/// pass through untouched; only `Processing`, `AwaitingApproval` and `Failed`
/// are rewritten here.
fn next_status(request: &AIRequest, prompt: &str, outcome: &GenerationOutcome) -> AIRequestStatus {
    let mut status = request.status.clone().unwrap_or_default();
    let mut conditions = ConditionSet::from_conditions(&status.conditions);

    status.observed_prompt = prompt.to_string();
    conditions.set(
        CONDITION_TYPE_PROCESSING,
        ConditionStatus::True,
        "ProcessingPrompt",
        "The user prompt is being processed by the AI.",
    );

    match outcome {
        GenerationOutcome::Proposed(change) => {
            status.proposed_manifests = change.manifests.clone();
            status.ai_explanation = change.explanation.clone();
            conditions.remove(CONDITION_TYPE_PROCESSING);
            // Re-deriving this generation's outcome supersedes a Failed
            // condition recorded for an earlier prompt.
            conditions.remove(CONDITION_TYPE_FAILED);
            conditions.set(
                CONDITION_TYPE_AWAITING_APPROVAL,
                ConditionStatus::True,
                "AwaitingUserApproval",
                "AI has processed the prompt and proposed manifests are awaiting user approval.",
            );
        }
        GenerationOutcome::Failed { reason } => {
            // Manifests are only ever non-empty at or past AwaitingApproval.
            status.proposed_manifests.clear();
            status.ai_explanation.clear();
            conditions.remove(CONDITION_TYPE_PROCESSING);
            conditions.remove(CONDITION_TYPE_AWAITING_APPROVAL);
            conditions.set(
                CONDITION_TYPE_FAILED,
                ConditionStatus::True,
                "AIProviderError",
                reason,
            );
        }
    }

    status.conditions = conditions.into_conditions();
    status
}
