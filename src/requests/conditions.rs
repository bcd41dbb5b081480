//! Condition bookkeeping for `AIRequest` status.
//!
//! The wire format is the usual Kubernetes condition list, but all mutation
//! goes through [`ConditionSet`], which keys records by condition type so
//! "at most one record per type" is a structural guarantee rather than a
//! convention.

use crate::crds::{AIRequestCondition, ConditionStatus};
use std::collections::BTreeMap;

/// Condition type set while the prompt is being processed. Owned by this
/// controller.
pub const CONDITION_TYPE_PROCESSING: &str = "Processing";

/// Condition type set once proposed manifests are ready for human review.
/// Owned by this controller.
pub const CONDITION_TYPE_AWAITING_APPROVAL: &str = "AwaitingApproval";

/// Condition type recording a generation failure. Owned by this controller.
pub const CONDITION_TYPE_FAILED: &str = "Failed";

/// Condition types written by the external approval/apply actors. This
/// controller observes them but never writes them.
pub const CONDITION_TYPE_APPROVED: &str = "Approved";
pub const CONDITION_TYPE_REJECTED: &str = "Rejected";
pub const CONDITION_TYPE_APPLIED: &str = "Applied";

/// An in-memory view of a condition list, keyed by condition type.
///
/// Pure data model: no I/O, no errors. Persisting the result is the
/// reconciler's responsibility.
#[derive(Debug, Default, Clone)]
pub struct ConditionSet {
    entries: BTreeMap<String, AIRequestCondition>,
}

impl ConditionSet {
    /// Builds a set from the wire list. Duplicate types collapse to the last
    /// record seen, restoring the uniqueness invariant on ingest.
    pub fn from_conditions(conditions: &[AIRequestCondition]) -> Self {
        let mut entries = BTreeMap::new();
        for condition in conditions {
            entries.insert(condition.condition_type.clone(), condition.clone());
        }
        Self { entries }
    }

    /// Upserts a condition. When a record for `condition_type` already exists
    /// with the same status value, `lastTransitionTime` is preserved and only
    /// reason/message are refreshed; a status flip stamps the current time.
    pub fn set(
        &mut self,
        condition_type: &str,
        status: ConditionStatus,
        reason: &str,
        message: &str,
    ) {
        let last_transition_time = match self.entries.get(condition_type) {
            Some(existing) if existing.status == status => existing.last_transition_time.clone(),
            _ => Some(chrono::Utc::now().to_rfc3339()),
        };

        self.entries.insert(
            condition_type.to_string(),
            AIRequestCondition {
                condition_type: condition_type.to_string(),
                status,
                last_transition_time,
                reason: Some(reason.to_string()),
                message: Some(message.to_string()),
            },
        );
    }

    /// Deletes the record for `condition_type`; no-op when absent.
    pub fn remove(&mut self, condition_type: &str) {
        self.entries.remove(condition_type);
    }

    /// Returns the record for `condition_type`, if any.
    pub fn get(&self, condition_type: &str) -> Option<&AIRequestCondition> {
        self.entries.get(condition_type)
    }

    /// Whether a record for `condition_type` exists with status `True`.
    pub fn is_true(&self, condition_type: &str) -> bool {
        self.get(condition_type)
            .map(|c| c.status == ConditionStatus::True)
            .unwrap_or(false)
    }

    /// Converts back to the wire list, ordered by condition type.
    pub fn into_conditions(self) -> Vec<AIRequestCondition> {
        self.entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_inserts_new_condition_with_transition_time() {
        let mut set = ConditionSet::default();
        set.set(
            CONDITION_TYPE_PROCESSING,
            ConditionStatus::True,
            "ProcessingPrompt",
            "The user prompt is being processed by the AI.",
        );

        let condition = set.get(CONDITION_TYPE_PROCESSING).unwrap();
        assert_eq!(condition.status, ConditionStatus::True);
        assert_eq!(condition.reason.as_deref(), Some("ProcessingPrompt"));
        assert!(condition.last_transition_time.is_some());
    }

    #[test]
    fn set_preserves_transition_time_when_status_unchanged() {
        let mut set = ConditionSet::default();
        set.set(
            CONDITION_TYPE_AWAITING_APPROVAL,
            ConditionStatus::True,
            "AwaitingUserApproval",
            "first",
        );
        let original_time = set
            .get(CONDITION_TYPE_AWAITING_APPROVAL)
            .unwrap()
            .last_transition_time
            .clone();

        set.set(
            CONDITION_TYPE_AWAITING_APPROVAL,
            ConditionStatus::True,
            "AwaitingUserApproval",
            "second",
        );

        let condition = set.get(CONDITION_TYPE_AWAITING_APPROVAL).unwrap();
        assert_eq!(condition.last_transition_time, original_time);
        assert_eq!(condition.message.as_deref(), Some("second"));
    }

    #[test]
    fn set_restamps_transition_time_when_status_flips() {
        let mut set = ConditionSet::default();
        set.set(
            CONDITION_TYPE_PROCESSING,
            ConditionStatus::True,
            "ProcessingPrompt",
            "working",
        );

        // Force a distinguishable stored time.
        let mut condition = set.get(CONDITION_TYPE_PROCESSING).unwrap().clone();
        condition.last_transition_time = Some("2000-01-01T00:00:00+00:00".to_string());
        let mut set = ConditionSet::from_conditions(&[condition]);

        set.set(
            CONDITION_TYPE_PROCESSING,
            ConditionStatus::False,
            "Done",
            "finished",
        );

        let condition = set.get(CONDITION_TYPE_PROCESSING).unwrap();
        assert_ne!(
            condition.last_transition_time.as_deref(),
            Some("2000-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let mut set = ConditionSet::default();
        set.remove(CONDITION_TYPE_FAILED);
        assert!(set.get(CONDITION_TYPE_FAILED).is_none());
    }

    #[test]
    fn from_conditions_deduplicates_by_type() {
        let make = |message: &str| AIRequestCondition {
            condition_type: CONDITION_TYPE_PROCESSING.to_string(),
            status: ConditionStatus::True,
            last_transition_time: None,
            reason: None,
            message: Some(message.to_string()),
        };

        let set = ConditionSet::from_conditions(&[make("stale"), make("current")]);
        let conditions = set.into_conditions();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].message.as_deref(), Some("current"));
    }

    #[test]
    fn is_true_distinguishes_status_values() {
        let mut set = ConditionSet::default();
        set.set(
            CONDITION_TYPE_FAILED,
            ConditionStatus::False,
            "Recovered",
            "",
        );
        assert!(!set.is_true(CONDITION_TYPE_FAILED));
        assert!(!set.is_true(CONDITION_TYPE_AWAITING_APPROVAL));

        set.set(CONDITION_TYPE_FAILED, ConditionStatus::True, "Error", "");
        assert!(set.is_true(CONDITION_TYPE_FAILED));
    }
}
