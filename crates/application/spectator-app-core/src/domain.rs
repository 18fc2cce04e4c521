use std::time::Duration;

use serde::{Deserialize, Serialize};
use spectator_core::{EndpointDraft, EndpointSubmission, SubmissionOutcome, ValidationMode};

/// Identifies one submission attempt so late results can be told apart from current ones.
pub type AttemptId = uuid::Uuid;

/// What happens to the draft once the recorder has accepted it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    #[default]
    Keep,
    ClearOnAccept,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    #[serde(default)]
    pub validation: ValidationMode,
    #[serde(default)]
    pub reset_policy: ResetPolicy,
    #[serde(default)]
    pub dispatch_timeout_secs: Option<u64>,
}

impl FormSettings {
    pub fn dispatch_timeout(&self) -> Option<Duration> {
        self.dispatch_timeout_secs
            .map(spectator_config::clamp_timeout_secs)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Dispatching {
        attempt_id: AttemptId,
        submission: EndpointSubmission,
    },
    Finished {
        attempt_id: AttemptId,
        outcome: SubmissionOutcome,
    },
}

impl DispatchState {
    pub fn is_dispatching(&self) -> bool {
        matches!(self, DispatchState::Dispatching { .. })
    }

    pub fn attempt_id(&self) -> Option<AttemptId> {
        match self {
            DispatchState::Idle => None,
            DispatchState::Dispatching { attempt_id, .. }
            | DispatchState::Finished { attempt_id, .. } => Some(*attempt_id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub draft: EndpointDraft,
    pub dispatch: DispatchState,
    pub last_outcome: Option<SubmissionOutcome>,
    /// Number of submissions that were started, including ones refused by strict validation.
    pub attempts: u32,
    pub notice: Option<String>,
}
