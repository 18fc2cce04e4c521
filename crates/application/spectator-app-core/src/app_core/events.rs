use spectator_core::{EndpointSubmission, FieldEdit, Region, SubmissionOutcome};

use crate::domain::AttemptId;

#[derive(Debug, Clone)]
pub enum FormEvent {
    // Draft
    FieldChanged(FieldEdit),
    RegionApplied(Region),
    DraftReset,

    // Submission lifecycle
    DispatchStarted {
        attempt_id: AttemptId,
        submission: EndpointSubmission,
    },
    DispatchFinished {
        attempt_id: AttemptId,
        outcome: SubmissionOutcome,
    },
    OutcomeAcknowledged,

    // User-visible notices
    Notice(String),
}
