use std::fmt;

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointField;

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum SubmissionOutcome {
    /// The recorder acknowledged the endpoint.
    Accepted,
    /// The recorder refused the endpoint (duplicate, bad input, ...).
    Rejected(String),
    /// The recorder could not be reached or did not finish.
    TransportFailure(String),
    /// Local validation failed; the recorder was never called.
    Invalid { field: EndpointField, reason: String },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted)
    }

    /// Whether the recorder was actually called for this outcome.
    pub fn reached_recorder(&self) -> bool {
        !matches!(self, SubmissionOutcome::Invalid { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Accepted => None,
            SubmissionOutcome::Rejected(r) | SubmissionOutcome::TransportFailure(r) => Some(r),
            SubmissionOutcome::Invalid { reason, .. } => Some(reason),
        }
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionOutcome::Accepted => write!(f, "accepted"),
            SubmissionOutcome::Rejected(r) => write!(f, "rejected: {r}"),
            SubmissionOutcome::TransportFailure(r) => write!(f, "transport failure: {r}"),
            SubmissionOutcome::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}
