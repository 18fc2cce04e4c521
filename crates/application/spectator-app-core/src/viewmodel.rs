use spectator_core::{check_field, mask_secret, EndpointField, SubmissionOutcome, ValidationMode};

use crate::domain::{DispatchState, FormSettings, FormState};

#[derive(Debug, Clone)]
pub struct FieldVm {
    pub field: EndpointField,
    pub label: &'static str,
    pub placeholder: &'static str,
    /// What the input shows. The key is masked.
    pub display_value: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct EndpointFormVm {
    pub fields: Vec<FieldVm>,
    pub can_submit: bool,
    pub is_dispatching: bool,
    pub status: Option<(StatusTone, String)>,
    pub attempts: u32,
}

fn label(field: EndpointField) -> &'static str {
    match field {
        EndpointField::BaseUrl => "Base URL",
        EndpointField::PlatformId => "Platform ID",
        EndpointField::GameId => "Game ID",
        EndpointField::EncryptionKey => "Encryption key",
    }
}

fn placeholder(field: EndpointField) -> &'static str {
    match field {
        EndpointField::BaseUrl => "Enter base url",
        EndpointField::PlatformId => "Enter platform id",
        EndpointField::GameId => "Enter game id",
        EndpointField::EncryptionKey => "Enter encryption key",
    }
}

fn status(state: &FormState) -> Option<(StatusTone, String)> {
    if let Some(notice) = &state.notice {
        return Some((StatusTone::Error, notice.clone()));
    }
    match &state.dispatch {
        DispatchState::Idle => None,
        DispatchState::Dispatching { submission, .. } => Some((
            StatusTone::Neutral,
            format!("Recording {}…", submission),
        )),
        DispatchState::Finished { outcome, .. } => Some(match outcome {
            SubmissionOutcome::Accepted => (StatusTone::Success, "Endpoint recorded".into()),
            SubmissionOutcome::Rejected(reason) => {
                (StatusTone::Error, format!("Recorder refused the endpoint: {reason}"))
            }
            SubmissionOutcome::TransportFailure(reason) => (
                StatusTone::Error,
                format!("Could not reach the recorder: {reason}. You can retry."),
            ),
            SubmissionOutcome::Invalid { field, reason } => {
                (StatusTone::Error, format!("{}: {reason}", label(*field)))
            }
        }),
    }
}

/// Hints are always computed; only strict mode lets them block submission.
pub fn endpoint_form_vm(state: &FormState, settings: &FormSettings) -> EndpointFormVm {
    let fields: Vec<FieldVm> = EndpointField::ALL
        .into_iter()
        .map(|field| {
            let raw = state.draft.field(field);
            let display_value = if field.is_secret() {
                mask_secret(raw)
            } else {
                raw.to_string()
            };
            FieldVm {
                field,
                label: label(field),
                placeholder: placeholder(field),
                display_value,
                hint: check_field(field, raw).err().map(|e| e.reason),
            }
        })
        .collect();

    let is_dispatching = state.dispatch.is_dispatching();
    let locally_valid = fields.iter().all(|f| f.hint.is_none());
    let can_submit = !is_dispatching
        && (settings.validation == ValidationMode::Lenient || locally_valid);

    EndpointFormVm {
        fields,
        can_submit,
        is_dispatching,
        status: status(state),
        attempts: state.attempts,
    }
}
