use crate::domain::{DispatchState, FormState};

use super::events::FormEvent;

pub fn reduce(mut state: FormState, ev: FormEvent) -> FormState {
    match ev {
        FormEvent::FieldChanged(edit) => state.draft.set_field(edit.field, edit.value),
        FormEvent::RegionApplied(region) => state.draft.apply_region(region),
        FormEvent::DraftReset => state.draft = Default::default(),

        FormEvent::DispatchStarted {
            attempt_id,
            submission,
        } => {
            state.notice = None;
            state.attempts = state.attempts.saturating_add(1);
            state.dispatch = DispatchState::Dispatching {
                attempt_id,
                submission,
            };
        }

        FormEvent::DispatchFinished {
            attempt_id,
            outcome,
        } => {
            // Only the attempt currently in flight may finish.
            let current = matches!(
                &state.dispatch,
                DispatchState::Dispatching { attempt_id: id, .. } if *id == attempt_id
            );
            if current {
                state.last_outcome = Some(outcome.clone());
                state.dispatch = DispatchState::Finished {
                    attempt_id,
                    outcome,
                };
            }
        }

        FormEvent::OutcomeAcknowledged => {
            if matches!(state.dispatch, DispatchState::Finished { .. }) {
                state.dispatch = DispatchState::Idle;
            }
            state.notice = None;
        }

        FormEvent::Notice(msg) => state.notice = Some(msg),
    }
    state
}

#[cfg(test)]
mod tests {
    use spectator_core::{EndpointField, FieldEdit, Region, SubmissionOutcome};

    use super::*;

    fn started(state: FormState) -> (FormState, uuid::Uuid) {
        let attempt_id = uuid::Uuid::new_v4();
        let submission = state.draft.snapshot();
        let state = reduce(
            state,
            FormEvent::DispatchStarted {
                attempt_id,
                submission,
            },
        );
        (state, attempt_id)
    }

    #[test]
    fn field_change_touches_only_that_field() {
        let state = reduce(
            FormState::default(),
            FormEvent::FieldChanged(FieldEdit::new(EndpointField::GameId, "42")),
        );
        assert_eq!(state.draft.field(EndpointField::GameId), "42");
        assert_eq!(state.draft.field(EndpointField::BaseUrl), "");
        assert_eq!(state.draft.field(EndpointField::PlatformId), "");
        assert_eq!(state.draft.field(EndpointField::EncryptionKey), "");
    }

    #[test]
    fn region_fills_url_and_platform_only() {
        let mut state = FormState::default();
        state.draft.set_field(EndpointField::GameId, "7");
        state.draft.set_field(EndpointField::EncryptionKey, "k");

        let state = reduce(state, FormEvent::RegionApplied(Region::Euw1));
        assert_eq!(
            state.draft.field(EndpointField::BaseUrl),
            "http://spectator-consumer.euw1.lol.pvp.net:80"
        );
        assert_eq!(state.draft.field(EndpointField::PlatformId), "EUW1");
        assert_eq!(state.draft.field(EndpointField::GameId), "7");
        assert_eq!(state.draft.field(EndpointField::EncryptionKey), "k");
    }

    #[test]
    fn finish_for_other_attempt_is_ignored() {
        let (state, current) = started(FormState::default());
        let state = reduce(
            state,
            FormEvent::DispatchFinished {
                attempt_id: uuid::Uuid::new_v4(),
                outcome: SubmissionOutcome::Accepted,
            },
        );
        assert_eq!(state.dispatch.attempt_id(), Some(current));
        assert!(state.dispatch.is_dispatching());
        assert!(state.last_outcome.is_none());
    }

    #[test]
    fn finish_records_outcome_and_keeps_draft() {
        let mut state = FormState::default();
        state.draft.set_field(EndpointField::BaseUrl, "http://h");
        let (state, attempt_id) = started(state);
        let state = reduce(
            state,
            FormEvent::DispatchFinished {
                attempt_id,
                outcome: SubmissionOutcome::Rejected("no".into()),
            },
        );

        assert_eq!(
            state.last_outcome,
            Some(SubmissionOutcome::Rejected("no".into()))
        );
        assert_eq!(state.draft.field(EndpointField::BaseUrl), "http://h");
        assert_eq!(state.attempts, 1);

        let state = reduce(state, FormEvent::OutcomeAcknowledged);
        assert_eq!(state.dispatch, DispatchState::Idle);
        assert!(state.last_outcome.is_some());
    }

    #[test]
    fn acknowledge_does_not_cancel_in_flight_attempt() {
        let (state, _) = started(FormState::default());
        let state = reduce(state, FormEvent::OutcomeAcknowledged);
        assert!(state.dispatch.is_dispatching());
    }
}
