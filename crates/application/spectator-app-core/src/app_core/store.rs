use std::sync::{Arc, Mutex};

use spectator_core::{EndpointDraft, EndpointSubmission, SubmissionOutcome};

use crate::domain::{AttemptId, DispatchState, FormState};

use super::{events::FormEvent, reducer::reduce};

/// Session-scoped owner of the form state. Clones share the same state.
#[derive(Clone, Default)]
pub struct FormStore {
    inner: Arc<Mutex<FormState>>,
}

impl FormStore {
    pub fn new(state: FormState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> FormState {
        self.inner.lock().expect("form state lock poisoned").clone()
    }

    pub fn draft(&self) -> EndpointDraft {
        self.inner
            .lock()
            .expect("form state lock poisoned")
            .draft
            .clone()
    }

    pub fn apply(&self, ev: FormEvent) {
        let mut guard = self.inner.lock().expect("form state lock poisoned");
        let next = reduce(guard.clone(), ev);
        *guard = next;
    }

    /// Snapshot the draft and mark the attempt as started, under one lock.
    ///
    /// Returns `None` when an attempt is already in flight.
    pub(crate) fn begin_dispatch(&self, attempt_id: AttemptId) -> Option<EndpointSubmission> {
        let mut guard = self.inner.lock().expect("form state lock poisoned");
        if guard.dispatch.is_dispatching() {
            return None;
        }
        let submission = guard.draft.snapshot();
        let next = reduce(
            guard.clone(),
            FormEvent::DispatchStarted {
                attempt_id,
                submission: submission.clone(),
            },
        );
        *guard = next;
        Some(submission)
    }

    /// Finish the attempt in flight and, when asked, clear the draft in the same step.
    ///
    /// Returns `false` without touching state when `attempt_id` is not the attempt in flight.
    pub(crate) fn finish_dispatch(
        &self,
        attempt_id: AttemptId,
        outcome: SubmissionOutcome,
        clear_draft: bool,
    ) -> bool {
        let mut guard = self.inner.lock().expect("form state lock poisoned");
        let current = matches!(
            &guard.dispatch,
            DispatchState::Dispatching { attempt_id: id, .. } if *id == attempt_id
        );
        if !current {
            return false;
        }
        let mut next = reduce(
            guard.clone(),
            FormEvent::DispatchFinished {
                attempt_id,
                outcome,
            },
        );
        if clear_draft {
            next = reduce(next, FormEvent::DraftReset);
        }
        *guard = next;
        true
    }
}
