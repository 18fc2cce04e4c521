use std::sync::Arc;

use spectator_core::{EndpointField, EndpointSubmission, FieldEdit, SubmissionOutcome};
use tokio::sync::mpsc;

use crate::app_core::{FormCommand, FormEvent, FormStore};
use crate::dispatcher::{DispatchOptions, DispatchPermit, RegistrationDispatcher, SubmitError};
use crate::domain::{AttemptId, FormSettings, ResetPolicy};
use crate::ports::RecordingPort;

/// One form session: a single draft, a single dispatcher, one attempt at a time.
pub struct FormSession<R> {
    pub store: FormStore,
    dispatcher: RegistrationDispatcher<R>,
    settings: FormSettings,

    tx: mpsc::Sender<FormEvent>,
    rx: mpsc::Receiver<FormEvent>,
}

impl<R: RecordingPort> FormSession<R> {
    pub fn new(store: FormStore, recorder: R, settings: FormSettings) -> Self {
        Self::with_recorder(store, Arc::new(recorder), settings)
    }

    pub fn with_recorder(store: FormStore, recorder: Arc<R>, settings: FormSettings) -> Self {
        let (tx, rx) = mpsc::channel(spectator_config::SESSION_EVENT_CAPACITY);
        Self {
            store,
            dispatcher: RegistrationDispatcher::from_arc(recorder),
            settings,
            tx,
            rx,
        }
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn recorder(&self) -> &Arc<R> {
        self.dispatcher.recorder()
    }

    pub fn set_field(&self, field: EndpointField, value: impl Into<String>) {
        self.dispatch(FormCommand::SetField(FieldEdit::new(field, value)));
    }

    pub fn dispatch(&self, cmd: FormCommand) {
        match cmd {
            FormCommand::SetField(edit) => self.store.apply(FormEvent::FieldChanged(edit)),
            FormCommand::ApplyRegion(region) => {
                self.store.apply(FormEvent::RegionApplied(region))
            }
            FormCommand::ResetDraft => self.store.apply(FormEvent::DraftReset),
            FormCommand::AcknowledgeOutcome => self.store.apply(FormEvent::OutcomeAcknowledged),
            FormCommand::Submit => {
                if let Err(e) = self.submit_in_background() {
                    self.store.apply(FormEvent::Notice(e.to_string()));
                }
            }
        }
    }

    /// Submit the current draft and wait for the outcome.
    ///
    /// Dropping the returned future before it completes finishes the attempt as a
    /// transport failure, so the session can submit again.
    pub async fn submit(&self) -> Result<SubmissionOutcome, SubmitError> {
        let (permit, attempt_id, submission) = self.begin()?;
        let mut guard = AbandonGuard {
            store: &self.store,
            attempt_id,
            armed: true,
        };
        let outcome = self
            .dispatcher
            .dispatch(permit, submission, self.options())
            .await;
        guard.armed = false;
        self.finish(attempt_id, outcome.clone());
        Ok(outcome)
    }

    /// Submit the current draft on the tokio runtime; the outcome arrives through [`Self::tick`].
    pub fn submit_in_background(&self) -> Result<AttemptId, SubmitError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| SubmitError::NoRuntime)?;
        let (permit, attempt_id, submission) = self.begin()?;

        let dispatcher = self.dispatcher.clone();
        let options = self.options();
        let tx = self.tx.clone();
        handle.spawn(async move {
            let outcome = dispatcher.dispatch(permit, submission, options).await;
            if tx
                .send(FormEvent::DispatchFinished {
                    attempt_id,
                    outcome,
                })
                .await
                .is_err()
            {
                tracing::debug!("session closed before attempt {} finished", attempt_id);
            }
        });
        Ok(attempt_id)
    }

    pub fn tick(&mut self) {
        while let Ok(ev) = self.rx.try_recv() {
            match ev {
                FormEvent::DispatchFinished {
                    attempt_id,
                    outcome,
                } => self.finish(attempt_id, outcome),
                other => self.store.apply(other),
            }
        }
    }

    pub fn sender(&self) -> mpsc::Sender<FormEvent> {
        self.tx.clone()
    }

    fn options(&self) -> DispatchOptions {
        DispatchOptions::from(&self.settings)
    }

    fn begin(&self) -> Result<(DispatchPermit, AttemptId, EndpointSubmission), SubmitError> {
        let permit = self.dispatcher.try_begin()?;
        let attempt_id: AttemptId = uuid::Uuid::new_v4();
        let submission = self
            .store
            .begin_dispatch(attempt_id)
            .ok_or(SubmitError::AlreadyDispatching)?;
        tracing::info!("attempt {} submitting {}", attempt_id, submission);
        Ok((permit, attempt_id, submission))
    }

    fn finish(&self, attempt_id: AttemptId, outcome: SubmissionOutcome) {
        let clear = outcome.is_accepted() && self.settings.reset_policy == ResetPolicy::ClearOnAccept;
        let line = outcome.to_string();
        if self.store.finish_dispatch(attempt_id, outcome, clear) {
            tracing::info!("attempt {} finished: {}", attempt_id, line);
        } else {
            tracing::debug!("ignoring result of stale attempt {}", attempt_id);
        }
    }
}

/// Ends an awaited attempt whose future was dropped before the recorder answered.
struct AbandonGuard<'a> {
    store: &'a FormStore,
    attempt_id: AttemptId,
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let outcome = SubmissionOutcome::TransportFailure("submission cancelled".into());
        if self.store.finish_dispatch(self.attempt_id, outcome, false) {
            tracing::warn!("attempt {} dropped before the recorder answered", self.attempt_id);
        }
    }
}
