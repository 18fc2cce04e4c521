use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use spectator_core::{validate_submission, EndpointSubmission, SubmissionOutcome, ValidationMode};

use crate::domain::FormSettings;
use crate::ports::{RecordAck, RecordingError, RecordingPort};

/// Per-attempt knobs taken from the form settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    pub validation: ValidationMode,
    pub timeout: Option<Duration>,
}

impl From<&FormSettings> for DispatchOptions {
    fn from(settings: &FormSettings) -> Self {
        Self {
            validation: settings.validation,
            timeout: settings.dispatch_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    AlreadyDispatching,
    #[error("no async runtime available to run the submission")]
    NoRuntime,
}

/// Held for the whole of one attempt. Dropping it returns the dispatcher to idle.
#[derive(Debug)]
pub struct DispatchPermit {
    flag: Arc<AtomicBool>,
}

impl Drop for DispatchPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Hands a snapshot to the recorder exactly once and maps the answer to an outcome.
pub struct RegistrationDispatcher<R> {
    recorder: Arc<R>,
    in_flight: Arc<AtomicBool>,
}

impl<R> Clone for RegistrationDispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            recorder: self.recorder.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<R: RecordingPort> RegistrationDispatcher<R> {
    pub fn new(recorder: R) -> Self {
        Self::from_arc(Arc::new(recorder))
    }

    pub fn from_arc(recorder: Arc<R>) -> Self {
        Self {
            recorder,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn recorder(&self) -> &Arc<R> {
        &self.recorder
    }

    pub fn is_dispatching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the dispatcher for one attempt.
    pub fn try_begin(&self) -> Result<DispatchPermit, SubmitError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SubmitError::AlreadyDispatching)?;
        Ok(DispatchPermit {
            flag: self.in_flight.clone(),
        })
    }

    /// Submit one snapshot. Refused without calling the recorder while another attempt runs.
    pub async fn submit(
        &self,
        submission: EndpointSubmission,
        options: DispatchOptions,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let permit = self.try_begin()?;
        Ok(self.dispatch(permit, submission, options).await)
    }

    /// Run an attempt that has already been claimed with [`Self::try_begin`].
    pub async fn dispatch(
        &self,
        permit: DispatchPermit,
        submission: EndpointSubmission,
        options: DispatchOptions,
    ) -> SubmissionOutcome {
        let _permit = permit;

        let submission = match options.validation {
            ValidationMode::Lenient => submission,
            ValidationMode::Strict => match validate_submission(&submission) {
                Ok(normalized) => normalized,
                Err(e) => {
                    tracing::debug!("submission for {} failed local checks: {}", submission, e);
                    return SubmissionOutcome::Invalid {
                        field: e.field,
                        reason: e.reason,
                    };
                }
            },
        };

        tracing::debug!("dispatching endpoint {}", submission);
        let call = AssertUnwindSafe(self.recorder.record_endpoint(submission)).catch_unwind();
        let result = match options.timeout {
            None => call.await,
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(r) => r,
                Err(_) => Ok(Err(RecordingError::Unreachable(format!(
                    "recorder did not answer within {}s",
                    limit.as_secs()
                )))),
            },
        };

        let outcome = match result {
            Ok(answer) => outcome_from(answer),
            Err(_) => SubmissionOutcome::TransportFailure("recorder panicked".into()),
        };
        match &outcome {
            SubmissionOutcome::Accepted => tracing::debug!("recorder accepted endpoint"),
            other => tracing::warn!("endpoint not recorded: {}", other),
        }
        outcome
    }
}

fn outcome_from(answer: Result<RecordAck, RecordingError>) -> SubmissionOutcome {
    match answer {
        Ok(_) => SubmissionOutcome::Accepted,
        Err(RecordingError::Rejected(reason)) => SubmissionOutcome::Rejected(reason),
        Err(RecordingError::Unreachable(reason)) => SubmissionOutcome::TransportFailure(reason),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use spectator_core::EndpointField;

    use super::*;

    struct Scripted {
        answer: Result<RecordAck, RecordingError>,
        calls: AtomicUsize,
        seen: std::sync::Mutex<Vec<EndpointSubmission>>,
    }

    impl Scripted {
        fn new(answer: Result<RecordAck, RecordingError>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
                seen: Default::default(),
            }
        }
    }

    #[async_trait]
    impl RecordingPort for Scripted {
        async fn record_endpoint(
            &self,
            submission: EndpointSubmission,
        ) -> Result<RecordAck, RecordingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(submission);
            self.answer.clone()
        }
    }

    struct Panicking;

    #[async_trait]
    impl RecordingPort for Panicking {
        async fn record_endpoint(
            &self,
            _submission: EndpointSubmission,
        ) -> Result<RecordAck, RecordingError> {
            panic!("boom");
        }
    }

    struct Stalled;

    #[async_trait]
    impl RecordingPort for Stalled {
        async fn record_endpoint(
            &self,
            _submission: EndpointSubmission,
        ) -> Result<RecordAck, RecordingError> {
            std::future::pending().await
        }
    }

    fn submission(base_url: &str) -> EndpointSubmission {
        EndpointSubmission {
            base_url: base_url.into(),
            platform_id: "steam".into(),
            game_id: "12345".into(),
            encryption_key: "k3y".into(),
        }
    }

    #[tokio::test]
    async fn every_answer_maps_to_one_outcome() {
        let cases = [
            (Ok(RecordAck::default()), SubmissionOutcome::Accepted),
            (
                Err(RecordingError::Rejected("duplicate".into())),
                SubmissionOutcome::Rejected("duplicate".into()),
            ),
            (
                Err(RecordingError::Unreachable("down".into())),
                SubmissionOutcome::TransportFailure("down".into()),
            ),
        ];
        for (answer, expected) in cases {
            let dispatcher = RegistrationDispatcher::new(Scripted::new(answer));
            let outcome = dispatcher
                .submit(submission("http://h"), DispatchOptions::default())
                .await
                .unwrap();
            assert_eq!(outcome, expected);
            assert_eq!(dispatcher.recorder().calls.load(Ordering::SeqCst), 1);
            assert!(!dispatcher.is_dispatching());
        }
    }

    #[tokio::test]
    async fn lenient_mode_forwards_fields_verbatim() {
        let dispatcher = RegistrationDispatcher::new(Scripted::new(Ok(RecordAck::default())));
        let raw = EndpointSubmission {
            base_url: String::new(),
            platform_id: " steam ".into(),
            game_id: "1".into(),
            encryption_key: String::new(),
        };
        dispatcher
            .submit(raw.clone(), DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(dispatcher.recorder().seen.lock().unwrap()[0], raw);
    }

    #[tokio::test]
    async fn strict_mode_refuses_locally_and_forwards_normalized() {
        let dispatcher = RegistrationDispatcher::new(Scripted::new(Ok(RecordAck::default())));
        let strict = DispatchOptions {
            validation: ValidationMode::Strict,
            timeout: None,
        };

        let outcome = dispatcher.submit(submission(""), strict).await.unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Invalid {
                field: EndpointField::BaseUrl,
                reason: "baseUrl is required".into(),
            }
        );
        assert_eq!(dispatcher.recorder().calls.load(Ordering::SeqCst), 0);

        let outcome = dispatcher
            .submit(submission(" https://api.example.com/ "), strict)
            .await
            .unwrap();
        assert_eq!(outcome, SubmissionOutcome::Accepted);
        assert_eq!(
            dispatcher.recorder().seen.lock().unwrap()[0].base_url,
            "https://api.example.com"
        );
    }

    #[tokio::test]
    async fn claimed_dispatcher_refuses_second_submit() {
        let dispatcher = RegistrationDispatcher::new(Scripted::new(Ok(RecordAck::default())));
        let permit = dispatcher.try_begin().unwrap();

        let err = dispatcher
            .submit(submission("http://h"), DispatchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::AlreadyDispatching);
        assert_eq!(dispatcher.recorder().calls.load(Ordering::SeqCst), 0);

        drop(permit);
        assert!(dispatcher
            .submit(submission("http://h"), DispatchOptions::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn panicking_recorder_is_a_transport_failure() {
        let dispatcher = RegistrationDispatcher::new(Panicking);
        let outcome = dispatcher
            .submit(submission("http://h"), DispatchOptions::default())
            .await
            .unwrap();
        assert!(matches!(outcome, SubmissionOutcome::TransportFailure(_)));
        assert!(!dispatcher.is_dispatching());
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_timeout_is_a_transport_failure() {
        let dispatcher = RegistrationDispatcher::new(Stalled);
        let options = DispatchOptions {
            validation: ValidationMode::Lenient,
            timeout: Some(Duration::from_secs(5)),
        };
        let outcome = dispatcher
            .submit(submission("http://h"), options)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::TransportFailure("recorder did not answer within 5s".into())
        );
        assert!(!dispatcher.is_dispatching());
    }
}
