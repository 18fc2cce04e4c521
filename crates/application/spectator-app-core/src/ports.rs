use async_trait::async_trait;
use spectator_core::EndpointSubmission;

use crate::domain::FormSettings;

/// Acknowledgement from the recorder. `endpoint_id` is set when the recorder assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordAck {
    pub endpoint_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordingError {
    /// The recorder looked at the submission and refused it.
    #[error("{0}")]
    Rejected(String),
    /// The call did not complete.
    #[error("{0}")]
    Unreachable(String),
}

/// The single registration entry point a submission is handed to.
#[async_trait]
pub trait RecordingPort: Send + Sync + 'static {
    async fn record_endpoint(
        &self,
        submission: EndpointSubmission,
    ) -> Result<RecordAck, RecordingError>;
}

pub trait SettingsRepo: Send + Sync + 'static {
    fn load(&self) -> anyhow::Result<FormSettings>;
    fn save(&self, settings: &FormSettings) -> anyhow::Result<()>;
}
