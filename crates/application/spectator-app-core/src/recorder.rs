use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use spectator_core::EndpointSubmission;
use spectator_persistence::{EndpointStore, RedbEndpointStore, StorageError};

use crate::ports::{RecordAck, RecordingError, RecordingPort};

/// Records endpoints into an [`EndpointStore`] rooted at a directory.
pub struct StoreRecorder<S = RedbEndpointStore> {
    store: Arc<S>,
    root: Utf8PathBuf,
}

impl StoreRecorder<RedbEndpointStore> {
    pub fn redb(root: impl Into<Utf8PathBuf>) -> Self {
        Self::new(RedbEndpointStore::new(), root)
    }
}

impl<S: EndpointStore + 'static> StoreRecorder<S> {
    pub fn new(store: S, root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            store: Arc::new(store),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn classify(err: StorageError) -> RecordingError {
    if err.kind().is_refusal() {
        RecordingError::Rejected(err.to_string())
    } else {
        RecordingError::Unreachable(err.to_string())
    }
}

#[async_trait]
impl<S: EndpointStore + 'static> RecordingPort for StoreRecorder<S> {
    async fn record_endpoint(
        &self,
        submission: EndpointSubmission,
    ) -> Result<RecordAck, RecordingError> {
        let store = self.store.clone();
        let root = self.root.clone();
        let joined =
            tokio::task::spawn_blocking(move || store.insert_endpoint(&root, &submission)).await;

        match joined {
            Ok(Ok(record)) => Ok(RecordAck {
                endpoint_id: Some(record.id),
            }),
            Ok(Err(e)) => Err(classify(e)),
            Err(e) => Err(RecordingError::Unreachable(format!(
                "recorder worker failed: {e}"
            ))),
        }
    }
}
