use std::fmt;

use camino::Utf8Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spectator_core::EndpointSubmission;

pub use spectator_config::ENDPOINT_STORE_FILENAME;
pub const CURRENT_SCHEMA: u32 = 1;

pub type EndpointId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbState {
    Missing,
    Valid,
    Busy,
    Corrupt,
    NewerSchema { found: u32, supported: u32 },
}

/// A durably recorded endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointRecord {
    pub id: EndpointId,
    pub base_url: String,
    pub platform_id: String,
    pub game_id: String,
    pub encryption_key: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for EndpointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRecord")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("platform_id", &self.platform_id)
            .field("game_id", &self.game_id)
            .field("encryption_key", &spectator_core::endpoint::REDACTED)
            .field("created_at", &self.created_at)
            .finish()
    }
}

pub trait EndpointStore: Send + Sync {
    fn validate(&self, root: &Utf8Path) -> Result<DbState, crate::StorageError>;

    /// Record one endpoint. The record and its (platform, game) index entry
    /// are committed in the same transaction.
    fn insert_endpoint(
        &self,
        root: &Utf8Path,
        submission: &EndpointSubmission,
    ) -> Result<EndpointRecord, crate::StorageError>;

    fn load_endpoint(
        &self,
        root: &Utf8Path,
        id: &str,
    ) -> Result<EndpointRecord, crate::StorageError>;

    fn find_endpoint(
        &self,
        root: &Utf8Path,
        platform_id: &str,
        game_id: &str,
    ) -> Result<Option<EndpointRecord>, crate::StorageError>;
}
