use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::region::Region;

pub const REDACTED: &str = "<redacted>";

/// One of the four editable fields of an endpoint draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndpointField {
    BaseUrl,
    PlatformId,
    GameId,
    EncryptionKey,
}

impl EndpointField {
    /// All fields in form order.
    pub const ALL: [EndpointField; 4] = [
        EndpointField::BaseUrl,
        EndpointField::PlatformId,
        EndpointField::GameId,
        EndpointField::EncryptionKey,
    ];

    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointField::BaseUrl => "baseUrl",
            EndpointField::PlatformId => "platformId",
            EndpointField::GameId => "gameId",
            EndpointField::EncryptionKey => "encryptionKey",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, EndpointField::EncryptionKey)
    }
}

impl fmt::Display for EndpointField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not an endpoint field")]
pub struct ParseFieldError(pub String);

impl FromStr for EndpointField {
    type Err = ParseFieldError;

    /// Accepts the wire name as well as kebab/snake spellings (`base-url`, `base_url`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "baseurl" => Ok(EndpointField::BaseUrl),
            "platformid" => Ok(EndpointField::PlatformId),
            "gameid" => Ok(EndpointField::GameId),
            "encryptionkey" => Ok(EndpointField::EncryptionKey),
            _ => Err(ParseFieldError(s.to_string())),
        }
    }
}

/// In-progress endpoint record edited one field at a time.
///
/// Values are stored exactly as entered; nothing is trimmed or checked here.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EndpointDraft {
    base_url: String,
    platform_id: String,
    game_id: String,
    encryption_key: String,
}

impl EndpointDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one field. The other three are left as they were.
    pub fn set_field(&mut self, field: EndpointField, value: impl Into<String>) {
        let value = value.into();
        match field {
            EndpointField::BaseUrl => self.base_url = value,
            EndpointField::PlatformId => self.platform_id = value,
            EndpointField::GameId => self.game_id = value,
            EndpointField::EncryptionKey => self.encryption_key = value,
        }
    }

    pub fn field(&self, field: EndpointField) -> &str {
        match field {
            EndpointField::BaseUrl => &self.base_url,
            EndpointField::PlatformId => &self.platform_id,
            EndpointField::GameId => &self.game_id,
            EndpointField::EncryptionKey => &self.encryption_key,
        }
    }

    /// Fill base URL and platform id from a well-known region.
    pub fn apply_region(&mut self, region: Region) {
        self.set_field(EndpointField::BaseUrl, region.base_url());
        self.set_field(EndpointField::PlatformId, region.platform_id());
    }

    pub fn is_empty(&self) -> bool {
        EndpointField::ALL.iter().all(|f| self.field(*f).is_empty())
    }

    /// Read-only copy of all four fields, taken at submit time.
    pub fn snapshot(&self) -> EndpointSubmission {
        EndpointSubmission {
            base_url: self.base_url.clone(),
            platform_id: self.platform_id.clone(),
            game_id: self.game_id.clone(),
            encryption_key: self.encryption_key.clone(),
        }
    }
}

impl fmt::Debug for EndpointDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDraft")
            .field("base_url", &self.base_url)
            .field("platform_id", &self.platform_id)
            .field("game_id", &self.game_id)
            .field("encryption_key", &REDACTED)
            .finish()
    }
}

/// The unit handed to the recording collaborator. All four fields travel together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSubmission {
    pub base_url: String,
    pub platform_id: String,
    pub game_id: String,
    pub encryption_key: String,
}

impl EndpointSubmission {
    pub fn field(&self, field: EndpointField) -> &str {
        match field {
            EndpointField::BaseUrl => &self.base_url,
            EndpointField::PlatformId => &self.platform_id,
            EndpointField::GameId => &self.game_id,
            EndpointField::EncryptionKey => &self.encryption_key,
        }
    }
}

impl fmt::Debug for EndpointSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointSubmission")
            .field("base_url", &self.base_url)
            .field("platform_id", &self.platform_id)
            .field("game_id", &self.game_id)
            .field("encryption_key", &REDACTED)
            .finish()
    }
}

impl fmt::Display for EndpointSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (platform {}, game {})",
            self.base_url, self.platform_id, self.game_id
        )
    }
}

/// One user edit of one field, as produced by a text input.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub field: EndpointField,
    pub value: String,
}

impl FieldEdit {
    pub fn new(field: EndpointField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

impl fmt::Debug for FieldEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value: &str = if self.field.is_secret() {
            REDACTED
        } else {
            &self.value
        };
        f.debug_struct("FieldEdit")
            .field("field", &self.field)
            .field("value", &value)
            .finish()
    }
}

/// Fixed-width mask for showing that a secret is present without revealing its length.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
