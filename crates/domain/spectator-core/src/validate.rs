use serde::{Deserialize, Serialize};

use crate::endpoint::{EndpointField, EndpointSubmission};

/// How strictly a snapshot is checked before it is dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Forward every snapshot unchanged and let the recorder decide.
    #[default]
    Lenient,
    /// Trim, check and normalize locally; refuse bad input before dispatch.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    pub field: EndpointField,
    pub reason: String,
}

impl FieldError {
    fn new(field: EndpointField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check a snapshot field by field and return its normalized form.
///
/// Fields are checked in form order and the first failure is returned.
pub fn validate_submission(
    submission: &EndpointSubmission,
) -> Result<EndpointSubmission, FieldError> {
    Ok(EndpointSubmission {
        base_url: check_field(EndpointField::BaseUrl, &submission.base_url)?,
        platform_id: check_field(EndpointField::PlatformId, &submission.platform_id)?,
        game_id: check_field(EndpointField::GameId, &submission.game_id)?,
        encryption_key: check_field(EndpointField::EncryptionKey, &submission.encryption_key)?,
    })
}

/// Check one field value and return it normalized.
pub fn check_field(field: EndpointField, raw: &str) -> Result<String, FieldError> {
    match field {
        EndpointField::BaseUrl => normalize_base_url(raw.trim()),
        EndpointField::PlatformId | EndpointField::GameId => path_segment(field, raw),
        EndpointField::EncryptionKey => {
            let key = raw.trim();
            if key.is_empty() {
                return Err(required(field));
            }
            Ok(key.to_string())
        }
    }
}

fn required(field: EndpointField) -> FieldError {
    FieldError::new(field, format!("{field} is required"))
}

fn normalize_base_url(raw: &str) -> Result<String, FieldError> {
    let field = EndpointField::BaseUrl;
    if raw.is_empty() {
        return Err(required(field));
    }

    let parsed = url::Url::parse(raw)
        .map_err(|e| FieldError::new(field, format!("invalid url {raw}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FieldError::new(
            field,
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(FieldError::new(field, "url has no host"));
    }

    // Later requests are built as `{base_url}/...`, so a trailing slash would double up.
    Ok(raw.trim_end_matches('/').to_string())
}

fn path_segment(field: EndpointField, raw: &str) -> Result<String, FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(required(field));
    }
    if value.contains('/') {
        return Err(FieldError::new(field, format!("{field} must not contain '/'")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(FieldError::new(
            field,
            format!("{field} must not contain whitespace"),
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(base_url: &str, platform_id: &str, game_id: &str, key: &str) -> EndpointSubmission {
        EndpointSubmission {
            base_url: base_url.into(),
            platform_id: platform_id.into(),
            game_id: game_id.into(),
            encryption_key: key.into(),
        }
    }

    #[test]
    fn valid_submission_is_trimmed_and_normalized() {
        let out = validate_submission(&submission(
            " https://api.example.com/// ",
            " steam ",
            "12345",
            " k3y ",
        ))
        .unwrap();

        assert_eq!(out.base_url, "https://api.example.com");
        assert_eq!(out.platform_id, "steam");
        assert_eq!(out.game_id, "12345");
        assert_eq!(out.encryption_key, "k3y");
    }

    #[test]
    fn first_failing_field_wins() {
        let err = validate_submission(&submission("", "", "", "")).unwrap_err();
        assert_eq!(err.field, EndpointField::BaseUrl);
        assert_eq!(err.reason, "baseUrl is required");

        let err = validate_submission(&submission("http://h", "   ", "", "")).unwrap_err();
        assert_eq!(err.field, EndpointField::PlatformId);
    }

    #[test]
    fn base_url_must_be_http_with_host() {
        for bad in ["not a url", "ftp://files.example.com", "file:///tmp/x"] {
            let err = validate_submission(&submission(bad, "p", "g", "k")).unwrap_err();
            assert_eq!(err.field, EndpointField::BaseUrl, "input {bad}");
        }
    }

    #[test]
    fn identifiers_cannot_carry_path_separators() {
        let err = validate_submission(&submission("http://h", "KR", "12/34", "k")).unwrap_err();
        assert_eq!(err.field, EndpointField::GameId);

        let err = validate_submission(&submission("http://h", "K R", "1234", "k")).unwrap_err();
        assert_eq!(err.field, EndpointField::PlatformId);
    }

    #[test]
    fn single_field_check_matches_full_validation() {
        assert_eq!(
            check_field(EndpointField::BaseUrl, "http://h/").unwrap(),
            "http://h"
        );
        assert_eq!(
            check_field(EndpointField::GameId, "").unwrap_err().reason,
            "gameId is required"
        );
    }

    #[test]
    fn key_is_required() {
        let err = validate_submission(&submission("http://h", "KR", "1", " ")).unwrap_err();
        assert_eq!(err.field, EndpointField::EncryptionKey);
    }
}
