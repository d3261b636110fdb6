//! Decoding of the in-body error envelope.
//!
//! The remote API reports failures as `{"error": {"code", "status", "message"}}`
//! inside the response body. Its presence decides failure; the HTTP status
//! does not.

use serde::Deserialize;
use sheetsync_core::{SheetsError, SheetsResult};
use tracing::warn;

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorBody {
    code: i64,
    status: String,
    message: String,
}

/// Check a raw response body for an error envelope.
///
/// Returns `RemoteApi` when an `error` object is present and `Decode` when the
/// body is not a JSON object. An empty body counts as success.
pub fn check_error(body: &[u8]) -> SheetsResult<()> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }

    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(SheetsError::Decode(
            "response body is not a JSON object".into(),
        ));
    }
    let envelope: Envelope = serde_json::from_value(value)?;
    match envelope.error {
        Some(err) => {
            warn!(
                code = err.code,
                status = %err.status,
                "remote API returned an error envelope"
            );
            Err(SheetsError::remote(err.code, err.status, err.message))
        }
        None => Ok(()),
    }
}

/// Check the envelope and deserialize the body on success.
pub fn decode<T>(body: &[u8]) -> SheetsResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    check_error(body)?;
    Ok(serde_json::from_slice(body)?)
}
