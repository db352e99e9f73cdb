use crate::error::{BackendError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Marker whose presence anywhere in a payload means the backend failed.
pub const ERROR_MARKER: &str = "Error";

/// Request/response channel to a code-analysis backend.
///
/// Implementations only move bytes; payload interpretation (error marker, typed
/// decoding, timeouts) lives in [`crate::BackendClient`] so every transport obeys the
/// same rules.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Invoke a named operation and return its decoded payload.
    async fn call(&self, operation: &str, arguments: Value) -> Result<Value>;

    /// Names of the operations the backend advertises.
    async fn list_tools(&self) -> Result<Vec<String>>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<()> {
        self.list_tools().await.map(|_| ())
    }

    /// Short label for logs and reports.
    fn describe(&self) -> String;
}

/// Decode the text content of a tool result.
///
/// A set error flag wins; otherwise the text must be JSON. Non-JSON text that carries
/// the error marker is an error payload, anything else is malformed.
pub fn decode_tool_text(text: &str, is_error: bool) -> Result<Value> {
    if is_error {
        return Err(BackendError::ErrorPayload(text.to_string()));
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) if text.contains(ERROR_MARKER) => Err(BackendError::ErrorPayload(text.to_string())),
        Err(err) => Err(BackendError::malformed(format!(
            "tool output is not JSON ({err}): {}",
            truncate(text, 200)
        ))),
    }
}

/// True when the serialized payload contains the error marker.
pub fn contains_error_marker(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains(ERROR_MARKER),
        Value::Array(items) => items.iter().any(contains_error_marker),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key.contains(ERROR_MARKER) || contains_error_marker(value)),
        _ => false,
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_flag_wins_over_json_body() {
        let err = decode_tool_text("{\"symbols\": []}", true).unwrap_err();
        assert!(matches!(err, BackendError::ErrorPayload(_)));
    }

    #[test]
    fn plain_error_text_is_an_error_payload() {
        let err = decode_tool_text("Error: file not found", false).unwrap_err();
        assert!(matches!(err, BackendError::ErrorPayload(_)));
    }

    #[test]
    fn plain_text_without_marker_is_malformed() {
        let err = decode_tool_text("ok", false).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn marker_is_found_in_nested_payloads() {
        assert!(contains_error_marker(&json!({"files": [{"skeleton": "Error: budget"}]})));
        assert!(contains_error_marker(&json!({"Error": null})));
        assert!(!contains_error_marker(&json!({"symbols": [{"name": "Config"}]})));
    }
}
