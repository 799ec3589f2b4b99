//! Response envelopes and result shapes

use super::error::{Result, YaviqError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Deref;
use tracing::debug;

/// Result mapping returned by the optimizer endpoints.
///
/// The shape is owned by the service; this wrapper only adds typed readers for
/// the keys the SDK itself relies on. Dereferences to the raw JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineResponse(Value);

impl EngineResponse {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Optimized text (`optimized`)
    pub fn optimized_text(&self) -> Option<&str> {
        self.0.get("optimized").and_then(Value::as_str)
    }

    /// `tokensSaved`
    pub fn tokens_saved(&self) -> Option<i64> {
        self.0.get("tokensSaved").and_then(as_integer)
    }

    /// Compression percentage (`compression`)
    pub fn compression(&self) -> Option<f64> {
        self.0.get("compression").and_then(Value::as_f64)
    }

    /// Server-side token count of the input (`originalTokens`)
    pub fn original_tokens(&self) -> Option<u64> {
        self.0.get("originalTokens").and_then(as_count)
    }

    /// Server-side token count of the output (`optimizedTokens`)
    pub fn optimized_tokens(&self) -> Option<u64> {
        self.0.get("optimizedTokens").and_then(as_count)
    }

    /// Model reply from an optimize-and-run call (`final_answer`)
    pub fn final_answer(&self) -> Option<&str> {
        self.0.get("final_answer").and_then(Value::as_str)
    }

    pub fn metrics(&self) -> Option<&Value> {
        self.0.get("metrics")
    }
}

impl From<Value> for EngineResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<EngineResponse> for Value {
    fn from(response: EngineResponse) -> Self {
        response.0
    }
}

impl Deref for EngineResponse {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

/// TOON output together with the format the service detected or used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertResult {
    pub toon: String,
    /// Passed through as sent; usually a string such as `"json"`, but the
    /// field is required to be present, not to be a string
    pub format: Value,
}

impl ConvertResult {
    /// The reported format when the service sent it as a string
    pub fn format_name(&self) -> Option<&str> {
        self.format.as_str()
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}

fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
}

/// Unwrap a 2xx response body.
///
/// `{success: true, data}` yields `data`, `{success: false, ..}` becomes an
/// engine failure, and any other shape is returned as-is.
pub(crate) fn unwrap_envelope(value: Value) -> Result<Value> {
    match value.get("success").and_then(Value::as_bool) {
        Some(true) if value.get("data").is_some() => match value {
            Value::Object(mut map) => Ok(map.remove("data").unwrap_or(Value::Null)),
            other => Ok(other),
        },
        Some(false) => {
            let message = match value.get("error") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => "Unknown error".to_string(),
                Some(other) => other.to_string(),
            };
            let status = value
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .unwrap_or(500);
            Err(YaviqError::engine_failure(message, status))
        }
        _ => {
            // TODO: reject unknown shapes once every endpoint uses the envelope
            debug!("response matched no envelope, passing it through unchanged");
            Ok(value)
        }
    }
}

/// Build the classified error for a non-2xx response
pub(crate) fn error_from_status(status: u16, body: &str) -> YaviqError {
    let message = error_message(status, body);

    if (400..500).contains(&status) {
        YaviqError::Validation {
            message: format!("Request failed ({}): {}", status, message),
            status_code: status,
        }
    } else if status >= 500 {
        YaviqError::engine_failure(format!("Server error ({}): {}", status, message), status)
    } else {
        YaviqError::network(format!("Request failed ({}): {}", status, message), Some(status))
    }
}

/// Pick the most useful description out of an error body
fn error_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        return ["error", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(non_empty_text))
            .unwrap_or_else(|| body.to_string());
    }

    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        other => Some(other.to_string()),
    }
}
