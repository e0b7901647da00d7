//! Model reply cleanup: fence stripping and JSON object parsing.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReplyError {
    #[error("Model reply is empty")]
    Empty,

    #[error("Model reply is not valid JSON: {0}")]
    Json(String),

    #[error("Model reply is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Remove markdown code-fence markers the model adds despite instructions.
///
/// Every "```json" and "```" occurrence is dropped, then the result is trimmed.
pub fn strip_code_fences(reply: &str) -> String {
    reply
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse the model's raw reply into a JSON object.
///
/// Keys are not checked against the identity schema: missing and extra
/// keys pass through unchanged.
pub fn parse_identity_reply(reply: &str) -> Result<Map<String, Value>, ReplyError> {
    let cleaned = strip_code_fences(reply);
    if cleaned.is_empty() {
        return Err(ReplyError::Empty);
    }

    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| ReplyError::Json(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(ReplyError::NotAnObject("array")),
        Value::String(_) => Err(ReplyError::NotAnObject("string")),
        Value::Number(_) => Err(ReplyError::NotAnObject("number")),
        Value::Bool(_) => Err(ReplyError::NotAnObject("boolean")),
        Value::Null => Err(ReplyError::NotAnObject("null")),
    }
}
