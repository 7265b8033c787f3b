//! Newline-delimited JSON framing for protocol messages.
//!
//! A frame is one JSON object followed by a single `\n`. Decoding is purely
//! syntactic: it classifies the object as request, notification or response
//! and never looks inside `params`.

use serde_json::{Map, Value};

use crate::error::McpError;
use crate::types::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, Message};

/// Why a line could not be turned into a [`Message`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("message has none of 'method', 'result' or 'error'")]
    MissingKind,

    #[error("message has more than one of 'method', 'result' and 'error'")]
    AmbiguousKind,

    #[error("response is missing its 'id'")]
    MissingId,

    #[error("invalid {kind}: {source}")]
    Shape {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialize `message` into one frame, newline included.
pub fn encode(message: &Message) -> Result<String, McpError> {
    let mut frame = serde_json::to_string(message)?;
    frame.push('\n');
    Ok(frame)
}

/// Parse one line (with or without its trailing newline) into a [`Message`].
pub fn decode(line: &str) -> Result<Message, DecodeError> {
    let value: Value = serde_json::from_str(line.trim()).map_err(DecodeError::Json)?;
    let object = match value {
        Value::Object(map) => map,
        _ => return Err(DecodeError::NotAnObject),
    };

    let has_id = object.get("id").is_some_and(|id| !id.is_null());
    let kinds: Vec<&str> = ["method", "result", "error"]
        .into_iter()
        .filter(|key| object.contains_key(*key))
        .collect();

    match kinds.as_slice() {
        [] => Err(DecodeError::MissingKind),
        ["method"] if has_id => shape::<JsonRpcRequest>(object, "request").map(Message::Request),
        ["method"] => {
            shape::<JsonRpcNotification>(object, "notification").map(Message::Notification)
        }
        [_] if has_id => shape::<JsonRpcResponse>(object, "response").map(Message::Response),
        [_] => Err(DecodeError::MissingId),
        _ => Err(DecodeError::AmbiguousKind),
    }
}

fn shape<T: serde::de::DeserializeOwned>(
    object: Map<String, Value>,
    kind: &'static str,
) -> Result<T, DecodeError> {
    serde_json::from_value(Value::Object(object)).map_err(|source| DecodeError::Shape { kind, source })
}
