//! Decoding of the replication topic's change-event envelope
//!
//! Messages arrive as a Debezium-style envelope: the interesting fields sit
//! under `payload`, with the operation code in `op` and the row images in
//! `before` and `after`. On deletes the post-image is null, so the document
//! id has to come from the before-image instead.

use crate::cdc::error::MalformedEvent;
use crate::cdc::{ChangeEvent, Operation};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Envelope {
    payload: EventBody,
}

#[derive(Debug, Deserialize)]
struct EventBody {
    op: String,

    #[serde(default)]
    before: Option<Value>,

    #[serde(default)]
    after: Option<Value>,
}

/// Decode raw envelope bytes into a [`ChangeEvent`]
pub(crate) fn decode(raw: &[u8]) -> Result<ChangeEvent, MalformedEvent> {
    let envelope: Envelope = serde_json::from_slice(raw)?;
    let body = envelope.payload;
    let operation = Operation::from_code(&body.op)?;

    if operation.is_upsert() {
        let after = body
            .after
            .ok_or(MalformedEvent::MissingPayload { op: operation })?;
        let document_id = extract_id(&after)
            .ok_or(MalformedEvent::MissingDocumentId { op: operation })?;

        Ok(ChangeEvent {
            operation,
            document_id,
            payload: Some(after),
        })
    } else {
        // Delete: the post-image is null, derive the id from the before-image
        // without ever touching `after`.
        let document_id = body
            .before
            .as_ref()
            .and_then(extract_id)
            .ok_or(MalformedEvent::MissingDocumentId { op: operation })?;

        Ok(ChangeEvent {
            operation,
            document_id,
            payload: None,
        })
    }
}

/// Pull the primary key out of a row image.
///
/// The source keys documents by `_id`, which may arrive as a plain string, an
/// integer, or a Mongo extended-JSON `{"$oid": "..."}` object.
fn extract_id(image: &Value) -> Option<String> {
    match image.get("_id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
