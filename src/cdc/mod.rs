//! Change-data-capture module
//!
//! This module is the heart of the indexing pipeline: it decodes row-level
//! change events emitted by the source database and projects them onto a
//! searchable index, one event at a time.
//!
//! Delivery is assumed to be at-least-once and in source-commit order per
//! document. Projection is idempotent, so a duplicated or retried event
//! leaves the index in the same state as a single application. Nothing here
//! buffers or reorders; convergence comes from upserts being replace-or-insert
//! and removes tolerating absent keys.

mod consumer;
mod envelope;
pub mod error;
mod projector;
mod transport;

pub use consumer::{Consumer, ConsumerReport};
pub use error::{ConsumeError, MalformedEvent, ProjectError, TransportError};
pub use projector::{Projection, Projector};
pub use transport::{JsonLinesTransport, Message, Transport};

use serde_json::Value;
use std::fmt;

/// Row-level operation carried by a change event.
///
/// Decoded from the single-letter codes used by the replication topic. The
/// set is closed: anything outside it is rejected as malformed when the
/// envelope is decoded, never silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Row inserted
    Create,
    /// Row read during an initial snapshot
    Read,
    /// Row updated
    Update,
    /// Row deleted
    Delete,
}

impl Operation {
    /// Decode a single-letter operation code
    pub fn from_code(code: &str) -> Result<Self, MalformedEvent> {
        match code {
            "c" => Ok(Operation::Create),
            "r" => Ok(Operation::Read),
            "u" => Ok(Operation::Update),
            "d" => Ok(Operation::Delete),
            other => Err(MalformedEvent::UnknownOperation(other.to_string())),
        }
    }

    /// Whether this operation carries a post-image and maps to an upsert.
    ///
    /// Create, read, and update are treated identically downstream.
    pub fn is_upsert(&self) -> bool {
        !matches!(self, Operation::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A decoded change event, the unit of work for the projector
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// The row-level operation
    pub operation: Operation,

    /// Stable identifier of the affected document, derived from the source
    /// record's primary key
    pub document_id: String,

    /// Post-image of the record; `None` for deletes
    pub payload: Option<Value>,
}

impl ChangeEvent {
    /// Construct an event directly from its parts
    pub fn new(operation: Operation, document_id: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            operation,
            document_id: document_id.into(),
            payload,
        }
    }

    /// Decode an event from a raw JSON envelope
    pub fn from_json(raw: &str) -> Result<Self, MalformedEvent> {
        envelope::decode(raw.as_bytes())
    }

    /// Decode an event from raw envelope bytes
    pub fn from_slice(raw: &[u8]) -> Result<Self, MalformedEvent> {
        envelope::decode(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_codes() {
        assert_eq!(Operation::from_code("c").unwrap(), Operation::Create);
        assert_eq!(Operation::from_code("r").unwrap(), Operation::Read);
        assert_eq!(Operation::from_code("u").unwrap(), Operation::Update);
        assert_eq!(Operation::from_code("d").unwrap(), Operation::Delete);
    }

    #[test]
    fn test_unknown_operation_code_is_malformed() {
        let err = Operation::from_code("x").unwrap_err();
        assert!(matches!(err, MalformedEvent::UnknownOperation(code) if code == "x"));
    }

    #[test]
    fn test_upsert_classification() {
        assert!(Operation::Create.is_upsert());
        assert!(Operation::Read.is_upsert());
        assert!(Operation::Update.is_upsert());
        assert!(!Operation::Delete.is_upsert());
    }
}
