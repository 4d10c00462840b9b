//! Error types for the cdc module

use crate::cdc::Operation;
use crate::error::Error as CrateError;
use crate::index::IndexError;
use thiserror::Error;

/// Why a change event could not be decoded or validated.
///
/// Malformed events are non-retryable: redelivering the same bytes will fail
/// the same way, so the caller should surface the error and skip the message
/// rather than halt the stream.
#[derive(Debug, Error)]
pub enum MalformedEvent {
    /// Operation code outside the known `c`/`r`/`u`/`d` set
    #[error("unrecognized operation code: {0:?}")]
    UnknownOperation(String),

    /// The envelope was not valid JSON or did not match the expected shape
    #[error("invalid event envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    /// No document id could be derived for the event
    #[error("missing document id for {op} event")]
    MissingDocumentId {
        /// Operation the event carried
        op: Operation,
    },

    /// A non-delete event arrived without a post-image
    #[error("missing post-image payload for {op} event")]
    MissingPayload {
        /// Operation the event carried
        op: Operation,
    },

    /// The document id was present but empty
    #[error("document id must not be empty")]
    EmptyDocumentId,
}

/// Error type for projection of a single change event
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The event failed validation; skip it, retrying cannot succeed
    #[error("malformed event: {0}")]
    Malformed(#[from] MalformedEvent),

    /// The index store failed the operation; retrying the same event is safe
    #[error("index store unavailable: {0}")]
    Store(#[from] IndexError),
}

/// Error type for the upstream message transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error reading from or acknowledging to the transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Error type for a consumer run
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// The transport failed to deliver or acknowledge a message
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Projection failed on a store error; the message was left unacked
    #[error("projection failed at offset {offset}: {source}")]
    Project {
        /// Offset of the message that failed
        offset: u64,
        /// The underlying projection error
        source: ProjectError,
    },
}

impl From<ProjectError> for CrateError {
    fn from(err: ProjectError) -> Self {
        CrateError::Projection(err.to_string())
    }
}

impl From<ConsumeError> for CrateError {
    fn from(err: ConsumeError) -> Self {
        match err {
            ConsumeError::Transport(e) => CrateError::Transport(e.to_string()),
            ConsumeError::Project { .. } => CrateError::Projection(err.to_string()),
        }
    }
}
