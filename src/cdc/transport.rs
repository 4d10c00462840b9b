//! Message transports for the change-event consumer

use crate::cdc::error::TransportError;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

/// A raw message delivered by a transport, prior to envelope decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Position of the message within the stream
    pub offset: u64,

    /// Undecoded message body
    pub body: Vec<u8>,
}

/// A pull-based source of change-event messages.
///
/// The transport owns delivery order and offset tracking. Acknowledgment is
/// explicit and must be called by the consumer only after the message's
/// effect has been confirmed downstream; an unacked message is eligible for
/// redelivery on the next run.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Pull the next message, or `None` when the stream has ended
    async fn next(&mut self) -> Result<Option<Message>, TransportError>;

    /// Mark `offset` (and everything before it) as durably processed
    async fn ack(&mut self, offset: u64) -> Result<(), TransportError>;
}

/// Transport reading newline-delimited JSON envelopes from a file.
///
/// Each non-empty line is one message; offsets are zero-based line positions.
/// Stands in for a broker subscription in local runs and replay scenarios.
pub struct JsonLinesTransport {
    lines: Lines<BufReader<File>>,
    next_offset: u64,
    acked: Option<u64>,
}

impl JsonLinesTransport {
    /// Open a newline-delimited JSON file as a transport
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let file = File::open(path.as_ref()).await?;
        debug!("Opened change-event file {}", path.as_ref().display());

        Ok(Self {
            lines: BufReader::new(file).lines(),
            next_offset: 0,
            acked: None,
        })
    }

    /// Highest acknowledged offset, if any message has been acked
    pub fn acked(&self) -> Option<u64> {
        self.acked
    }
}

impl Transport for JsonLinesTransport {
    async fn next(&mut self) -> Result<Option<Message>, TransportError> {
        while let Some(line) = self.lines.next_line().await? {
            let offset = self.next_offset;
            self.next_offset += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Ok(Some(Message {
                offset,
                body: line.into_bytes(),
            }));
        }

        Ok(None)
    }

    async fn ack(&mut self, offset: u64) -> Result<(), TransportError> {
        self.acked = Some(self.acked.map_or(offset, |prev| prev.max(offset)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_reads_one_message_per_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"payload": {{"op": "c"}}}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"payload": {{"op": "d"}}}}"#).unwrap();

        let mut transport = JsonLinesTransport::open(file.path()).await.unwrap();

        let first = transport.next().await.unwrap().unwrap();
        assert_eq!(first.offset, 0);

        // the blank line is skipped but still advances the offset
        let second = transport.next().await.unwrap().unwrap();
        assert_eq!(second.offset, 2);

        assert!(transport.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ack_tracks_high_water_mark() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a").unwrap();

        let mut transport = JsonLinesTransport::open(file.path()).await.unwrap();
        assert_eq!(transport.acked(), None);

        transport.ack(3).await.unwrap();
        transport.ack(1).await.unwrap();
        assert_eq!(transport.acked(), Some(3));
    }
}
