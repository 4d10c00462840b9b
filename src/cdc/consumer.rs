//! Single-threaded consumption of a change-event stream

use crate::cdc::error::{ConsumeError, ProjectError};
use crate::cdc::projector::Projector;
use crate::cdc::transport::Transport;
use crate::cdc::ChangeEvent;
use crate::index::IndexStore;
use tracing::{info, instrument, warn};

/// Counters from a completed consumer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    /// Events successfully projected and acknowledged
    pub processed: u64,

    /// Malformed events surfaced, skipped, and acknowledged
    pub skipped: u64,
}

/// Pulls messages from a transport and projects them one at a time.
///
/// Acknowledgment is strictly sequenced after confirmed projection: a message
/// is acked once the index store has accepted its effect, or once it has been
/// classified as malformed and deliberately skipped. A store failure leaves
/// the message unacked and aborts the run, so a later run redelivers and
/// retries it, which idempotent projection makes safe.
pub struct Consumer<T, S> {
    transport: T,
    projector: Projector<S>,
}

impl<T: Transport, S: IndexStore> Consumer<T, S> {
    /// Create a consumer over the given transport and projector
    pub fn new(transport: T, projector: Projector<S>) -> Self {
        Self {
            transport,
            projector,
        }
    }

    /// Borrow the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the underlying projector
    pub fn projector(&self) -> &Projector<S> {
        &self.projector
    }

    /// Run until the transport stream ends or a store failure aborts it
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<ConsumerReport, ConsumeError> {
        let mut report = ConsumerReport::default();

        while let Some(message) = self.transport.next().await? {
            match ChangeEvent::from_slice(&message.body) {
                Ok(event) => match self.projector.project(&event).await {
                    Ok(_) => {
                        self.transport.ack(message.offset).await?;
                        report.processed += 1;
                    }
                    Err(ProjectError::Malformed(e)) => {
                        warn!(offset = message.offset, "skipping malformed event: {}", e);
                        self.transport.ack(message.offset).await?;
                        report.skipped += 1;
                    }
                    Err(source @ ProjectError::Store(_)) => {
                        // Left unacked on purpose: the transport will
                        // redeliver, and retrying the same event is safe.
                        return Err(ConsumeError::Project {
                            offset: message.offset,
                            source,
                        });
                    }
                },
                Err(e) => {
                    warn!(offset = message.offset, "skipping undecodable event: {}", e);
                    self.transport.ack(message.offset).await?;
                    report.skipped += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            "change stream ended"
        );
        Ok(report)
    }
}
