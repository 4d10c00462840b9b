//! # postsync - Blog crawling and CDC indexing for Rust
//!
//! This crate implements two loosely coupled data pipelines around a blog:
//!
//! - A **crawler** that walks a paginated blog index, extracts per-post
//!   metadata and content, normalizes the text, and persists documents to a
//!   local document store.
//! - A **change projector** that consumes row-level change-data-capture (CDC)
//!   events for those documents and projects them into a searchable index,
//!   keeping the index convergent under at-least-once, possibly duplicated
//!   delivery.
//!
//! ## Features
//!
//! - Paginated blog crawling with content extraction and text cleanup
//! - Debezium-style change-event decoding into a closed operation enum
//! - Idempotent projection of change events onto an index store
//! - Pluggable index stores: in-memory for tests, LibSQL for persistence
//! - Explicit acknowledgment sequenced after confirmed projection
//! - Async API with Tokio
//! - Robust error handling and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use postsync::cdc::{ChangeEvent, Projector};
//! use postsync::index::MemoryIndex;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let projector = Projector::new(MemoryIndex::new());
//!
//!     let raw = r#"{"payload": {"op": "c", "after": {"_id": "42", "title": "A"}}}"#;
//!     let event = ChangeEvent::from_json(raw)?;
//!     projector.project(&event).await?;
//!
//!     Ok(())
//! }
//! ```

mod error;

pub mod cdc;
pub mod crawler;
pub mod index;

pub use error::Error;

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::cdc::{ChangeEvent, Operation, Projector};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::index::IndexStore;
}
