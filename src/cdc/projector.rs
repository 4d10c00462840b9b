//! Projection of change events onto an index store

use crate::cdc::error::{MalformedEvent, ProjectError};
use crate::cdc::{ChangeEvent, Operation};
use crate::index::IndexStore;
use tracing::{debug, instrument};

/// Which index operation a projected event resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// The document was inserted or replaced
    Upserted,
    /// The document was removed (or was already absent)
    Removed,
}

/// Maps change events to index-store operations.
///
/// The store handle is injected at construction so the projector can run
/// against an in-memory fake in tests and a persistent backend in
/// production. The projector holds no state of its own; every event is
/// handled in isolation and results in exactly one store call.
pub struct Projector<S> {
    store: S,
}

impl<S: IndexStore> Projector<S> {
    /// Create a projector over the given index store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the projector, returning the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Apply one change event to the index.
    ///
    /// Create, read, and update all upsert the post-image under the event's
    /// document id; delete removes it. Both paths are idempotent, so the
    /// caller may safely retry after a [`ProjectError::Store`] failure.
    /// Validation failures surface as [`ProjectError::Malformed`] before any
    /// store call is made, leaving the index untouched.
    #[instrument(skip(self, event), fields(op = %event.operation, id = %event.document_id))]
    pub async fn project(&self, event: &ChangeEvent) -> Result<Projection, ProjectError> {
        if event.document_id.is_empty() {
            return Err(MalformedEvent::EmptyDocumentId.into());
        }

        match event.operation {
            Operation::Create | Operation::Read | Operation::Update => {
                let payload = event
                    .payload
                    .as_ref()
                    .ok_or(MalformedEvent::MissingPayload {
                        op: event.operation,
                    })?;
                self.store.upsert(&event.document_id, payload).await?;
                debug!("Upserted document");
                Ok(Projection::Upserted)
            }
            Operation::Delete => {
                self.store.remove(&event.document_id).await?;
                debug!("Removed document");
                Ok(Projection::Removed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexError, MemoryIndex};
    use serde_json::{Value, json};

    fn upsert_event(op: Operation, id: &str, payload: Value) -> ChangeEvent {
        ChangeEvent::new(op, id, Some(payload))
    }

    #[tokio::test]
    async fn test_upsert_operations_store_payload_exactly() {
        for op in [Operation::Create, Operation::Read, Operation::Update] {
            let projector = Projector::new(MemoryIndex::new());
            let payload = json!({"_id": "1", "title": "A"});
            let outcome = projector
                .project(&upsert_event(op, "1", payload.clone()))
                .await
                .unwrap();

            assert_eq!(outcome, Projection::Upserted);
            assert_eq!(projector.store().get("1"), Some(payload));
            assert_eq!(projector.store().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_delete_removes_regardless_of_prior_presence() {
        let projector = Projector::new(MemoryIndex::new());
        let delete = ChangeEvent::new(Operation::Delete, "1", None);

        // delete of an absent document is a no-op, not an error
        assert_eq!(projector.project(&delete).await.unwrap(), Projection::Removed);

        projector
            .project(&upsert_event(Operation::Create, "1", json!({"title": "A"})))
            .await
            .unwrap();
        projector.project(&delete).await.unwrap();

        assert_eq!(projector.store().get("1"), None);
    }

    #[tokio::test]
    async fn test_projection_is_idempotent() {
        let projector = Projector::new(MemoryIndex::new());
        let event = upsert_event(Operation::Update, "1", json!({"title": "A"}));

        projector.project(&event).await.unwrap();
        let after_once = projector.store().get("1");
        projector.project(&event).await.unwrap();

        assert_eq!(projector.store().get("1"), after_once);
        assert_eq!(projector.store().len(), 1);

        let delete = ChangeEvent::new(Operation::Delete, "1", None);
        projector.project(&delete).await.unwrap();
        projector.project(&delete).await.unwrap();
        assert!(projector.store().is_empty());
    }

    #[tokio::test]
    async fn test_update_then_delete_ends_absent() {
        let projector = Projector::new(MemoryIndex::new());

        projector
            .project(&upsert_event(Operation::Update, "1", json!({"title": "A"})))
            .await
            .unwrap();
        projector
            .project(&ChangeEvent::new(Operation::Delete, "1", None))
            .await
            .unwrap();

        assert_eq!(projector.store().get("1"), None);
    }

    #[tokio::test]
    async fn test_missing_payload_is_malformed_and_mutates_nothing() {
        let projector = Projector::new(MemoryIndex::new());
        let event = ChangeEvent::new(Operation::Update, "1", None);

        let err = projector.project(&event).await.unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Malformed(MalformedEvent::MissingPayload { op: Operation::Update })
        ));
        assert!(projector.store().is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_id_is_malformed() {
        let projector = Projector::new(MemoryIndex::new());
        let event = upsert_event(Operation::Create, "", json!({"title": "A"}));

        let err = projector.project(&event).await.unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Malformed(MalformedEvent::EmptyDocumentId)
        ));
        assert!(projector.store().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_operation_never_reaches_the_index() {
        let projector = Projector::new(MemoryIndex::new());
        let raw = r#"{"payload": {"op": "x", "after": {"_id": "1", "title": "A"}}}"#;

        let err = ChangeEvent::from_json(raw).unwrap_err();
        assert!(matches!(err, MalformedEvent::UnknownOperation(_)));
        assert!(projector.store().is_empty());
    }

    #[tokio::test]
    async fn test_create_update_delete_scenario() {
        let projector = Projector::new(MemoryIndex::new());

        let create = r#"{"payload": {"op": "c", "after": {"_id": "42", "title": "A"}}}"#;
        projector
            .project(&ChangeEvent::from_json(create).unwrap())
            .await
            .unwrap();
        assert_eq!(projector.store().get("42").unwrap()["title"], "A");

        let update = r#"{"payload": {"op": "u", "after": {"_id": "42", "title": "B"}}}"#;
        projector
            .project(&ChangeEvent::from_json(update).unwrap())
            .await
            .unwrap();
        assert_eq!(projector.store().get("42").unwrap()["title"], "B");

        let delete = r#"{"payload": {"op": "d", "before": {"_id": "42"}, "after": null}}"#;
        projector
            .project(&ChangeEvent::from_json(delete).unwrap())
            .await
            .unwrap();
        assert_eq!(projector.store().get("42"), None);
    }

    /// Store that always fails, for exercising the transient-error path
    struct DownIndex;

    impl IndexStore for DownIndex {
        async fn upsert(&self, _id: &str, _document: &Value) -> Result<(), IndexError> {
            Err(IndexError::Backend("index unavailable".to_string()))
        }

        async fn remove(&self, _id: &str) -> Result<(), IndexError> {
            Err(IndexError::Backend("index unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let projector = Projector::new(DownIndex);
        let event = upsert_event(Operation::Create, "1", json!({"title": "A"}));

        let err = projector.project(&event).await.unwrap_err();
        assert!(matches!(err, ProjectError::Store(_)));
    }
}
