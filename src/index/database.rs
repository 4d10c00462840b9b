//! Database operations for the index module

use crate::crawler::BlogPost;
use crate::index::schema;
use crate::index::{IndexError, IndexStore, error::DbError};
use libsql::{Connection, params};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};

/// Database manager backed by LibSQL
///
/// Holds both the crawler's document store (`posts`) and the projected
/// search index (`documents`). Clones share the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database manager
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection) -> Result<Self, DbError> {
        // Initialize schema
        schema::initialize_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Create a new database manager from a path
    pub async fn new_from_path(path: &str) -> Result<Self, DbError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DbError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| DbError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn).await
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    /// Insert or replace a crawled post, keyed by URL
    pub async fn upsert_post(&self, post: &BlogPost) -> Result<(), DbError> {
        let body = serde_json::to_string(post)
            .map_err(|e| DbError::Data(format!("Failed to serialize post: {}", e)))?;

        self.conn
            .execute(
                "INSERT INTO posts (url, title, created, updated, body, fetched_at)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(url) DO UPDATE SET
                 title = excluded.title,
                 created = excluded.created,
                 updated = excluded.updated,
                 body = excluded.body,
                 fetched_at = excluded.fetched_at",
                params![
                    post.url.clone(),
                    post.title.clone(),
                    post.created.map(|d| d.to_rfc3339()),
                    post.updated.map(|d| d.to_rfc3339()),
                    body,
                    Self::now(),
                ],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to upsert post: {}", e)))?;

        debug!("Stored post {}", post.url);
        Ok(())
    }

    /// Get a stored post by URL
    pub async fn get_post_by_url(&self, url: &str) -> Result<Option<BlogPost>, DbError> {
        let mut rows = self
            .conn
            .query("SELECT body FROM posts WHERE url = ?", params![url])
            .await
            .map_err(|e| DbError::Query(format!("Failed to get post: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let body: String = row
                    .get(0)
                    .map_err(|e| DbError::Data(format!("Failed to get post body: {}", e)))?;
                let post = serde_json::from_str(&body)
                    .map_err(|e| DbError::Data(format!("Failed to deserialize post: {}", e)))?;
                Ok(Some(post))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DbError::Data(format!("Failed to get post: {}", e))),
        }
    }

    /// Count stored posts
    #[instrument(skip(self))]
    pub async fn count_posts(&self) -> Result<i64, DbError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM posts", params![])
            .await
            .map_err(|e| DbError::Query(format!("Failed to count posts: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get(0)
                .map_err(|e| DbError::Data(format!("Failed to get count: {}", e))),
            Ok(None) => Err(DbError::Data("No count returned".to_string())),
            Err(e) => Err(DbError::Data(format!("Failed to get count: {}", e))),
        }
    }

    /// Insert or replace an indexed document
    pub async fn upsert_document(&self, id: &str, document: &Value) -> Result<(), DbError> {
        let body = serde_json::to_string(document)
            .map_err(|e| DbError::Data(format!("Failed to serialize document: {}", e)))?;

        self.conn
            .execute(
                "INSERT INTO documents (doc_id, body, updated_at)
                 VALUES (?, ?, ?)
                 ON CONFLICT(doc_id) DO UPDATE SET
                 body = excluded.body,
                 updated_at = excluded.updated_at",
                params![id, body, Self::now()],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to upsert document: {}", e)))?;

        Ok(())
    }

    /// Remove an indexed document; removing an absent id is a no-op
    pub async fn remove_document(&self, id: &str) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM documents WHERE doc_id = ?", params![id])
            .await
            .map_err(|e| DbError::Query(format!("Failed to remove document: {}", e)))?;

        Ok(())
    }

    /// Get an indexed document by id
    pub async fn get_document(&self, id: &str) -> Result<Option<Value>, DbError> {
        let mut rows = self
            .conn
            .query("SELECT body FROM documents WHERE doc_id = ?", params![id])
            .await
            .map_err(|e| DbError::Query(format!("Failed to get document: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let body: String = row
                    .get(0)
                    .map_err(|e| DbError::Data(format!("Failed to get document body: {}", e)))?;
                let document = serde_json::from_str(&body)
                    .map_err(|e| DbError::Data(format!("Failed to deserialize document: {}", e)))?;
                Ok(Some(document))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DbError::Data(format!("Failed to get document: {}", e))),
        }
    }
}

impl IndexStore for Database {
    async fn upsert(&self, id: &str, document: &Value) -> Result<(), IndexError> {
        self.upsert_document(id, document).await.map_err(Into::into)
    }

    async fn remove(&self, id: &str) -> Result<(), IndexError> {
        self.remove_document(id).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn test_database() -> Database {
        Database::new_from_path(":memory:").await.unwrap()
    }

    fn sample_post(url: &str, title: &str) -> BlogPost {
        BlogPost {
            url: url.to_string(),
            title: title.to_string(),
            created: chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00+00:00").ok(),
            updated: chrono::DateTime::parse_from_rfc3339("2024-01-02T00:00:00+00:00").ok(),
            categories: vec!["health".to_string()],
            tags: vec!["diet".to_string()],
            paragraphs: vec!["First paragraph.".to_string()],
            key_takeaways: vec!["Takeaway.".to_string()],
        }
    }

    #[tokio::test]
    async fn test_upsert_post_roundtrip() {
        let db = test_database().await;
        let post = sample_post("https://example.com/blog/a/", "A");
        db.upsert_post(&post).await.unwrap();

        let loaded = db
            .get_post_by_url("https://example.com/blog/a/")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.title, "A");
        assert_eq!(loaded.paragraphs, vec!["First paragraph.".to_string()]);
    }

    #[tokio::test]
    async fn test_upsert_post_replaces_by_url() {
        let db = test_database().await;
        let url = "https://example.com/blog/a/";
        db.upsert_post(&sample_post(url, "A")).await.unwrap();
        db.upsert_post(&sample_post(url, "A, revised")).await.unwrap();

        assert_eq!(db.count_posts().await.unwrap(), 1);
        let loaded = db.get_post_by_url(url).await.unwrap().unwrap();
        assert_eq!(loaded.title, "A, revised");
    }

    #[tokio::test]
    async fn test_document_upsert_and_remove() {
        let db = test_database().await;
        db.upsert("42", &json!({"title": "A"})).await.unwrap();
        db.upsert("42", &json!({"title": "B"})).await.unwrap();

        let doc = db.get_document("42").await.unwrap().unwrap();
        assert_eq!(doc["title"], "B");

        db.remove("42").await.unwrap();
        assert!(db.get_document("42").await.unwrap().is_none());

        // removing again must not error
        db.remove("42").await.unwrap();
    }
}
