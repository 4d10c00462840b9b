//! Database schema for the index module
//!
//! Two-table design: `posts` holds normalized blog posts written by the
//! crawler, keyed by URL; `documents` is the searchable index that change
//! events are projected into, keyed by document id.

use crate::index::error::DbError;
use libsql::{Connection, params};

/// Initialize the database schema
pub async fn initialize_schema(conn: &Connection) -> Result<(), DbError> {
    // Create posts table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            created TEXT,
            updated TEXT,
            body TEXT NOT NULL,
            fetched_at INTEGER NOT NULL
        )",
        params![],
    )
    .await
    .map_err(|e| DbError::Schema(format!("Failed to create posts table: {}", e)))?;

    // Create documents table for the projected search index
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            doc_id TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        params![],
    )
    .await
    .map_err(|e| DbError::Schema(format!("Failed to create documents table: {}", e)))?;

    // Create index on title for faster lookups
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_posts_title ON posts(title)",
        params![],
    )
    .await
    .map_err(|e| DbError::Schema(format!("Failed to create index on posts: {}", e)))?;

    Ok(())
}
