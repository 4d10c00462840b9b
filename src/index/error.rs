//! Error types for the index module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// LibSQL error
    #[error("LibSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// SQL query error
    #[error("SQL query error: {0}")]
    Query(String),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Data error
    #[error("Data error: {0}")]
    Data(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Error type for index-store operations, independent of the backend
#[derive(Debug, Error)]
pub enum IndexError {
    /// The backing store rejected or failed the operation
    #[error("index backend error: {0}")]
    Backend(String),

    /// Document serialization error
    #[error("document serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<DbError> for IndexError {
    fn from(err: DbError) -> Self {
        IndexError::Backend(err.to_string())
    }
}

impl From<DbError> for CrateError {
    fn from(err: DbError) -> Self {
        CrateError::Database(err.to_string())
    }
}

impl From<IndexError> for CrateError {
    fn from(err: IndexError) -> Self {
        CrateError::Database(err.to_string())
    }
}
