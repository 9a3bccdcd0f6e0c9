//! Storage error types.
//!
//! Used by repository implementations and callers of storage APIs.

use bcast_core::BcastError;
use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<StorageError> for BcastError {
    fn from(e: StorageError) -> Self {
        BcastError::Storage(e.to_string())
    }
}
