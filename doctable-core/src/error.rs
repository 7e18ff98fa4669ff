//! Error types and result types for document store operations.
//!
//! This module provides error handling for all document store operations.
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.
//!
//! Nothing in this workspace retries on error. Every failure is returned to the
//! caller as one of the variants below.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// The backing engine could not be opened, a required table could not be
    /// ensured, or the store has already been closed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// The caller addressed a collection that is not part of the table registry.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
    /// A query used a field path outside the `ident(.ident)*` grammar.
    #[error("Invalid field path: {0:?}")]
    InvalidFieldPath(String),
    /// A query compared a field against a value that is not a scalar literal.
    /// The first argument is the field path, the second describes the value.
    #[error("Invalid query value for {0}: {1}")]
    InvalidQueryValue(String, String),
    /// A stored row could not be decoded back into a document.
    ///
    /// Built from a [`DecodeError`](crate::codec::DecodeError) once the row is known.
    #[error("Corrupt document in collection {collection} (row {row}): {reason}")]
    CorruptDocument {
        /// Registry name of the collection the row was read from.
        collection: String,
        /// Storage-level row identifier.
        row: i64,
        /// Why decoding failed.
        reason: String,
    },
    /// The underlying engine failed while executing an operation (I/O error, disk full, ...).
    #[error("Storage I/O error: {0}")]
    StorageIo(String),
    /// A document cannot be stored: a record does not serialize to an object,
    /// or the document nests too deeply.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// Serialization/deserialization error when converting between records and documents.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
