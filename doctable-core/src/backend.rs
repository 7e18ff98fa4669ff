//! Storage backend abstraction for the document store.
//!
//! This module defines the capability trait that every storage implementation
//! provides, so that higher layers can run against SQLite in production and an
//! in-memory store in tests.
//!
//! # Overview
//!
//! [`StoreBackend`] covers the full storage surface: append documents, read a
//! whole collection, filter a collection with a [`Query`], and release the
//! underlying resources. Every call is blocking and synchronous, and a failure
//! is returned immediately; nothing is retried.
//!
//! # Examples
//!
//! ```ignore
//! use doctable::backend::StoreBackend;
//! use doctable::query::Query;
//! use serde_json::json;
//!
//! let backend = SqliteStore::open("tracker.db")?;
//!
//! let row = json!({ "issue_id": "1", "status": "open" });
//! backend.add_row("issues", row.as_object().unwrap())?;
//!
//! let open = backend.find("issues", &Query::new().eq("status", "open"))?;
//! backend.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt::Debug;

use crate::{
    codec::Document,
    error::DocumentStoreResult,
    query::Query,
    registry::TableRegistry,
};

/// Abstract interface for document storage backends.
///
/// # Collections
///
/// Every operation that names a collection resolves it through
/// [`registry`](StoreBackend::registry) first and fails with
/// [`DocumentStoreError::UnknownCollection`](crate::error::DocumentStoreError::UnknownCollection)
/// before any storage access if the name is not registered.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. How concurrent callers are serialized
/// is up to the implementation and should be documented by it.
///
/// # Lifecycle
///
/// A backend is usable from construction until [`close`](StoreBackend::close).
/// `close` may be called any number of times; calls after the first are no-ops.
/// Other operations on a closed backend fail with
/// [`DocumentStoreError::StorageUnavailable`](crate::error::DocumentStoreError::StorageUnavailable).
pub trait StoreBackend: Send + Sync + Debug {
    /// The collections this backend accepts.
    fn registry(&self) -> &TableRegistry;

    /// Appends one document to a collection.
    ///
    /// No uniqueness is enforced: adding the same document twice stores it twice.
    fn add_row(&self, collection: &str, document: &Document) -> DocumentStoreResult<()>;

    /// Appends several documents to a collection, in order.
    ///
    /// Implementations in this workspace are atomic: if any document fails,
    /// none of the batch is retained.
    fn add_all(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()>;

    /// Returns every document of a collection in insertion order.
    fn get_all(&self, collection: &str) -> DocumentStoreResult<Vec<Document>>;

    /// Returns every document of a collection that satisfies all constraints of `query`.
    ///
    /// An empty result is `Ok(vec![])`. An empty query matches every document.
    fn find(&self, collection: &str, query: &Query) -> DocumentStoreResult<Vec<Document>>;

    /// Releases the backend's resources. Idempotent.
    fn close(&self) -> DocumentStoreResult<()>;
}

impl<B> StoreBackend for &B
where
    B: StoreBackend + ?Sized,
{
    fn registry(&self) -> &TableRegistry {
        (**self).registry()
    }

    fn add_row(&self, collection: &str, document: &Document) -> DocumentStoreResult<()> {
        (**self).add_row(collection, document)
    }

    fn add_all(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()> {
        (**self).add_all(collection, documents)
    }

    fn get_all(&self, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        (**self).get_all(collection)
    }

    fn find(&self, collection: &str, query: &Query) -> DocumentStoreResult<Vec<Document>> {
        (**self).find(collection, query)
    }

    fn close(&self) -> DocumentStoreResult<()> {
        (**self).close()
    }
}

impl<B> StoreBackend for Box<B>
where
    B: StoreBackend + ?Sized,
{
    fn registry(&self) -> &TableRegistry {
        (**self).registry()
    }

    fn add_row(&self, collection: &str, document: &Document) -> DocumentStoreResult<()> {
        (**self).add_row(collection, document)
    }

    fn add_all(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()> {
        (**self).add_all(collection, documents)
    }

    fn get_all(&self, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        (**self).get_all(collection)
    }

    fn find(&self, collection: &str, query: &Query) -> DocumentStoreResult<Vec<Document>> {
        (**self).find(collection, query)
    }

    fn close(&self) -> DocumentStoreResult<()> {
        (**self).close()
    }
}

/// Factory trait for creating backend instances from their configuration.
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    fn build(self) -> DocumentStoreResult<Self::Backend>;
}
