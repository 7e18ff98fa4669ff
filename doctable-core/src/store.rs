//! Main document store interface.
//!
//! [`DocumentStore`] owns a backend and hands out collection views over it.
//! It is generic over the backend, so the same code runs against SQLite or the
//! in-memory store, and `DocumentStore<Box<dyn StoreBackend>>` covers runtime
//! backend selection.
//!
//! # Example
//!
//! ```ignore
//! use doctable::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! let issues = store.collection("issues");
//! let rules = store.typed_collection::<Rule>();
//! ```

use crate::{
    backend::StoreBackend,
    collection::{Collection, TypedCollection},
    document::Record,
    error::DocumentStoreResult,
    registry::TableRegistry,
};

/// A document store bound to a backend implementation.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the store and returns its backend without closing it.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// The collections this store accepts.
    pub fn registry(&self) -> &TableRegistry {
        self.backend.registry()
    }

    /// Gets an untyped view of the collection with the given name.
    ///
    /// The name is checked against the registry when the view is used, not here.
    pub fn collection(&self, name: &str) -> Collection<'_, B> {
        Collection::new(name.to_string(), &self.backend)
    }

    /// Gets a typed view of the collection named by `R::collection_name()`.
    pub fn typed_collection<R: Record>(&self) -> TypedCollection<'_, B, R> {
        TypedCollection::new(R::collection_name().to_string(), &self.backend)
    }

    /// Releases the backend's resources. Safe to call more than once.
    pub fn close(&self) -> DocumentStoreResult<()> {
        self.backend.close()
    }

    /// Runs `f` against the store and closes it afterwards, whatever `f` returned.
    ///
    /// If `f` fails, its error is returned even when closing fails as well.
    ///
    /// ```ignore
    /// let issues = doctable::open("tracker.db")?.scope(|store| store.collection("issues").all())?;
    /// ```
    pub fn scope<T>(
        self,
        f: impl FnOnce(&Self) -> DocumentStoreResult<T>,
    ) -> DocumentStoreResult<T> {
        let result = f(&self);
        let closed = self.close();

        let value = result?;
        closed?;

        Ok(value)
    }
}
