//! Collection views for document store operations.
//!
//! A collection view binds a collection name to a backend so callers don't
//! repeat it on every call. Views are cheap borrows; they hold no state of
//! their own.
//!
//! # Collection Types
//!
//! - [`Collection`] - Untyped view working with raw [`Document`]s
//! - [`TypedCollection`] - View that converts to and from a [`Record`] type
//!
//! Both work over any [`StoreBackend`], including `dyn StoreBackend`.
//!
//! # Example
//!
//! ```ignore
//! use doctable::document::Record;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Rule {
//!     pub source: String,
//!     pub destination: String,
//! }
//!
//! impl Record for Rule {
//!     fn collection_name() -> &'static str { "rules" }
//! }
//!
//! # fn example(store: &doctable::store::DocumentStore<impl doctable::backend::StoreBackend>) -> doctable::error::DocumentStoreResult<()> {
//! let rules = store.typed_collection::<Rule>();
//! rules.add(&Rule { source: "gitlab".into(), destination: "jira".into() })?;
//! let all = rules.all()?;
//! # Ok(()) }
//! ```

use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    codec::Document,
    document::{Record, RecordExt},
    error::DocumentStoreResult,
    query::Query,
};

/// An untyped collection with a reference to a storage backend.
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend + ?Sized> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend + ?Sized> Collection<'a, B> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a document to the collection.
    pub fn add(&self, document: &Document) -> DocumentStoreResult<()> {
        self.backend.add_row(&self.name, document)
    }

    /// Appends documents to the collection; all of them or none.
    pub fn add_all(&self, documents: &[Document]) -> DocumentStoreResult<()> {
        self.backend.add_all(&self.name, documents)
    }

    /// Returns every document in the collection, in insertion order.
    pub fn all(&self) -> DocumentStoreResult<Vec<Document>> {
        self.backend.get_all(&self.name)
    }

    /// Returns the documents matching every constraint in `query`.
    pub fn find(&self, query: &Query) -> DocumentStoreResult<Vec<Document>> {
        self.backend.find(&self.name, query)
    }
}

/// A collection view that converts documents to and from `R`.
///
/// The collection name comes from [`Record::collection_name`].
#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend + ?Sized, R: Record> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<R>,
}

impl<'a, B: StoreBackend + ?Sized, R: Record> TypedCollection<'a, B, R> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Views the same collection as a different record type.
    pub fn with_type<T: Record>(&self) -> TypedCollection<'a, B, T> {
        TypedCollection {
            name: self.name.clone(),
            backend: self.backend,
            _marker: PhantomData,
        }
    }

    /// Appends a record to the collection.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be converted into a document or the backend rejects it.
    pub fn add(&self, record: &R) -> DocumentStoreResult<()> {
        self.backend.add_row(&self.name, &record.to_document()?)
    }

    /// Appends records to the collection.
    ///
    /// Every record is converted before anything is written, so a conversion
    /// failure leaves the collection untouched.
    pub fn add_all(&self, records: &[R]) -> DocumentStoreResult<()> {
        let documents = records
            .iter()
            .map(RecordExt::to_document)
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        self.backend.add_all(&self.name, &documents)
    }

    /// Returns every record in the collection, in insertion order.
    pub fn all(&self) -> DocumentStoreResult<Vec<R>> {
        self.backend
            .get_all(&self.name)?
            .into_iter()
            .map(R::from_document)
            .collect()
    }

    /// Returns the records matching every constraint in `query`.
    pub fn find(&self, query: &Query) -> DocumentStoreResult<Vec<R>> {
        self.backend
            .find(&self.name, query)?
            .into_iter()
            .map(R::from_document)
            .collect()
    }
}
