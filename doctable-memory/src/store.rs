//! In-memory storage implementation for document stores.
//!
//! This module provides a fully functional backend that keeps every collection
//! as a vector of documents behind a read-write lock. It honours the same
//! registry, query and lifecycle rules as the SQLite backend, so code written
//! against [`StoreBackend`] can be tested without a database file.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::RwLock;
use tracing::debug;

use doctable_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    codec::{self, Document},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Query,
    registry::TableRegistry,
};

use crate::evaluator::DocumentEvaluator;

type StoreMap = HashMap<&'static str, Vec<Document>>;

/// Thread-safe in-memory document storage backend.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses `Arc`-wrapped internal state. Clones
/// share the same collections, and closing one clone closes them all.
///
/// # Performance
///
/// Queries scan every document of the collection; there are no indexes.
///
/// # Example
///
/// ```ignore
/// use doctable_memory::InMemoryStore;
/// use doctable::backend::StoreBackend;
/// use serde_json::json;
///
/// let store = InMemoryStore::new();
/// store.add_row("issues", json!({ "issue_id": "1" }).as_object().unwrap())?;
/// assert_eq!(store.get_all("issues")?.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    registry: Arc<TableRegistry>,
    /// Physical table name -> documents in insertion order.
    store: Arc<RwLock<StoreMap>>,
    closed: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates an empty store over the default registry.
    pub fn new() -> Self {
        Self::with_registry(TableRegistry::default())
    }

    /// Creates an empty store with one empty collection per registry entry.
    pub fn with_registry(registry: TableRegistry) -> Self {
        let store = registry
            .entries()
            .map(|(_, physical)| (physical, Vec::new()))
            .collect::<StoreMap>();

        Self {
            registry: Arc::new(registry),
            store: Arc::new(RwLock::new(store)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore` with custom options.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Resolves a collection and checks the store is still open.
    fn table(&self, collection: &str) -> DocumentStoreResult<&'static str> {
        let physical = self.registry.resolve(collection)?;

        if self.closed.load(Ordering::Acquire) {
            return Err(DocumentStoreError::StorageUnavailable(
                "in-memory store is closed".to_string(),
            ));
        }

        Ok(physical)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryStore {
    fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    fn add_row(&self, collection: &str, document: &Document) -> DocumentStoreResult<()> {
        let table = self.table(collection)?;
        codec::validate(document)?;

        self.store
            .write()
            .entry(table)
            .or_default()
            .push(document.clone());

        Ok(())
    }

    fn add_all(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()> {
        let table = self.table(collection)?;
        documents.iter().try_for_each(codec::validate)?;

        self.store
            .write()
            .entry(table)
            .or_default()
            .extend(documents.iter().cloned());

        Ok(())
    }

    fn get_all(&self, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let table = self.table(collection)?;

        Ok(self
            .store
            .read()
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    fn find(&self, collection: &str, query: &Query) -> DocumentStoreResult<Vec<Document>> {
        let table = self.table(collection)?;
        let store = self.store.read();

        match store.get(table) {
            Some(documents) => DocumentEvaluator::filter_documents(documents, query),
            None => {
                query.predicates()?;
                Ok(vec![])
            }
        }
    }

    fn close(&self) -> DocumentStoreResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("closed in-memory store");
        }

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use doctable_memory::InMemoryStore;
/// use doctable::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder()
///     .with_documents("issues", prepared_issues)
///     .build()?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    registry: Option<TableRegistry>,
    seed: Vec<(String, Vec<Document>)>,
}

impl InMemoryStoreBuilder {
    /// Uses `registry` instead of the default one.
    pub fn registry(mut self, registry: TableRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Preloads documents into a collection.
    ///
    /// The collection is checked against the registry when the store is built.
    pub fn with_documents(
        mut self,
        collection: impl Into<String>,
        documents: impl IntoIterator<Item = Document>,
    ) -> Self {
        self.seed
            .push((collection.into(), documents.into_iter().collect()));
        self
    }
}

impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds the store and loads any seed documents.
    ///
    /// Fails with [`DocumentStoreError::UnknownCollection`] if a seed targets an
    /// unregistered collection.
    fn build(self) -> DocumentStoreResult<Self::Backend> {
        let store = InMemoryStore::with_registry(self.registry.unwrap_or_default());

        for (collection, documents) in self.seed {
            store.add_all(&collection, &documents)?;
        }

        Ok(store)
    }
}
