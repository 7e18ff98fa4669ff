//! Main doctable crate providing a unified interface for document storage.
//!
//! doctable keeps schemaless JSON documents in a small, fixed set of SQLite
//! tables. This crate is the entry point: it re-exports the core types from the
//! sub-crates and gives access to the available storage backends.
//!
//! # Features
//!
//! - **Schemaless documents** - Any JSON object can be stored; no schema is declared up front
//! - **Fixed table registry** - Only registered collections are readable or writable
//! - **Typed equality queries** - Conjunctions of `field == value` over nested fields
//! - **Typed records** - Domain types convert to and from documents through serde
//! - **Interchangeable backends** - SQLite for persistence, in-memory for tests
//!
//! # Quick Start
//!
//! ```ignore
//! use doctable::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Issue {
//!     pub issue_id: String,
//!     pub title: String,
//!     pub status: String,
//! }
//!
//! impl Record for Issue {
//!     fn collection_name() -> &'static str {
//!         "issues"
//!     }
//! }
//!
//! fn main() -> DocumentStoreResult<()> {
//!     let store = doctable::open("tracker.db")?;
//!     let issues = store.typed_collection::<Issue>();
//!
//!     issues.add(&Issue {
//!         issue_id: "1".into(),
//!         title: "crash on start".into(),
//!         status: "open".into(),
//!     })?;
//!
//!     let open = issues.find(&Query::new().eq("status", "open"))?;
//!     println!("open issues: {open:?}");
//!
//!     store.close()
//! }
//! ```
//!
//! # Untyped Access
//!
//! Collections can also be used with raw documents, which is what the stores
//! persist:
//!
//! ```ignore
//! use doctable::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! let rules = store.collection("rules");
//!
//! rules.add(json!({ "source": { "kind": "gitlab" } }).as_object().unwrap())?;
//! let gitlab = rules.find(&Query::new().eq("source.kind", "gitlab"))?;
//! # Ok::<(), DocumentStoreError>(())
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`sqlite`] - Persistent SQLite backend (enabled by the default `sqlite` feature)

pub mod prelude;

pub use doctable_core::{backend, codec, collection, document, error, query, registry, store};

// Re-export serde_json so documents can be built without a direct dependency.
pub use serde_json;

/// In-memory storage backend implementations.
pub mod memory {
    pub use doctable_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// SQLite storage backend implementations.
///
/// This module is only available when the `sqlite` feature is enabled.
#[cfg(feature = "sqlite")]
pub mod sqlite {
    pub use doctable_sqlite::{
        CorruptRowPolicy, JournalMode, SqliteStore, SqliteStoreBuilder, SqliteStoreConfig, SyncMode,
    };
}

/// Opens the SQLite database at `path` with the default registry and settings.
///
/// Registered tables that do not exist yet are created.
///
/// # Errors
///
/// Returns [`DocumentStoreError::StorageUnavailable`](error::DocumentStoreError::StorageUnavailable)
/// if the database cannot be opened or initialized.
#[cfg(feature = "sqlite")]
pub fn open(
    path: impl Into<std::path::PathBuf>,
) -> error::DocumentStoreResult<store::DocumentStore<doctable_sqlite::SqliteStore>> {
    doctable_sqlite::SqliteStore::open(path).map(store::DocumentStore::new)
}
