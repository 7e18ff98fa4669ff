//! SQLite document storage backend for doctable.
//!
//! This crate implements `StoreBackend` on top of a single SQLite database file.
//! Each registered collection maps to a table with one `data TEXT` column, and each
//! row holds one JSON document.
//!
//! # Features
//!
//! - **Parameterized queries** - Field paths and values are always bound, never spliced into SQL
//! - **Typed equality** - `"5"` never matches `5`, `true` never matches `1`
//! - **Atomic batches** - `add_all` runs inside a single transaction
//! - **Configurable** - Journal mode, sync mode, busy timeout and corrupt row handling
//!
//! # Quick Start
//!
//! ```ignore
//! use doctable::{prelude::*, sqlite::SqliteStore};
//! use serde_json::json;
//!
//! let store = DocumentStore::new(SqliteStore::open("tracker.db")?);
//! let rules = store.collection("rules");
//!
//! rules.add(json!({ "source": "gitlab", "enabled": true }).as_object().unwrap())?;
//! let gitlab = rules.find(&Query::new().eq("source", "gitlab"))?;
//!
//! store.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[allow(unused_extern_crates)]
extern crate self as doctable_sqlite;

pub mod config;
pub(crate) mod query;
pub mod store;

pub use config::{CorruptRowPolicy, JournalMode, SqliteStoreConfig, SyncMode};
pub use store::{SqliteStore, SqliteStoreBuilder};
