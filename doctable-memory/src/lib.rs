//! In-memory document storage backend for doctable.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It is the test double for code written against the storage interface: it enforces the
//! same table registry, query semantics and close behaviour as the SQLite backend, without
//! touching the filesystem.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes behind a `parking_lot` RwLock
//! - **Same query semantics** - Typed equality over nested fields, evaluated in memory
//! - **Seeding** - Preload collections through the builder
//!
//! # Quick Start
//!
//! ```ignore
//! use doctable::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! let store = DocumentStore::new(InMemoryStore::builder().build()?);
//! let issues = store.collection("issues");
//!
//! issues.add(json!({ "issue_id": "1", "status": "open" }).as_object().unwrap())?;
//! let open = issues.find(&Query::new().eq("status", "open"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[allow(unused_extern_crates)]
extern crate self as doctable_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
