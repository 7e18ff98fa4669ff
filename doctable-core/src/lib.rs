//! A schemaless document store layered over fixed relational tables.
//!
//! This crate is the core of the doctable project and provides:
//!
//! - **Document codec** ([`codec`]) - The [`Document`](codec::Document) type and its stored text form
//! - **Table registry** ([`registry`]) - The closed set of collections a store may touch
//! - **Queries** ([`query`]) - Conjunctive equality constraints over (nested) fields
//! - **Store backend abstraction** ([`backend`]) - The capability trait storage engines implement
//! - **Records** ([`document`]) - Typed domain records converted to and from documents
//! - **Collections** ([`collection`]) - Untyped and typed collection views
//! - **Document store** ([`store`]) - Main interface owning a backend
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use doctable::{document::Record, query::Query};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Rule {
//!     pub source: String,
//!     pub destination: String,
//! }
//!
//! impl Record for Rule {
//!     fn collection_name() -> &'static str {
//!         "rules"
//!     }
//! }
//!
//! let store = doctable::open("tracker.db")?;
//! let rules = store.typed_collection::<Rule>();
//! rules.add(&Rule { source: "gitlab".into(), destination: "jira".into() })?;
//! let from_gitlab = rules.find(&Query::new().eq("source", "gitlab"))?;
//! store.close()?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as doctable_core;

pub mod backend;
pub mod codec;
pub mod collection;
pub mod document;
pub mod error;
pub mod query;
pub mod registry;
pub mod store;
