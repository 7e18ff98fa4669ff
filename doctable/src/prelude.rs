//! Convenient re-exports of commonly used types from doctable.
//!
//! ```ignore
//! use doctable::prelude::*;
//! ```

pub use doctable_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    codec::Document,
    collection::{Collection, TypedCollection},
    document::{Record, RecordExt},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{FieldPath, Query, QueryVisitor},
    registry::TableRegistry,
    store::DocumentStore,
};
