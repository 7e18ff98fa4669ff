//! Typed records layered over schemaless documents.
//!
//! Stores only understand [`Document`]s. Domain types (issues, rules, ...) opt in
//! by implementing [`Record`], which names their collection and relies on serde
//! to produce the field mapping that gets persisted.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value, to_value};

use crate::{
    codec::{Document, value_kind},
    error::{DocumentStoreError, DocumentStoreResult},
};

/// Core trait that all typed records stored in a document store must implement.
///
/// # Example
///
/// ```ignore
/// use doctable::document::Record;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Rule {
///     pub source: String,
///     pub destination: String,
/// }
///
/// impl Record for Rule {
///     fn collection_name() -> &'static str {
///         "rules"
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Returns the registry name of the collection this record belongs to.
    fn collection_name() -> &'static str;
}

/// Conversions between records and documents.
///
/// Automatically implemented for all types that implement [`Record`].
pub trait RecordExt: Record {
    /// Converts this record into its field mapping.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidDocument`] if the record does not
    /// serialize to a JSON object, or a serialization error if serde fails.
    fn to_document(&self) -> DocumentStoreResult<Document>;

    /// Rebuilds a record from a stored document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if the document does not fit
    /// the record's shape.
    fn from_document(document: Document) -> DocumentStoreResult<Self>;
}

impl<R: Record> RecordExt for R {
    fn to_document(&self) -> DocumentStoreResult<Document> {
        match to_value(self)? {
            Value::Object(document) => Ok(document),
            other => Err(DocumentStoreError::InvalidDocument(format!(
                "{} records serialize to {}, expected an object",
                R::collection_name(),
                value_kind(&other)
            ))),
        }
    }

    fn from_document(document: Document) -> DocumentStoreResult<Self> {
        Ok(from_value(Value::Object(document))?)
    }
}
