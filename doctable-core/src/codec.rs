//! Document codec: the textual form stored in a table's single `data` column.
//!
//! A [`Document`] is encoded as compact JSON text. Decoding is strict: the text
//! must parse as JSON and its top-level value must be an object. Anything else
//! is reported as a [`DecodeError`], never as a partial document.
//!
//! The round-trip law `decode(&encode(d)?)? == d` holds for every document
//! `encode` accepts. Documents nested deeper than [`MAX_NESTING_DEPTH`] are
//! refused on the way in, since serde_json would refuse to parse them back.
//! Floats rely on serde_json's `float_roundtrip` parsing to come back bit-exact.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// A schemaless document: field names mapped to JSON values.
///
/// Key order carries no meaning; serde_json keeps keys sorted, so the encoded
/// form of equal documents is identical.
pub type Document = Map<String, Value>;

/// Deepest accepted nesting of objects and arrays, counting the document itself.
///
/// Kept below serde_json's parser recursion limit of 128.
pub const MAX_NESTING_DEPTH: usize = 100;

/// A stored blob that is not an encoded document.
///
/// Carries no location; backends turn it into
/// [`DocumentStoreError::CorruptDocument`] with [`DecodeError::at_row`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct DecodeError {
    reason: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Locates the failure at `row` of `collection`.
    pub fn at_row(self, collection: &str, row: i64) -> DocumentStoreError {
        DocumentStoreError::CorruptDocument {
            collection: collection.to_string(),
            row,
            reason: self.reason,
        }
    }
}

/// Checks that a document can be stored and read back.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidDocument`] if the document nests
/// deeper than [`MAX_NESTING_DEPTH`].
pub fn validate(document: &Document) -> DocumentStoreResult<()> {
    let mut pending = document.values().map(|value| (value, 2)).collect::<Vec<_>>();

    while let Some((value, depth)) = pending.pop() {
        let children = match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            Value::Object(fields) => fields.values().collect(),
            _ => continue,
        };

        if depth > MAX_NESTING_DEPTH {
            return Err(DocumentStoreError::InvalidDocument(format!(
                "document nests deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }

        pending.extend(children.into_iter().map(|child| (child, depth + 1)));
    }

    Ok(())
}

/// Encodes a document into the text stored by backends.
///
/// # Errors
///
/// Fails with [`DocumentStoreError::InvalidDocument`] if [`validate`] rejects the document.
pub fn encode(document: &Document) -> DocumentStoreResult<String> {
    validate(document)?;

    Ok(serde_json::to_string(document)?)
}

/// Decodes stored text back into a document.
pub fn decode(blob: &str) -> Result<Document, DecodeError> {
    match serde_json::from_str::<Value>(blob) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(DecodeError::new(format!(
            "expected a JSON object, found {}",
            value_kind(&other)
        ))),
        Err(err) => Err(DecodeError::new(err.to_string())),
    }
}

/// Short name of a JSON value's type, used in diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
