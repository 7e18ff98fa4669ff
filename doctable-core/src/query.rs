//! Conjunctive equality queries over document fields.
//!
//! A [`Query`] is a list of `field path = literal` constraints that must all hold
//! for a document to match. Paths address nested members with dots
//! (`address.city`). There are no ranges, existence checks or OR: equality and
//! AND only.
//!
//! # Query Building
//!
//! ```ignore
//! use doctable::query::Query;
//!
//! let query = Query::new()
//!     .eq("status", "open")
//!     .eq("source.issue_id", "1");
//! ```
//!
//! A query can also be built from a document-shaped mapping, the way callers
//! receive it over the wire:
//!
//! ```ignore
//! let query = Query::from(serde_json::json!({ "age": 5 }).as_object().unwrap().clone());
//! ```
//!
//! # Semantics
//!
//! - The empty query is the empty conjunction and matches every document.
//! - A path that is absent from a document never matches, not even `null`.
//!   A `null` literal matches only an explicitly stored `null`.
//! - Numbers compare by numeric value (`5` matches `5.0`). Values of different
//!   JSON types never match each other (`"5"` does not match `5`, `true` does not
//!   match `1`).
//!
//! # Validation
//!
//! Field paths must follow `ident ("." ident)*` with `ident = [A-Za-z_][A-Za-z0-9_]*`,
//! otherwise [`DocumentStoreError::InvalidFieldPath`] is returned. Literals must be
//! scalars; arrays and objects fail with [`DocumentStoreError::InvalidQueryValue`].
//! Backends never see an unvalidated constraint: they receive [`Predicate`]s
//! through [`Query::accept`] or [`Query::predicates`].

use serde_json::{Number, Value};

use crate::{
    codec::{Document, value_kind},
    error::{DocumentStoreError, DocumentStoreResult},
    registry::is_identifier,
};

/// A validated, dot-separated path to a (possibly nested) document member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Parses and validates a field path.
    pub fn parse(path: &str) -> DocumentStoreResult<Self> {
        if path.split('.').all(is_identifier) {
            Ok(FieldPath(path.to_string()))
        } else {
            Err(DocumentStoreError::InvalidFieldPath(path.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path's members, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// SQLite/JSONPath form of this path, e.g. `$.address.city`.
    pub fn json_path(&self) -> String {
        format!("$.{}", self.0)
    }

    /// Looks up the value this path addresses in `document`.
    ///
    /// Returns `None` if any member along the way is missing or is not an object.
    pub fn lookup<'d>(&self, document: &'d Document) -> Option<&'d Value> {
        let mut segments = self.segments();
        let mut current = document.get(segments.next()?)?;

        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        Some(current)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scalar value a field can be compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Null,
    Bool(bool),
    Number(&'a Number),
    String(&'a str),
}

impl<'a> Literal<'a> {
    /// Borrows a JSON value as a literal, rejecting arrays and objects.
    pub fn from_value(path: &str, value: &'a Value) -> DocumentStoreResult<Self> {
        match value {
            Value::Null => Ok(Literal::Null),
            Value::Bool(b) => Ok(Literal::Bool(*b)),
            Value::Number(n) => Ok(Literal::Number(n)),
            Value::String(s) => Ok(Literal::String(s)),
            other => Err(DocumentStoreError::InvalidQueryValue(
                path.to_string(),
                format!("{} values cannot be used in equality constraints", value_kind(other)),
            )),
        }
    }
}

/// A single raw `field = value` constraint, as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The dotted field path. Validated when the query is executed.
    pub field: String,
    /// The value the field must equal.
    pub value: Value,
}

/// A validated constraint handed to backends.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<'a> {
    pub path: FieldPath,
    pub value: Literal<'a>,
}

/// A conjunction of equality constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
}

impl Query {
    /// Creates an empty query, which matches every document.
    pub fn new() -> Self {
        Query { conditions: Vec::new() }
    }

    /// Adds the constraint `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Validates every constraint and returns them as predicates.
    ///
    /// The first invalid path or value aborts validation.
    pub fn predicates(&self) -> DocumentStoreResult<Vec<Predicate<'_>>> {
        self.conditions
            .iter()
            .map(|condition| {
                Ok(Predicate {
                    path: FieldPath::parse(&condition.field)?,
                    value: Literal::from_value(&condition.field, &condition.value)?,
                })
            })
            .collect()
    }

    /// Validates the query and runs `visitor` over its predicates.
    pub fn accept<V: QueryVisitor>(&self, visitor: &mut V) -> DocumentStoreResult<V::Output> {
        visitor.visit_and(&self.predicates()?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Query::new(), |query, (field, value)| query.eq(field, value))
    }
}

impl From<Document> for Query {
    fn from(mapping: Document) -> Self {
        mapping.into_iter().collect()
    }
}

/// Backend-specific translation or evaluation of a validated query.
///
/// The SQLite backend turns predicates into SQL, the in-memory backend
/// evaluates them against a document.
pub trait QueryVisitor {
    type Output;

    /// Combines every predicate with logical AND.
    fn visit_and(&mut self, predicates: &[Predicate<'_>]) -> DocumentStoreResult<Self::Output>;

    /// Handles the single constraint `path == value`.
    fn visit_eq(
        &mut self,
        path: &FieldPath,
        value: &Literal<'_>,
    ) -> DocumentStoreResult<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_dotted_identifiers() {
        for path in ["age", "address.city", "_id", "a1.b_2.C3", "source.meta.created_at"] {
            assert_eq!(FieldPath::parse(path).unwrap().as_str(), path);
        }
    }

    #[test]
    fn rejects_everything_else() {
        for path in [
            "",
            ".",
            "a.",
            ".a",
            "a..b",
            "1abc",
            "a b",
            "a-b",
            "$.a",
            "a[0]",
            "name'); DROP TABLE items; --",
            "a\"b",
            "a\nb",
            "ünïcode",
        ] {
            assert!(
                matches!(FieldPath::parse(path), Err(DocumentStoreError::InvalidFieldPath(p)) if p == path),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn json_path_prefixes_root() {
        assert_eq!(FieldPath::parse("address.city").unwrap().json_path(), "$.address.city");
    }

    #[test]
    fn lookup_walks_nested_objects() {
        let document = json!({ "address": { "city": "X", "zip": null }, "tags": ["a"] });
        let document = document.as_object().unwrap();

        let city = FieldPath::parse("address.city").unwrap();
        let zip = FieldPath::parse("address.zip").unwrap();
        let missing = FieldPath::parse("address.street").unwrap();
        let through_array = FieldPath::parse("tags.length").unwrap();

        assert_eq!(city.lookup(document), Some(&json!("X")));
        assert_eq!(zip.lookup(document), Some(&Value::Null));
        assert_eq!(missing.lookup(document), None);
        assert_eq!(through_array.lookup(document), None);
    }

    #[test]
    fn builder_keeps_constraint_order() {
        let query = Query::new().eq("name", "a").eq("age", 5);

        assert_eq!(query.len(), 2);
        assert_eq!(query.conditions()[0].field, "name");
        assert_eq!(query.conditions()[1].value, json!(5));
    }

    #[test]
    fn builds_from_mapping() {
        let mapping = json!({ "name": "a", "age": 5 }).as_object().unwrap().clone();
        let query = Query::from(mapping);

        assert_eq!(query.len(), 2);
        assert!(query.conditions().contains(&Condition { field: "age".into(), value: json!(5) }));
    }

    #[test]
    fn predicates_reject_bad_paths() {
        let query = Query::new().eq("ok", 1).eq("not ok", 2);
        assert!(matches!(query.predicates(), Err(DocumentStoreError::InvalidFieldPath(p)) if p == "not ok"));
    }

    #[test]
    fn predicates_reject_composite_values() {
        let query = Query::new().eq("tags", json!(["a", "b"]));
        assert!(matches!(query.predicates(), Err(DocumentStoreError::InvalidQueryValue(p, _)) if p == "tags"));

        let query = Query::new().eq("address", json!({ "city": "X" }));
        assert!(matches!(query.predicates(), Err(DocumentStoreError::InvalidQueryValue(..))));
    }

    #[test]
    fn predicates_carry_literals() {
        let query = Query::new()
            .eq("a", Value::Null)
            .eq("b", true)
            .eq("c", 2.5)
            .eq("d", "text");
        let predicates = query.predicates().unwrap();

        assert_eq!(predicates[0].value, Literal::Null);
        assert_eq!(predicates[1].value, Literal::Bool(true));
        assert!(matches!(predicates[2].value, Literal::Number(n) if n.as_f64() == Some(2.5)));
        assert_eq!(predicates[3].value, Literal::String("text"));
    }

    #[derive(Default)]
    struct Render;

    impl QueryVisitor for Render {
        type Output = String;

        fn visit_and(&mut self, predicates: &[Predicate<'_>]) -> DocumentStoreResult<String> {
            Ok(predicates
                .iter()
                .map(|p| self.visit_eq(&p.path, &p.value))
                .collect::<DocumentStoreResult<Vec<_>>>()?
                .join(" & "))
        }

        fn visit_eq(&mut self, path: &FieldPath, value: &Literal<'_>) -> DocumentStoreResult<String> {
            Ok(format!("{path}={value:?}"))
        }
    }

    #[test]
    fn accept_validates_before_visiting() {
        let rendered = Query::new().eq("a.b", "x").accept(&mut Render).unwrap();
        assert_eq!(rendered, "a.b=String(\"x\")");

        assert!(Query::new().eq("a b", "x").accept(&mut Render).is_err());
        assert_eq!(Query::new().accept(&mut Render).unwrap(), "");
    }
}
