//! Query evaluation for in-memory document filtering.
//!
//! Mirrors the comparison rules of the SQLite backend so both backends return
//! the same documents for the same query.

use serde_json::{Number, Value};

use doctable_core::{
    codec::Document,
    error::DocumentStoreResult,
    query::{FieldPath, Literal, Predicate, Query, QueryVisitor},
};

/// Comparable view of a stored scalar.
///
/// Composite values (arrays, objects) have no comparable form and never equal a literal.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(&'a Number),
    String(&'a str),
}

impl<'a> Comparable<'a> {
    pub(crate) fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Null => Some(Comparable::Null),
            Value::Bool(b) => Some(Comparable::Bool(*b)),
            Value::Number(n) => Some(Comparable::Number(n)),
            Value::String(s) => Some(Comparable::String(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub(crate) fn equals(&self, literal: &Literal<'_>) -> bool {
        match (self, literal) {
            (Comparable::Null, Literal::Null) => true,
            (Comparable::Bool(a), Literal::Bool(b)) => a == b,
            (Comparable::Number(a), Literal::Number(b)) => numbers_equal(a, b),
            (Comparable::String(a), Literal::String(b)) => a == b,
            _ => false,
        }
    }
}

/// A number as SQLite reads it out of JSON: integers that fit an i64 stay
/// exact, every other number becomes an f64.
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Integer(i64),
    Real(f64),
}

impl Numeric {
    fn of(n: &Number) -> Option<Self> {
        match n.as_i64() {
            Some(i) => Some(Numeric::Integer(i)),
            None => n.as_f64().map(Numeric::Real),
        }
    }
}

/// Compares like SQLite does: integer against real is exact, never rounded.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (Numeric::of(a), Numeric::of(b)) {
        (Some(Numeric::Integer(a)), Some(Numeric::Integer(b))) => a == b,
        (Some(Numeric::Real(a)), Some(Numeric::Real(b))) => a == b,
        (Some(Numeric::Integer(i)), Some(Numeric::Real(f)))
        | (Some(Numeric::Real(f)), Some(Numeric::Integer(i))) => real_equals_integer(f, i),
        _ => false,
    }
}

/// 2^63, the smallest f64 above `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn real_equals_integer(f: f64, i: i64) -> bool {
    f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) && f as i64 == i
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Returns the documents that satisfy every predicate of `query`.
    ///
    /// The query is validated once, before any document is looked at.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        query: &Query,
    ) -> DocumentStoreResult<Vec<Document>> {
        let predicates = query.predicates()?;
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).visit_and(&predicates)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;

    fn visit_and(&mut self, predicates: &[Predicate<'_>]) -> DocumentStoreResult<bool> {
        for predicate in predicates {
            if !self.visit_eq(&predicate.path, &predicate.value)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_eq(&mut self, path: &FieldPath, value: &Literal<'_>) -> DocumentStoreResult<bool> {
        Ok(path
            .lookup(self.document)
            .and_then(Comparable::from_value)
            .is_some_and(|stored| stored.equals(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn matches(document: &Document, query: Query) -> bool {
        query.accept(&mut DocumentEvaluator::new(document)).unwrap()
    }

    #[test]
    fn empty_query_matches() {
        assert!(matches(&doc(json!({})), Query::new()));
    }

    #[test]
    fn numbers_compare_by_value() {
        let d = doc(json!({ "age": 5, "ratio": 0.5, "neg": -0.0, "big": u64::MAX }));

        assert!(matches(&d, Query::new().eq("age", 5)));
        assert!(matches(&d, Query::new().eq("age", 5.0)));
        assert!(matches(&d, Query::new().eq("ratio", 0.5)));
        assert!(matches(&d, Query::new().eq("neg", 0)));
        assert!(matches(&d, Query::new().eq("big", u64::MAX)));
        assert!(!matches(&d, Query::new().eq("age", 6)));
        assert!(!matches(&d, Query::new().eq("age", 5.5)));
    }

    #[test]
    fn integers_beyond_i64_compare_as_reals() {
        let d = doc(json!({ "big": u64::MAX }));

        assert!(matches(&d, Query::new().eq("big", u64::MAX - 1)));
        assert!(matches(&d, Query::new().eq("big", 18_446_744_073_709_551_616.0)));
        assert!(!matches(&d, Query::new().eq("big", i64::MAX)));
    }

    #[test]
    fn integer_against_real_is_exact() {
        let d = doc(json!({ "above": 9_007_199_254_740_993_i64, "at": 9_007_199_254_740_992_i64 }));

        assert!(!matches(&d, Query::new().eq("above", 9_007_199_254_740_992.0)));
        assert!(matches(&d, Query::new().eq("at", 9_007_199_254_740_992.0)));
        assert!(!matches(&d, Query::new().eq("at", I64_BOUND)));
    }

    #[test]
    fn types_never_cross_match() {
        let d = doc(json!({ "n": 1, "s": "1", "b": true }));

        assert!(!matches(&d, Query::new().eq("n", "1")));
        assert!(!matches(&d, Query::new().eq("s", 1)));
        assert!(!matches(&d, Query::new().eq("b", 1)));
        assert!(matches(&d, Query::new().eq("b", true)));
    }

    #[test]
    fn null_matches_explicit_null_only() {
        let with_null = doc(json!({ "assignee": null }));
        let without = doc(json!({ "title": "x" }));

        assert!(matches(&with_null, Query::new().eq("assignee", Value::Null)));
        assert!(!matches(&without, Query::new().eq("assignee", Value::Null)));
    }

    #[test]
    fn nested_paths_and_composites() {
        let d = doc(json!({ "address": { "city": "X" }, "tags": ["X"] }));

        assert!(matches(&d, Query::new().eq("address.city", "X")));
        assert!(!matches(&d, Query::new().eq("address.zip", "X")));
        assert!(!matches(&d, Query::new().eq("tags", "X")));
    }

    #[test]
    fn filter_documents_keeps_order() {
        let docs = vec![
            doc(json!({ "name": "a", "age": 5 })),
            doc(json!({ "name": "b", "age": 6 })),
            doc(json!({ "name": "c", "age": 5 })),
        ];

        let matched = DocumentEvaluator::filter_documents(&docs, &Query::new().eq("age", 5)).unwrap();
        assert_eq!(matched, vec![docs[0].clone(), docs[2].clone()]);
    }

    #[test]
    fn filter_documents_validates_even_without_documents() {
        let result = DocumentEvaluator::filter_documents(std::iter::empty(), &Query::new().eq("a-b", 1));
        assert!(result.is_err());
    }
}
