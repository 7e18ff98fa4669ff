//! Query translation from doctable predicates to a parameterized SQL condition.
//!
//! Each predicate becomes a test on `json_type(data, ?)` and, for numbers and
//! strings, `json_extract(data, ?)`. Both the JSON path and the compared value
//! are bound parameters; nothing from the query is spliced into the SQL text.
//! The JSON type test keeps SQLite's loose typing out of the comparison, so
//! `'5'` never equals `5` and `true` never equals `1`.

use rusqlite::types::Value as SqlValue;
use serde_json::Number;

use doctable_core::{
    error::DocumentStoreResult,
    query::{FieldPath, Literal, Predicate, QueryVisitor},
};

/// A SQL boolean expression over the `data` column plus its parameters, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SqlCondition {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Translates validated predicates into an [`SqlCondition`].
///
/// An empty conjunction translates to `1` (true).
pub(crate) struct SqlQueryTranslator;

impl QueryVisitor for SqlQueryTranslator {
    type Output = SqlCondition;

    fn visit_and(&mut self, predicates: &[Predicate<'_>]) -> DocumentStoreResult<SqlCondition> {
        if predicates.is_empty() {
            return Ok(SqlCondition { sql: "1".to_string(), params: Vec::new() });
        }

        let mut clauses = Vec::with_capacity(predicates.len());
        let mut params = Vec::new();

        for predicate in predicates {
            let condition = self.visit_eq(&predicate.path, &predicate.value)?;
            clauses.push(condition.sql);
            params.extend(condition.params);
        }

        Ok(SqlCondition { sql: clauses.join(" AND "), params })
    }

    fn visit_eq(&mut self, path: &FieldPath, value: &Literal<'_>) -> DocumentStoreResult<SqlCondition> {
        let json_path = SqlValue::Text(path.json_path());

        Ok(match value {
            Literal::Null => SqlCondition {
                sql: "json_type(data, ?) = 'null'".to_string(),
                params: vec![json_path],
            },
            Literal::Bool(b) => SqlCondition {
                sql: "json_type(data, ?) = ?".to_string(),
                params: vec![json_path, SqlValue::Text(b.to_string())],
            },
            Literal::Number(n) => SqlCondition {
                sql: "(json_type(data, ?) IN ('integer', 'real') AND json_extract(data, ?) = ?)"
                    .to_string(),
                params: vec![json_path.clone(), json_path, number_param(n)],
            },
            Literal::String(s) => SqlCondition {
                sql: "(json_type(data, ?) = 'text' AND json_extract(data, ?) = ?)".to_string(),
                params: vec![json_path.clone(), json_path, SqlValue::Text(s.to_string())],
            },
        })
    }
}

/// Binds integers that fit SQLite's 64-bit integers exactly, everything else as REAL.
///
/// `json_extract` reads stored numbers the same way, and SQLite compares INTEGER
/// against REAL exactly; the in-memory evaluator follows the same rule.
fn number_param(n: &Number) -> SqlValue {
    match n.as_i64() {
        Some(i) => SqlValue::Integer(i),
        None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    }
}
