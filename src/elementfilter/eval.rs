//! Evaluator for compiled filter expressions.

use std::collections::HashMap;

use super::ast::{CompareOp, Expr};

/// Evaluate an expression against an element's tag set.
///
/// Total over arbitrary tag sets: missing keys and non-numeric values fail
/// their predicate instead of raising, so repeated evaluation on the same
/// inputs always returns the same boolean.
pub fn evaluate_expr(expr: &Expr, tags: &HashMap<String, String>) -> bool {
    match expr {
        Expr::KeyExists { key } => tags.contains_key(key),

        Expr::KeyMissing { key } => !tags.contains_key(key),

        Expr::ValueEquals { key, value } => tags.get(key).is_some_and(|actual| actual == value),

        Expr::ValueNotEquals { key, value } => !tags.get(key).is_some_and(|actual| actual == value),

        Expr::ValueAnyOf { key, values } => tags
            .get(key)
            .is_some_and(|actual| values.iter().any(|v| v == actual)),

        Expr::ValueNoneOf { key, values } => !tags
            .get(key)
            .is_some_and(|actual| values.iter().any(|v| v == actual)),

        Expr::Compare { key, op, value } => {
            match tags.get(key).and_then(|actual| parse_numeric(actual)) {
                Some(actual) => compare(*op, actual, *value),
                None => false,
            }
        }

        Expr::And(children) => children.iter().all(|child| evaluate_expr(child, tags)),

        Expr::Or(children) => children.iter().any(|child| evaluate_expr(child, tags)),

        Expr::Not(inner) => !evaluate_expr(inner, tags),
    }
}

/// Parse a tag value as a number.
///
/// One invariant format: optional sign, ASCII digits, `.` as the decimal
/// separator. Values with unit suffixes or locale-specific separators do not
/// participate in numeric comparison, which keeps local results aligned with
/// the emitted remote fragment.
fn parse_numeric(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Apply a comparison operator.
fn compare(op: CompareOp, left: f64, right: f64) -> bool {
    match op {
        CompareOp::Gt => left > right,
        CompareOp::Ge => left >= right,
        CompareOp::Lt => left < right,
        CompareOp::Le => left <= right,
    }
}
