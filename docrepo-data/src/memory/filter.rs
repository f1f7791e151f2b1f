//! Query-document matching for the in-memory store.
//!
//! A filter is compiled once into a [`Predicate`] so that operator errors
//! surface before any document is touched.

use super::compare::{compare_same_type, values_equal};
use super::MemoryStoreError;
use bson::{Bson, Document};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub(crate) enum Predicate {
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    NoneOf(Vec<Predicate>),
    Field { path: String, condition: Condition },
}

#[derive(Debug, Clone)]
pub(crate) enum Condition {
    Eq(Bson),
    Ne(Bson),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
    In(Vec<Bson>),
    Nin(Vec<Bson>),
    Exists(bool),
    Not(Box<Condition>),
    All(Vec<Condition>),
}

pub(crate) fn compile(filter: &Document) -> Result<Predicate, MemoryStoreError> {
    let mut parts = Vec::with_capacity(filter.len());
    for (key, value) in filter {
        parts.push(compile_entry(key, value)?);
    }
    Ok(Predicate::All(parts))
}

fn compile_entry(key: &str, value: &Bson) -> Result<Predicate, MemoryStoreError> {
    match key {
        "$and" => Ok(Predicate::All(compile_clauses(key, value)?)),
        "$or" => Ok(Predicate::Any(compile_clauses(key, value)?)),
        "$nor" => Ok(Predicate::NoneOf(compile_clauses(key, value)?)),
        op if op.starts_with('$') => Err(MemoryStoreError::UnsupportedOperator(op.to_string())),
        path => Ok(Predicate::Field {
            path: path.to_string(),
            condition: compile_condition(value)?,
        }),
    }
}

fn compile_clauses(op: &str, value: &Bson) -> Result<Vec<Predicate>, MemoryStoreError> {
    let Bson::Array(clauses) = value else {
        return Err(invalid(op, "expected an array of filter documents"));
    };
    if clauses.is_empty() {
        return Err(invalid(op, "array must not be empty"));
    }
    clauses
        .iter()
        .map(|clause| match clause {
            Bson::Document(doc) => compile(doc),
            _ => Err(invalid(op, "expected an array of filter documents")),
        })
        .collect()
}

/// A document whose keys all start with `$` is an operator expression,
/// anything else is matched by equality.
fn compile_condition(value: &Bson) -> Result<Condition, MemoryStoreError> {
    match value {
        Bson::Document(doc) if !doc.is_empty() && doc.keys().all(|k| k.starts_with('$')) => {
            let mut conditions = Vec::with_capacity(doc.len());
            for (op, operand) in doc {
                conditions.push(compile_operator(op, operand)?);
            }
            Ok(match conditions.len() {
                1 => conditions.remove(0),
                _ => Condition::All(conditions),
            })
        }
        other => Ok(Condition::Eq(other.clone())),
    }
}

fn compile_operator(op: &str, operand: &Bson) -> Result<Condition, MemoryStoreError> {
    let condition = match op {
        "$eq" => Condition::Eq(operand.clone()),
        "$ne" => Condition::Ne(operand.clone()),
        "$gt" => Condition::Gt(operand.clone()),
        "$gte" => Condition::Gte(operand.clone()),
        "$lt" => Condition::Lt(operand.clone()),
        "$lte" => Condition::Lte(operand.clone()),
        "$in" => Condition::In(array_operand(op, operand)?),
        "$nin" => Condition::Nin(array_operand(op, operand)?),
        "$exists" => Condition::Exists(truthy(operand)),
        "$not" => match operand {
            Bson::Document(_) => Condition::Not(Box::new(compile_condition(operand)?)),
            _ => return Err(invalid(op, "expected an operator document")),
        },
        other => return Err(MemoryStoreError::UnsupportedOperator(other.to_string())),
    };
    Ok(condition)
}

fn array_operand(op: &str, operand: &Bson) -> Result<Vec<Bson>, MemoryStoreError> {
    match operand {
        Bson::Array(values) => Ok(values.clone()),
        _ => Err(invalid(op, "expected an array")),
    }
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(i) => *i != 0,
        Bson::Int64(i) => *i != 0,
        Bson::Double(d) => *d != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}

fn invalid(op: &str, reason: &'static str) -> MemoryStoreError {
    MemoryStoreError::InvalidOperand {
        op: op.to_string(),
        reason,
    }
}

impl Predicate {
    pub(crate) fn matches(&self, document: &Document) -> bool {
        match self {
            Predicate::All(parts) => parts.iter().all(|p| p.matches(document)),
            Predicate::Any(parts) => parts.iter().any(|p| p.matches(document)),
            Predicate::NoneOf(parts) => !parts.iter().any(|p| p.matches(document)),
            Predicate::Field { path, condition } => {
                let mut values = Vec::new();
                collect_path(document, path, &mut values);
                condition.matches(&values)
            }
        }
    }
}

/// Values reachable at a dotted path. Arrays met along the way fan out, so
/// `tags.name` over `[{name: a}, {name: b}]` yields both names.
fn collect_path<'a>(document: &'a Document, path: &str, out: &mut Vec<&'a Bson>) {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let Some(value) = document.get(head) else {
        return;
    };
    match rest {
        None => out.push(value),
        Some(rest) => collect_nested(value, rest, out),
    }
}

fn collect_nested<'a>(value: &'a Bson, rest: &str, out: &mut Vec<&'a Bson>) {
    match value {
        Bson::Document(inner) => collect_path(inner, rest, out),
        Bson::Array(items) => {
            let (head, tail) = match rest.split_once('.') {
                Some((head, tail)) => (head, Some(tail)),
                None => (rest, None),
            };
            if let Ok(index) = head.parse::<usize>() {
                if let Some(item) = items.get(index) {
                    match tail {
                        None => out.push(item),
                        Some(tail) => collect_nested(item, tail, out),
                    }
                }
                return;
            }
            for item in items {
                if let Bson::Document(inner) = item {
                    collect_path(inner, rest, out);
                }
            }
        }
        _ => {}
    }
}

/// Candidates for a single value: the value itself plus, for arrays, each
/// element.
fn candidates(value: &Bson) -> impl Iterator<Item = &Bson> {
    let elements: &[Bson] = match value {
        Bson::Array(items) => items,
        _ => &[],
    };
    std::iter::once(value).chain(elements.iter())
}

fn any_candidate(values: &[&Bson], mut f: impl FnMut(&Bson) -> bool) -> bool {
    values.iter().any(|v| candidates(v).any(&mut f))
}

fn equals_any(values: &[&Bson], target: &Bson) -> bool {
    // A missing field is equal to null.
    if values.is_empty() {
        return matches!(target, Bson::Null);
    }
    any_candidate(values, |v| values_equal(v, target))
}

fn ordered(values: &[&Bson], target: &Bson, accept: fn(Ordering) -> bool) -> bool {
    any_candidate(values, |v| {
        compare_same_type(v, target).map(accept).unwrap_or(false)
    })
}

impl Condition {
    fn matches(&self, values: &[&Bson]) -> bool {
        match self {
            Condition::Eq(target) => equals_any(values, target),
            Condition::Ne(target) => !equals_any(values, target),
            Condition::Gt(target) => ordered(values, target, Ordering::is_gt),
            Condition::Gte(target) => ordered(values, target, Ordering::is_ge),
            Condition::Lt(target) => ordered(values, target, Ordering::is_lt),
            Condition::Lte(target) => ordered(values, target, Ordering::is_le),
            Condition::In(targets) => targets.iter().any(|t| equals_any(values, t)),
            Condition::Nin(targets) => !targets.iter().any(|t| equals_any(values, t)),
            Condition::Exists(expected) => !values.is_empty() == *expected,
            Condition::Not(inner) => !inner.matches(values),
            Condition::All(conditions) => conditions.iter().all(|c| c.matches(values)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn matches(filter: Document, document: &Document) -> bool {
        compile(&filter).unwrap().matches(document)
    }

    fn alice() -> Document {
        doc! {
            "name": "Alice",
            "age": 30,
            "address": { "city": "Lyon" },
            "tags": ["admin", "ops"],
            "pets": [{ "kind": "cat" }, { "kind": "dog" }],
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches(doc! {}, &alice()));
    }

    #[test]
    fn implicit_equality_and_numeric_widths() {
        assert!(matches(doc! { "name": "Alice" }, &alice()));
        assert!(matches(doc! { "age": 30_i64 }, &alice()));
        assert!(matches(doc! { "age": 30.0 }, &alice()));
        assert!(!matches(doc! { "name": "Bob" }, &alice()));
    }

    #[test]
    fn dotted_paths_and_arrays() {
        assert!(matches(doc! { "address.city": "Lyon" }, &alice()));
        assert!(matches(doc! { "tags": "ops" }, &alice()));
        assert!(matches(doc! { "tags.0": "admin" }, &alice()));
        assert!(matches(doc! { "pets.kind": "dog" }, &alice()));
        assert!(!matches(doc! { "pets.kind": "fish" }, &alice()));
    }

    #[test]
    fn comparison_operators() {
        assert!(matches(doc! { "age": { "$gt": 29 } }, &alice()));
        assert!(matches(doc! { "age": { "$gte": 30, "$lt": 31 } }, &alice()));
        assert!(!matches(doc! { "age": { "$lt": 30 } }, &alice()));
        // No cross-type ordering.
        assert!(!matches(doc! { "age": { "$gt": "1" } }, &alice()));
    }

    #[test]
    fn set_and_existence_operators() {
        assert!(matches(doc! { "name": { "$in": ["Bob", "Alice"] } }, &alice()));
        assert!(matches(doc! { "name": { "$nin": ["Bob"] } }, &alice()));
        assert!(matches(doc! { "email": { "$exists": false } }, &alice()));
        assert!(matches(doc! { "email": null }, &alice()));
        assert!(matches(doc! { "name": { "$ne": "Bob" } }, &alice()));
        assert!(matches(doc! { "age": { "$not": { "$gt": 40 } } }, &alice()));
    }

    #[test]
    fn logical_operators() {
        assert!(matches(
            doc! { "$or": [{ "name": "Bob" }, { "age": 30 }] },
            &alice()
        ));
        assert!(!matches(
            doc! { "$and": [{ "name": "Alice" }, { "age": 31 }] },
            &alice()
        ));
        assert!(matches(doc! { "$nor": [{ "name": "Bob" }] }, &alice()));
    }

    #[test]
    fn nested_document_equality_is_exact() {
        assert!(matches(doc! { "address": { "city": "Lyon" } }, &alice()));
        assert!(!matches(doc! { "address": { "city": "Paris" } }, &alice()));
    }

    #[test]
    fn unknown_operators_are_rejected() {
        let err = compile(&doc! { "name": { "$regex": "^A" } }).unwrap_err();
        assert!(matches!(err, MemoryStoreError::UnsupportedOperator(op) if op == "$regex"));

        let err = compile(&doc! { "$or": "nope" }).unwrap_err();
        assert!(matches!(err, MemoryStoreError::InvalidOperand { .. }));
    }
}
