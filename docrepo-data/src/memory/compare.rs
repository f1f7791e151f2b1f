//! BSON value equality and ordering with MongoDB's cross-type rules.

use bson::{Bson, Document};
use std::cmp::Ordering;

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

fn as_integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        _ => None,
    }
}

/// Equality where `Int32(30)`, `Int64(30)` and `Double(30.0)` are all equal.
pub(crate) fn values_equal(a: &Bson, b: &Bson) -> bool {
    if let (Some(x), Some(y)) = (as_integer(a), as_integer(b)) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x == y;
    }
    match (a, b) {
        (Bson::Array(xs), Bson::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Bson::Document(x), Bson::Document(y)) => documents_equal(x, y),
        _ => a == b,
    }
}

fn documents_equal(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && values_equal(va, vb))
}

/// Position of a value's type in MongoDB's sort order. Numbers share a rank.
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 13,
        _ => 12,
    }
}

/// Ordering between two values of the same type class, `None` across classes.
/// Used by `$gt`/`$lt` style operators, which never match across types.
pub(crate) fn compare_same_type(a: &Bson, b: &Bson) -> Option<Ordering> {
    if type_rank(a) != type_rank(b) {
        return None;
    }
    if let (Some(x), Some(y)) = (as_integer(a), as_integer(b)) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => {
            Some(x.timestamp_millis().cmp(&y.timestamp_millis()))
        }
        (Bson::Timestamp(x), Bson::Timestamp(y)) => {
            Some((x.time, x.increment).cmp(&(y.time, y.increment)))
        }
        (Bson::Null, Bson::Null) | (Bson::MinKey, Bson::MinKey) | (Bson::MaxKey, Bson::MaxKey) => {
            Some(Ordering::Equal)
        }
        (Bson::Array(xs), Bson::Array(ys)) => Some(compare_sequences(xs, ys)),
        _ => None,
    }
}

fn compare_sequences(xs: &[Bson], ys: &[Bson]) -> Ordering {
    for (x, y) in xs.iter().zip(ys) {
        let ord = sort_order(Some(x), Some(y));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    xs.len().cmp(&ys.len())
}

/// Total order used for sorting. A missing field sorts like `null`.
pub(crate) fn sort_order(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let a = a.unwrap_or(&Bson::Null);
    let b = b.unwrap_or(&Bson::Null);
    match type_rank(a).cmp(&type_rank(b)) {
        Ordering::Equal => compare_same_type(a, b).unwrap_or(Ordering::Equal),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn numbers_compare_across_widths() {
        assert!(values_equal(&Bson::Int32(30), &Bson::Int64(30)));
        assert!(values_equal(&Bson::Int32(30), &Bson::Double(30.0)));
        assert!(!values_equal(&Bson::Int32(30), &Bson::String("30".into())));
        assert_eq!(
            compare_same_type(&Bson::Int64(5), &Bson::Double(4.5)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn different_types_do_not_compare() {
        assert_eq!(compare_same_type(&Bson::Int32(1), &Bson::String("1".into())), None);
    }

    #[test]
    fn sort_order_brackets_types() {
        assert_eq!(sort_order(None, Some(&Bson::Int32(0))), Ordering::Less);
        assert_eq!(
            sort_order(Some(&Bson::Int32(100)), Some(&Bson::String("a".into()))),
            Ordering::Less
        );
        let (a, b) = (ObjectId::new(), ObjectId::new());
        assert_eq!(
            sort_order(Some(&Bson::ObjectId(a)), Some(&Bson::ObjectId(b))),
            a.bytes().cmp(&b.bytes())
        );
    }
}
