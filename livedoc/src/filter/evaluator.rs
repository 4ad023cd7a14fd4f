use crate::collection::Document;
use crate::common::Value;
use crate::filter::{Comparison, Operation, Predicate};
use crate::index::get_or_create;

/// Evaluates one predicate against one document.
///
/// Type mismatches (an array operation on a scalar, an ordering between a
/// string and a number, an undefined path) make the comparison `false`. The
/// result is then flipped when the predicate is inverted, so an inverted
/// predicate matches exactly the documents the plain one rejects.
///
/// Combinator nodes are not evaluated per document and count as `false`
/// before inversion, the query engine runs them as set operations.
pub fn evaluate(document: &Document, predicate: &Predicate, dynamic_indexes: bool) -> bool {
    let matched = match predicate.comparison() {
        Comparison::Value(comparison) => {
            let resolved = get_or_create(document, predicate, dynamic_indexes);
            match resolved {
                Some(resolved) => compare(predicate.operation(), &resolved, comparison),
                None => false,
            }
        }
        Comparison::Clauses(_) => false,
    };
    matched ^ predicate.is_inverse()
}

fn compare(operation: Operation, resolved: &Value, comparison: &Value) -> bool {
    match operation {
        Operation::Lt => resolved < comparison,
        Operation::Gt => resolved > comparison,
        Operation::Lte => resolved <= comparison,
        Operation::Gte => resolved >= comparison,
        Operation::Eq => resolved == comparison,
        Operation::Includes => resolved
            .as_array()
            .is_some_and(|items| items.contains(comparison)),
        Operation::IsContainedIn => match (resolved, comparison.as_array()) {
            (Value::Array(items), Some(allowed)) => items.iter().all(|item| allowed.contains(item)),
            (scalar, Some(allowed)) => allowed.contains(scalar),
            (_, None) => false,
        },
        Operation::HasAllOf => match (resolved.as_array(), comparison.as_array()) {
            (Some(items), Some(required)) => required.iter().all(|r| items.contains(r)),
            _ => false,
        },
        Operation::AllGt => all(resolved, |item| item > comparison),
        Operation::AllLt => all(resolved, |item| item < comparison),
        Operation::AllGte => all(resolved, |item| item >= comparison),
        Operation::AllLte => all(resolved, |item| item <= comparison),
        Operation::AllEq => all(resolved, |item| item == comparison),
        Operation::SomeGt => some(resolved, |item| item > comparison),
        Operation::SomeLt => some(resolved, |item| item < comparison),
        Operation::SomeGte => some(resolved, |item| item >= comparison),
        Operation::SomeLte => some(resolved, |item| item <= comparison),
        Operation::SomeEq => some(resolved, |item| item == comparison),
        Operation::Or | Operation::And => false,
    }
}

#[inline]
fn all(resolved: &Value, check: impl Fn(&Value) -> bool) -> bool {
    resolved.as_array().is_some_and(|items| items.iter().all(check))
}

#[inline]
fn some(resolved: &Value, check: impl Fn(&Value) -> bool) -> bool {
    resolved.as_array().is_some_and(|items| items.iter().any(check))
}
