use crate::collection::Document;
use crate::common::{is_reserved_field, Data, Value};
use crate::filter::{evaluate, Comparison, Operation, Predicate};
use crate::index::resolve;
use itertools::Itertools;
use std::collections::HashSet;

/// Runs predicate lists over a set of documents of one collection.
///
/// The engine folds the list left to right, every step narrowing the working
/// set, and stops as soon as nothing is left. Predicates whose key the schema
/// does not know are skipped.
pub struct QueryEngine<'a> {
    schema: &'a Data,
    dynamic_indexes: bool,
}

impl<'a> QueryEngine<'a> {
    pub fn new(schema: &'a Data, dynamic_indexes: bool) -> Self {
        QueryEngine {
            schema,
            dynamic_indexes,
        }
    }

    pub fn run(&self, predicates: &[Predicate], candidates: Vec<Document>) -> Vec<Document> {
        let mut working = candidates;
        for (step, predicate) in predicates.iter().enumerate() {
            if working.is_empty() {
                log::trace!(
                    "Query exhausted the working set with {} predicates left",
                    predicates.len() - step
                );
                break;
            }
            working = self.apply(predicate, working);
        }
        working
    }

    /// Whether the key names a schema path or a reserved field.
    pub fn is_queryable(&self, key: &str) -> bool {
        is_reserved_field(key) || resolve(&Value::Object(self.schema.clone()), key).is_some()
    }

    fn apply(&self, predicate: &Predicate, working: Vec<Document>) -> Vec<Document> {
        match (predicate.operation(), predicate.comparison()) {
            (Operation::Or, Comparison::Clauses(clauses)) => {
                self.run_or(clauses, predicate.is_inverse(), working)
            }
            (Operation::And, Comparison::Clauses(clauses)) => {
                self.run_and(clauses, predicate.is_inverse(), working)
            }
            _ if !self.is_queryable(predicate.key()) => {
                log::debug!("Skipping predicate on unknown key {}", predicate.key());
                working
            }
            _ => working
                .into_iter()
                .filter(|doc| evaluate(doc, predicate, self.dynamic_indexes))
                .collect(),
        }
    }

    fn run_or(&self, clauses: &[Predicate], inverse: bool, working: Vec<Document>) -> Vec<Document> {
        let matched = clauses
            .iter()
            .flat_map(|clause| self.run(std::slice::from_ref(clause), working.clone()))
            .unique_by(|doc| doc.id().to_string())
            .collect::<Vec<_>>();

        if inverse {
            difference(working, &matched)
        } else {
            matched
        }
    }

    fn run_and(&self, clauses: &[Predicate], inverse: bool, working: Vec<Document>) -> Vec<Document> {
        if inverse {
            let matched = self.run(clauses, working.clone());
            difference(working, &matched)
        } else {
            self.run(clauses, working)
        }
    }
}

/// The documents of `working` not in `matched`, in working set order.
fn difference(working: Vec<Document>, matched: &[Document]) -> Vec<Document> {
    let matched_ids: HashSet<&str> = matched.iter().map(|doc| doc.id()).collect();
    working
        .into_iter()
        .filter(|doc| !matched_ids.contains(doc.id()))
        .collect()
}
