//! Predicates, their evaluation against documents and the query engine.
//!
//! A query is an ordered list of [Predicate]s. The [QueryEngine] folds it
//! over a document set, [evaluate] decides a single predicate for a single
//! document, and [QueryBuilder] and [field] build predicate lists fluently.

mod evaluator;
mod fluent;
mod operation;
mod predicate;
mod query_engine;

pub use evaluator::*;
pub use fluent::*;
pub use operation::*;
pub use predicate::*;
pub use query_engine::*;
