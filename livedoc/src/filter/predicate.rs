use crate::common::Value;
use crate::errors::LiveDocResult;
use crate::filter::Operation;
use std::fmt::{Display, Formatter};

/// What a predicate compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Value(Value),
    /// Nested predicate list of a `||`/`&&` node.
    Clauses(Vec<Predicate>),
}

/// One step of a query: compare the value at `key` using `operation`.
///
/// A `key` must be a path present in the collection schema or one of
/// `id`, `_createdAt`, `_updatedAt`, otherwise the engine skips the
/// predicate. Combinator nodes built by [Predicate::or] and [Predicate::and]
/// have an empty key.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    key: String,
    operation: Operation,
    comparison: Comparison,
    inverse: bool,
    reactive: bool,
}

impl Predicate {
    pub fn new<T: Into<Value>>(key: &str, operation: Operation, comparison: T) -> Self {
        Predicate {
            key: key.to_string(),
            operation,
            comparison: Comparison::Value(comparison.into()),
            inverse: false,
            reactive: false,
        }
    }

    /// Builds a predicate from an operator token such as `">="` or `"all<than"`.
    pub fn parse<T: Into<Value>>(key: &str, operator: &str, comparison: T) -> LiveDocResult<Self> {
        let operation = operator.parse::<Operation>()?;
        Ok(Predicate::new(key, operation, comparison))
    }

    /// Documents matching any of the clauses.
    pub fn or(clauses: Vec<Predicate>) -> Self {
        Predicate::combinator(Operation::Or, clauses)
    }

    /// Documents matching all of the clauses.
    pub fn and(clauses: Vec<Predicate>) -> Self {
        Predicate::combinator(Operation::And, clauses)
    }

    fn combinator(operation: Operation, clauses: Vec<Predicate>) -> Self {
        Predicate {
            key: String::new(),
            operation,
            comparison: Comparison::Clauses(clauses),
            inverse: false,
            reactive: false,
        }
    }

    /// Flips the result of this predicate.
    pub fn not(mut self) -> Self {
        self.inverse = !self.inverse;
        self
    }

    pub fn with_inverse(mut self, inverse: bool) -> Self {
        self.inverse = inverse;
        self
    }

    pub(crate) fn reactive(mut self, reactive: bool) -> Self {
        self.reactive = reactive;
        self
    }

    /// Copy of this predicate with itself and every nested clause marked
    /// as part of a reactive query.
    pub(crate) fn as_reactive(&self) -> Predicate {
        let comparison = match &self.comparison {
            Comparison::Clauses(clauses) => {
                Comparison::Clauses(clauses.iter().map(Predicate::as_reactive).collect())
            }
            value => value.clone(),
        };
        Predicate {
            key: self.key.clone(),
            operation: self.operation,
            comparison,
            inverse: self.inverse,
            reactive: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    pub fn is_reactive(&self) -> bool {
        self.reactive
    }

    /// A `||` or `&&` node carrying a nested predicate list.
    pub fn is_combinator(&self) -> bool {
        self.operation.is_combinator() && matches!(self.comparison, Comparison::Clauses(_))
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.inverse {
            write!(f, "!")?;
        }
        match &self.comparison {
            Comparison::Value(value) => write!(f, "({} {} {})", self.key, self.operation, value),
            Comparison::Clauses(clauses) => {
                write!(f, "(")?;
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", self.operation)?;
                    }
                    write!(f, "{}", clause)?;
                }
                write!(f, ")")
            }
        }
    }
}
