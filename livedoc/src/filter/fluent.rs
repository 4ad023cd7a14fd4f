use crate::common::Value;
use crate::filter::{Operation, Predicate};

/// Starts a predicate on `field_name`.
///
/// ```rust,ignore
/// let adults = field("age").gte(18);
/// let tagged = field("tags").has_all_of(vec!["a", "b"]);
/// ```
pub fn field(field_name: &str) -> FluentPredicate {
    FluentPredicate {
        field_name: field_name.to_string(),
    }
}

pub struct FluentPredicate {
    field_name: String,
}

impl FluentPredicate {
    #[inline]
    fn with<T: Into<Value>>(self, operation: Operation, value: T) -> Predicate {
        Predicate::new(&self.field_name, operation, value)
    }

    pub fn lt<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::Lt, value)
    }

    pub fn gt<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::Gt, value)
    }

    pub fn lte<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::Lte, value)
    }

    pub fn gte<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::Gte, value)
    }

    pub fn eq<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::Eq, value)
    }

    pub fn includes<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::Includes, value)
    }

    pub fn is_contained_in<T: Into<Value>>(self, values: Vec<T>) -> Predicate {
        self.with(Operation::IsContainedIn, values)
    }

    pub fn has_all_of<T: Into<Value>>(self, values: Vec<T>) -> Predicate {
        self.with(Operation::HasAllOf, values)
    }

    pub fn all_gt<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::AllGt, value)
    }

    pub fn all_lt<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::AllLt, value)
    }

    pub fn all_gte<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::AllGte, value)
    }

    pub fn all_lte<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::AllLte, value)
    }

    pub fn all_eq<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::AllEq, value)
    }

    pub fn some_gt<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::SomeGt, value)
    }

    pub fn some_lt<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::SomeLt, value)
    }

    pub fn some_gte<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::SomeGte, value)
    }

    pub fn some_lte<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::SomeLte, value)
    }

    pub fn some_eq<T: Into<Value>>(self, value: T) -> Predicate {
        self.with(Operation::SomeEq, value)
    }
}

/// Builds a predicate list step by step.
///
/// Every method consumes the builder and returns the extended one.
/// [QueryBuilder::or_where] ORs its nested clause with everything built so
/// far, [QueryBuilder::and_where] appends its nested clause as one `&&` step.
///
/// ```rust,ignore
/// // adults, or anyone called Bo
/// let query = QueryBuilder::new()
///     .where_("age", Operation::Gte, 18)
///     .or_where(|q| q.where_("name", Operation::Eq, "Bo"));
/// let docs = users.find(&query);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    predicates: Vec<Predicate>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    pub fn where_<T: Into<Value>>(self, key: &str, operation: Operation, comparison: T) -> Self {
        self.push(Predicate::new(key, operation, comparison))
    }

    /// Like [QueryBuilder::where_] with the result inverted.
    pub fn where_not<T: Into<Value>>(self, key: &str, operation: Operation, comparison: T) -> Self {
        self.push(Predicate::new(key, operation, comparison).not())
    }

    /// Appends an already built predicate.
    pub fn push(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn or_where(self, build: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        let nested = build(QueryBuilder::new()).predicates;
        if self.predicates.is_empty() {
            return QueryBuilder {
                predicates: vec![Predicate::and(nested)],
            };
        }

        QueryBuilder {
            predicates: vec![Predicate::or(vec![
                Predicate::and(self.predicates),
                Predicate::and(nested),
            ])],
        }
    }

    pub fn and_where(self, build: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        let nested = build(QueryBuilder::new()).predicates;
        self.push(Predicate::and(nested))
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn build(self) -> Vec<Predicate> {
        self.predicates
    }
}

impl AsRef<[Predicate]> for QueryBuilder {
    fn as_ref(&self) -> &[Predicate] {
        &self.predicates
    }
}

impl From<QueryBuilder> for Vec<Predicate> {
    fn from(builder: QueryBuilder) -> Self {
        builder.predicates
    }
}
