use crate::errors::{ErrorKind, LiveDocError, LiveDocResult};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The comparison a predicate performs.
///
/// The string form of each operation is its operator token, e.g. `"<="`,
/// `"hasAllOf"` or `"some===to"`, and [Operation::from_str] parses it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    /// The resolved array contains the comparison.
    Includes,
    /// The resolved value, or every element of it, is in the comparison array.
    IsContainedIn,
    /// The resolved array contains every element of the comparison array.
    HasAllOf,
    AllGt,
    AllLt,
    AllGte,
    AllLte,
    AllEq,
    SomeGt,
    SomeLt,
    SomeGte,
    SomeLte,
    SomeEq,
    /// Union of nested predicate lists.
    Or,
    /// Nested predicate list applied as one step.
    And,
}

impl Operation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Lt => "<",
            Operation::Gt => ">",
            Operation::Lte => "<=",
            Operation::Gte => ">=",
            Operation::Eq => "===",
            Operation::Includes => "includes",
            Operation::IsContainedIn => "isContainedIn",
            Operation::HasAllOf => "hasAllOf",
            Operation::AllGt => "all>than",
            Operation::AllLt => "all<than",
            Operation::AllGte => "all>=to",
            Operation::AllLte => "all<=to",
            Operation::AllEq => "all===to",
            Operation::SomeGt => "some>than",
            Operation::SomeLt => "some<than",
            Operation::SomeGte => "some>=to",
            Operation::SomeLte => "some<=to",
            Operation::SomeEq => "some===to",
            Operation::Or => "||",
            Operation::And => "&&",
        }
    }

    pub fn is_combinator(&self) -> bool {
        matches!(self, Operation::Or | Operation::And)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operation {
    type Err = LiveDocError;

    fn from_str(s: &str) -> LiveDocResult<Self> {
        let operation = match s {
            "<" => Operation::Lt,
            ">" => Operation::Gt,
            "<=" => Operation::Lte,
            ">=" => Operation::Gte,
            "===" => Operation::Eq,
            "includes" => Operation::Includes,
            "isContainedIn" => Operation::IsContainedIn,
            "hasAllOf" => Operation::HasAllOf,
            "all>than" => Operation::AllGt,
            "all<than" => Operation::AllLt,
            "all>=to" => Operation::AllGte,
            "all<=to" => Operation::AllLte,
            "all===to" => Operation::AllEq,
            "some>than" => Operation::SomeGt,
            "some<than" => Operation::SomeLt,
            "some>=to" => Operation::SomeGte,
            "some<=to" => Operation::SomeLte,
            "some===to" => Operation::SomeEq,
            "||" => Operation::Or,
            "&&" => Operation::And,
            _ => {
                log::error!("Unknown query operator {}", s);
                return Err(LiveDocError::new(
                    &format!("Unknown query operator {}", s),
                    ErrorKind::FilterError,
                ));
            }
        };
        Ok(operation)
    }
}
