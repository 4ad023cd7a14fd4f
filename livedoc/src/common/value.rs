use crate::collection::Document;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// The data of a document: an ordered, persistent map of field name to [Value].
///
/// Cloning is O(1) and clones never observe each other's writes.
pub type Data = im::OrdMap<String, Value>;

/// A field value inside a document.
///
/// Equality is structural except for numbers, which compare numerically
/// across [Value::I64] and [Value::F64], and for [Value::Document], which
/// compares by collection and id.
///
/// Ordering is only defined between two numbers, two strings or two bools.
/// Any other pairing is unordered, so every `<`, `>`, `<=`, `>=` between them
/// is `false`:
///
/// ```text
/// Value::from(1) < Value::from(2.5)      // true
/// Value::from("a") < Value::from(1)      // false
/// Value::from("a") >= Value::from(1)     // false
/// ```
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Array(Vec<Value>),
    Object(Data),
    /// A populated reference to another document.
    #[cfg_attr(feature = "serde", serde(skip))]
    Document(Document),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::I64(_) | Value::F64(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value, integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I64(i) => Some(*i as f64),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Data> {
        match self {
            Value::Object(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Interprets the value as a document id for reference lookups.
    pub fn as_id(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::I64(i) => Some(i.to_string()),
            Value::Document(doc) => Some(doc.id().to_string()),
            _ => None,
        }
    }

    /// Deep copy in which every nested document reference is replaced by a
    /// ghost, so the copy shares no mutable state with live documents.
    pub fn detached(&self) -> Value {
        match self {
            Value::Array(items) => Value::Array(items.iter().map(Value::detached).collect()),
            Value::Object(data) => Value::Object(detach_data(data)),
            Value::Document(doc) => Value::Document(doc.ghost()),
            other => other.clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Document(_) => "document",
        }
    }
}

pub(crate) fn detach_data(data: &Data) -> Data {
    data.iter()
        .map(|(k, v)| (k.clone(), v.detached()))
        .collect()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            _ if self.is_number() && other.is_number() => self.as_f64() == other.as_f64(),
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::I64(a), Value::I64(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ if self.is_number() && other.is_number() => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            _ if self == other => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(data) => fmt_data(data, f),
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

pub(crate) fn fmt_data(data: &Data, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in data.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "\"{}\": {}", key, value)?;
    }
    write!(f, "}}")
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::I64(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<Data> for Value {
    fn from(value: Data) -> Self {
        Value::Object(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<&Document> for Value {
    fn from(value: &Document) -> Self {
        Value::Document(value.clone())
    }
}

#[doc(hidden)]
pub fn normalize_key(key: &str) -> String {
    key.trim_matches('"').to_string()
}

/// Builds a [Data] map.
///
/// ```rust,ignore
/// let data = data! {
///     name: "Ann",
///     age: 30,
///     tags: ["a", "b"],
///     address: { city: "Oslo" },
/// };
/// ```
///
/// Values are single token trees, wrap negative numbers and expressions in
/// parentheses.
#[macro_export]
macro_rules! data {
    () => {
        $crate::common::Data::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_mut)]
            let mut data = $crate::common::Data::new();
            $(
                data.insert(
                    $crate::common::normalize_key(stringify!($key)),
                    $crate::data_value!($value),
                );
            )*
            data
        }
    };
}

/// Converts one token tree of the [data!] macro into a [Value].
#[macro_export]
macro_rules! data_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Object($crate::data!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::data_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
