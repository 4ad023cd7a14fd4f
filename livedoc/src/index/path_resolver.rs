use crate::collection::Document;
use crate::common::{is_reserved_field, Data, Value, CREATED_AT, DOC_ID, FIELD_SEPARATOR, UPDATED_AT, WILDCARD};
use smallvec::SmallVec;

pub(crate) type PathSegments<'a> = SmallVec<[&'a str; 8]>;

#[inline]
pub(crate) fn split_path(path: &str) -> PathSegments<'_> {
    path.split(FIELD_SEPARATOR).collect()
}

/// Whether the path steps through at least one `[]` array segment.
#[inline]
pub fn has_wildcard(path: &str) -> bool {
    path.split(FIELD_SEPARATOR).any(|segment| segment == WILDCARD)
}

/// Resolves a dotted path against a value, `None` when it is undefined.
///
/// A field segment steps into an object (or a populated document). A `[]`
/// segment requires an array: the rest of the path is resolved against every
/// element, undefined results are dropped and results of deeper `[]` segments
/// are flattened into one list. A trailing `[]` yields the array itself.
///
/// ```text
/// {a: [{b: [1, 2]}, {b: [3]}]}   "a.[].b.[]"  ->  [1, 2, 3]
/// {a: [{b: 1}, {c: 2}]}          "a.[].b"     ->  [1]
/// {a: [1, 2]}                    "a.[]"       ->  [1, 2]
/// {a: {b: 1}}                    "a.c"        ->  undefined
/// ```
pub fn resolve(value: &Value, path: &str) -> Option<Value> {
    let segments = split_path(path);
    resolve_segments(value, &segments)
}

/// Resolves a dotted path against document data.
pub fn resolve_data(data: &Data, path: &str) -> Option<Value> {
    let segments = split_path(path);
    let (head, rest) = segments.split_first()?;
    if *head == WILDCARD {
        return None;
    }
    resolve_segments(data.get(*head)?, rest)
}

/// Resolves a path against a document.
///
/// `id`, `_createdAt` and `_updatedAt` read the document's own fields, every
/// other path resolves against the document's data.
pub fn resolve_document(document: &Document, path: &str) -> Option<Value> {
    if is_reserved_field(path) {
        return reserved_value(document, path);
    }
    resolve_data(&document.data(), path)
}

pub(crate) fn reserved_value(document: &Document, field: &str) -> Option<Value> {
    match field {
        DOC_ID => Some(Value::String(document.id().to_string())),
        CREATED_AT => Some(Value::I64(document.created_at())),
        UPDATED_AT => Some(Value::I64(document.updated_at())),
        _ => None,
    }
}

fn resolve_segments(value: &Value, segments: &[&str]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    if *head == WILDCARD {
        let items = value.as_array()?;
        if rest.is_empty() {
            return Some(Value::Array(items.clone()));
        }

        // every deeper wildcard already produced a flat list per element
        let flatten = rest.contains(&WILDCARD);
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            match resolve_segments(item, rest) {
                Some(Value::Array(nested)) if flatten => results.extend(nested),
                Some(resolved) => results.push(resolved),
                None => {}
            }
        }
        return Some(Value::Array(results));
    }

    match value {
        Value::Object(data) => resolve_segments(data.get(*head)?, rest),
        Value::Document(document) => {
            if is_reserved_field(head) {
                let reserved = reserved_value(document, head)?;
                return resolve_segments(&reserved, rest);
            }
            let data = document.data();
            resolve_segments(data.get(*head)?, rest)
        }
        _ => None,
    }
}
