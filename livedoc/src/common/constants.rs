use std::time::Duration;

// document constants
pub const DOC_ID: &str = "id";
pub const CREATED_AT: &str = "_createdAt";
pub const UPDATED_AT: &str = "_updatedAt";
pub const RESERVED_FIELDS: [&str; 3] = [DOC_ID, CREATED_AT, UPDATED_AT];

// path constants
pub const FIELD_SEPARATOR: char = '.';
pub const WILDCARD: &str = "[]";

// populate constants
pub const DEFAULT_TARGET_FIELD: &str = DOC_ID;
pub const DEFAULT_DESTINATION_FIELD: &str = "children";

// event constants
pub const LIVEDOC_EVENT: &str = "livedoc_event";

// config constants
pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::from_millis(25);

#[inline]
pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}
