//! Path resolution, per document index caching and reactive indexes.

mod index_cache;
mod path_resolver;
mod reactive_index;

pub(crate) use index_cache::IndexCache;
pub use index_cache::get_or_create;
pub use path_resolver::{has_wildcard, resolve, resolve_data, resolve_document};
pub(crate) use path_resolver::{reserved_value, split_path};
pub use reactive_index::*;
