use crate::collection::Collection;
use crate::common::{DEFAULT_DESTINATION_FIELD, DEFAULT_TARGET_FIELD};
use crate::filter::Predicate;

/// Options for [Collection::insert_with].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOptions {
    /// Id of the new document, a random uuid when `None`.
    pub id: Option<String>,
    /// Whether the collection's reactive indexes are refreshed after the insert.
    pub reactive_update: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        InsertOptions {
            id: None,
            reactive_update: true,
        }
    }
}

impl InsertOptions {
    pub fn with_id(id: &str) -> Self {
        InsertOptions {
            id: Some(id.to_string()),
            ..InsertOptions::default()
        }
    }
}

/// Options for [crate::collection::Document::populate_with].
#[derive(Clone)]
pub struct PopulateOptions {
    src_field: String,
    target: Collection,
    target_field: String,
    destination_field: String,
    query: Option<Vec<Predicate>>,
    unwind: bool,
}

impl PopulateOptions {
    pub fn new(src_field: &str, target: &Collection) -> Self {
        PopulateOptions {
            src_field: src_field.to_string(),
            target: target.clone(),
            target_field: DEFAULT_TARGET_FIELD.to_string(),
            destination_field: DEFAULT_DESTINATION_FIELD.to_string(),
            query: None,
            unwind: false,
        }
    }

    /// Field of the target documents compared with the source field.
    pub fn target_field(mut self, target_field: &str) -> Self {
        self.target_field = target_field.to_string();
        self
    }

    /// Field of the result the found documents are written to.
    pub fn destination_field(mut self, destination_field: &str) -> Self {
        self.destination_field = destination_field.to_string();
        self
    }

    /// Replaces the default `target_field === src_field` query.
    pub fn query(mut self, query: impl Into<Vec<Predicate>>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Stores a single document, or null, instead of a list when at most one
    /// document was found.
    pub fn unwind(mut self, unwind: bool) -> Self {
        self.unwind = unwind;
        self
    }

    pub(crate) fn src_field(&self) -> &str {
        &self.src_field
    }

    pub(crate) fn target(&self) -> &Collection {
        &self.target
    }

    pub(crate) fn get_target_field(&self) -> &str {
        &self.target_field
    }

    pub(crate) fn get_destination_field(&self) -> &str {
        &self.destination_field
    }

    pub(crate) fn get_query(&self) -> Option<&[Predicate]> {
        self.query.as_deref()
    }

    pub(crate) fn is_unwind(&self) -> bool {
        self.unwind
    }
}

/// One relation followed by [crate::collection::Document::tree].
#[derive(Clone)]
pub struct TreePopulation {
    collection: Collection,
    src_field: String,
    target_field: String,
    destination_field: String,
}

impl TreePopulation {
    /// Children of a document of `collection` are the documents of the same
    /// collection whose `target_field` equals its `src_field`, stored under
    /// `destination_field`.
    pub fn new(collection: &Collection, src_field: &str, target_field: &str, destination_field: &str) -> Self {
        TreePopulation {
            collection: collection.clone(),
            src_field: src_field.to_string(),
            target_field: target_field.to_string(),
            destination_field: destination_field.to_string(),
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn src_field(&self) -> &str {
        &self.src_field
    }

    pub fn target_field(&self) -> &str {
        &self.target_field
    }

    pub fn destination_field(&self) -> &str {
        &self.destination_field
    }
}
