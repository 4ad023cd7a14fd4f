//! # livedoc - embedded reactive document store
//!
//! livedoc keeps collections of schemaless documents in process and answers
//! predicate queries over them.
//!
//! ## Key Features
//!
//! - **Path queries**: dotted paths with `[]` wildcards reach into nested
//!   arrays, e.g. `orders.[].lines.[].sku`
//! - **Composable predicates**: comparison, membership and quantified array
//!   operators, nested `&&`/`||` groups and inversion
//! - **Reactive indexes**: live query results kept current as documents are
//!   inserted, written and deleted
//! - **Population language**: a compact specification for joining documents
//!   across collections into copies, e.g. `title, <users>author{ name }`
//! - **Pluggable storage**: document data lives behind a [store::StorageProvider]
//! - **Events**: listeners for every store operation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use livedoc::prelude::*;
//!
//! let db = LiveDoc::builder().open()?;
//! let users = db.create_collection("users", data! { name: "", age: 0, tags: [] })?;
//!
//! users.insert(data! { name: "Ann", age: 30, tags: ["admin"] })?;
//! users.insert(data! { name: "Bo", age: 17 })?;
//!
//! let adults = users.find(&[field("age").gte(18)]);
//!
//! let query = QueryBuilder::new()
//!     .where_("age", Operation::Gte, 18)
//!     .or_where(|q| q.where_("name", Operation::Eq, "Bo"));
//! let live = users.find_reactive(&query);
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - collections, documents and store events
//! - [`common`] - values, constants and shared utilities
//! - [`errors`] - error types and result definitions
//! - [`filter`] - predicates, their evaluation and the query engine
//! - [`index`] - path resolution, index caches and reactive indexes
//! - [`populate`] - the population language
//! - [`store`] - storage provider abstraction and in-memory storage
//! - [`livedoc`] - the store
//! - [`livedoc_builder`] - builder for opening a store
//! - [`livedoc_config`] - store configuration

use crate::common::Scheduler;
use std::sync::LazyLock;

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod index;
pub mod livedoc;
pub mod livedoc_builder;
pub mod livedoc_config;
pub mod populate;
pub mod store;

pub(crate) static SCHEDULER: LazyLock<Scheduler> = LazyLock::new(Scheduler::new);

/// The types needed by most users of the crate.
pub mod prelude {
    pub use crate::collection::{
        Collection, Document, InsertOptions, PopulateOptions, StoreEventInfo, StoreEventListener,
        StoreEvents, TreePopulation,
    };
    pub use crate::common::{Data, Value};
    pub use crate::data;
    pub use crate::errors::{ErrorKind, LiveDocError, LiveDocResult};
    pub use crate::filter::{field, Operation, Predicate, QueryBuilder};
    pub use crate::index::{ReactiveIndex, ReactiveIndexId};
    pub use crate::livedoc::LiveDoc;
    pub use crate::store::{memory::MemoryStorage, StorageProvider};
}
