//! Collections, their documents and the events they publish.

mod collection;
mod document;
mod event;
mod options;

pub use collection::*;
pub use document::*;
pub use event::*;
pub use options::*;
