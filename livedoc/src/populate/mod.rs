//! The population language.
//!
//! A population specification lists the fields of a document set to keep and
//! which of them hold ids of documents in other collections:
//!
//! ```text
//! title, <users>author{ name }, <users>likes[ name ]
//! ```
//!
//! `<users>author` replaces the id in `author` by the `users` document it
//! names, `{ }` populates that single document further and `[ ]` does the
//! same for every document of a list.

mod executor;
mod parser;
mod tokenizer;

pub use executor::*;
pub use parser::*;
pub use tokenizer::*;
