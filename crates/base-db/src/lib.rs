//! Document Store: ingestion of source sets.
//!
//! A source set (`main`, `debug`, `free`, `freeDebug`, ...) is a directory of
//! GraphQL files. Loading a source set for a service reads every file the
//! service owns, classifies it and parses it. Nothing is merged or validated
//! here. A file that fails to parse is kept in a poisoned state so that the
//! rest of the source set stays usable.

mod document;
mod error;
mod store;

pub use document::{Document, ParseState, INTROSPECTION_PARSE_FAILURE};
pub use error::StoreError;
pub use store::{DocumentStore, SourceSet, MAIN_SOURCE_SET};

// Re-export the foundation types so downstream crates see one vocabulary.
pub use graphql_types::{DocumentKind, LogicalName};
