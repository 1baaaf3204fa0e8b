//! # Variants
//!
//! Resolves build variants from their dimensions and merges the source sets
//! of one variant into a single document set per service.
//!
//! A variant's source sets are ordered least specific first:
//!
//! ```text
//! main -> flavors -> flavor combination -> build type -> variant
//! ```
//!
//! Later source sets override earlier ones document by document.

mod error;
mod merge;
mod resolver;
mod variant;

pub use error::ResolveError;
pub use merge::{merge, MergedDocumentSet, Override};
pub use resolver::{resolve, FlavorDimension, VariantDimensions};
pub use variant::{variant_name, Flavor, SourceSetRank, SourceSetRef, Variant};
