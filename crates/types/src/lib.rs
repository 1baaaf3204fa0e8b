//! Foundation types for variant-aware GraphQL code generation.
//!
//! This crate provides shared types used across the codegen pipeline.
//! It has zero external dependencies, making it suitable as a foundation layer.
//!
//! # Type Categories
//!
//! - **Document types**: [`DocumentKind`], [`LogicalName`]
//! - **Position types**: [`Position`], [`Range`], [`OffsetRange`], [`SourceLocation`]
//! - **Severity types**: [`DiagnosticSeverity`]

mod file;
mod position;
mod severity;

pub use file::{DocumentKind, LogicalName};
pub use position::{OffsetRange, Position, Range, SourceLocation};
pub use severity::DiagnosticSeverity;
