//! Test helpers shared across the workspace: GraphQL fixtures, a builder for
//! on-disk projects with source sets, and diagnostic formatting.

pub mod assertions;
pub mod fixtures;
pub mod project;

pub use assertions::{format_diagnostic_messages, format_diagnostics};
pub use project::{read_tree, TestProject};
