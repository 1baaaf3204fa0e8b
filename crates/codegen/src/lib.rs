//! # GraphQL Codegen
//!
//! The last stages of the pipeline, run once per (variant, service) unit:
//!
//! ```text
//! load source sets -> merge -> validate -> CompilationUnit -> generate -> write
//! ```
//!
//! Every unit writes below `<output_root>/<variant>/<service>/` only, so units
//! never observe or disturb each other and can run in parallel. A unit that
//! fails reports its diagnostics and leaves no artifacts behind; its siblings
//! still run.

mod error;
mod generator;
mod pipeline;
mod unit;
mod writer;

pub use error::CodegenError;
pub use generator::{
    generate, operation_class_name, ArtifactKind, CodeEmitter, EmitRequest, GeneratedArtifact,
    JavaEmitter, FRAGMENT_PACKAGE,
};
pub use pipeline::{CodegenPipeline, RunMode, UnitFilter, UnitOutcome, UnitReport};
pub use unit::{CompilationUnit, ServiceInput};
pub use writer::{ArtifactWriter, WriteSummary};
