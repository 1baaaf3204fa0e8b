//! Project configuration for variant-aware GraphQL code generation.
//!
//! A config file declares where source sets live, which build types and
//! flavor dimensions make up the variants, and which services (each with its
//! own schema) partition the GraphQL documents.

mod config;
mod error;
mod loader;

pub use config::{
    FileType, FlavorDimensionConfig, FlavorPrecedence, GraphQLConfig, Patterns, ServiceConfig,
    VariantsConfig, DEFAULT_SERVICE,
};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILES};
