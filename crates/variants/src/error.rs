use thiserror::Error;

/// A variant declaration that cannot produce a well-formed variant set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("At least one build type is required")]
    NoBuildTypes,

    #[error("Flavor dimension '{0}' has no flavors")]
    EmptyDimension(String),

    #[error("'{0}' is not a valid variant dimension value")]
    InvalidName(String),

    #[error("'{0}' is reserved for the shared source set")]
    ReservedName(String),

    #[error("'{0}' is declared more than once")]
    DuplicateName(String),

    #[error("Source set '{name}' is derived twice for variant '{variant}'")]
    SourceSetCollision { variant: String, name: String },

    #[error("Variant name '{0}' is produced by more than one combination")]
    VariantCollision(String),
}
