use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntrospectionError>;

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid introspection result: {0}")]
    InvalidSchema(String),
}
