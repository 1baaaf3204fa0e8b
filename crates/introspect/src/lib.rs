//! Decoding of GraphQL introspection results and conversion to SDL.
//!
//! Schema files may be checked in as the JSON result of an introspection
//! query. This crate decodes that JSON (with or without the `data` envelope)
//! and renders it as SDL so it can be parsed like any other schema document.
//!
//! ```
//! use graphql_introspect::introspection_json_to_sdl;
//!
//! let json = r#"{"__schema": {
//!     "queryType": {"name": "Query"},
//!     "types": [{"kind": "OBJECT", "name": "Query", "fields": [
//!         {"name": "hello", "args": [], "type": {"kind": "SCALAR", "name": "String", "ofType": null}}
//!     ], "interfaces": []}]
//! }}"#;
//! let sdl = introspection_json_to_sdl(json).unwrap();
//! assert!(sdl.contains("type Query"));
//! ```

mod error;
mod sdl;
mod types;

pub use error::{IntrospectionError, Result};
pub use sdl::introspection_to_sdl;
pub use types::*;

/// Decode an introspection result.
///
/// Accepts both `{"data": {"__schema": ...}}` and a bare `{"__schema": ...}`.
#[tracing::instrument(skip(json), fields(size = json.len()))]
pub fn parse_introspection(json: &str) -> Result<IntrospectionSchema> {
    let document: IntrospectionDocument = serde_json::from_str(json)?;
    let schema = document.into_schema();

    if schema.query_type.is_none() {
        return Err(IntrospectionError::InvalidSchema(
            "missing queryType".to_string(),
        ));
    }

    tracing::debug!(types = schema.types.len(), "Decoded introspection result");
    Ok(schema)
}

/// Decode an introspection result and render it as SDL.
pub fn introspection_json_to_sdl(json: &str) -> Result<String> {
    let schema = parse_introspection(json)?;
    Ok(introspection_to_sdl(&schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"__schema": {
        "queryType": {"name": "Query"},
        "mutationType": null,
        "subscriptionType": null,
        "types": [
            {"kind": "OBJECT", "name": "Query", "description": null, "fields": [
                {"name": "hello", "description": null, "args": [], "isDeprecated": false,
                 "deprecationReason": null,
                 "type": {"kind": "SCALAR", "name": "String", "ofType": null}}
            ], "interfaces": []},
            {"kind": "SCALAR", "name": "String", "description": null}
        ],
        "directives": []
    }}"#;

    #[test]
    fn test_parse_bare_schema() {
        let schema = parse_introspection(MINIMAL).unwrap();
        assert_eq!(schema.types.len(), 2);
        assert_eq!(schema.query_type.unwrap().name, "Query");
    }

    #[test]
    fn test_parse_data_envelope() {
        let json = format!(r#"{{"data": {MINIMAL}}}"#);
        let schema = parse_introspection(&json).unwrap();
        assert_eq!(schema.types.len(), 2);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = parse_introspection("This is an invalid schema").unwrap_err();
        assert!(matches!(err, IntrospectionError::Json(_)));
    }

    #[test]
    fn test_missing_query_type_is_error() {
        let err = parse_introspection(r#"{"__schema": {"types": []}}"#).unwrap_err();
        assert!(matches!(err, IntrospectionError::InvalidSchema(_)));
        assert!(err.to_string().contains("missing queryType"));
    }

    #[test]
    fn test_json_to_sdl() {
        let sdl = introspection_json_to_sdl(MINIMAL).unwrap();
        assert_eq!(sdl, "type Query {\n  hello: String\n}");
    }
}
