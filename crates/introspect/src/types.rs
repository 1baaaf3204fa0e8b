//! Type definitions for GraphQL introspection results.
//!
//! These mirror the shape of an introspection query response and deserialize
//! with serde. Optional members default so that trimmed, hand-maintained
//! `schema.json` files decode as well as full server responses.

use serde::{Deserialize, Serialize};

/// An introspection result as stored on disk: with or without the `data` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntrospectionDocument {
    Response(IntrospectionResponse),
    Bare(IntrospectionData),
}

impl IntrospectionDocument {
    #[must_use]
    pub fn into_schema(self) -> IntrospectionSchema {
        match self {
            Self::Response(response) => response.data.schema,
            Self::Bare(data) => data.schema,
        }
    }
}

/// Top-level introspection response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    pub data: IntrospectionData,
}

/// Object holding the `__schema` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionData {
    #[serde(rename = "__schema")]
    pub schema: IntrospectionSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    #[serde(default)]
    pub query_type: Option<IntrospectionTypeRef>,
    #[serde(default)]
    pub mutation_type: Option<IntrospectionTypeRef>,
    #[serde(default)]
    pub subscription_type: Option<IntrospectionTypeRef>,
    pub types: Vec<IntrospectionType>,
    #[serde(default)]
    pub directives: Vec<IntrospectionDirective>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionTypeRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IntrospectionType {
    #[serde(rename = "SCALAR")]
    Scalar(IntrospectionScalarType),
    #[serde(rename = "OBJECT")]
    Object(IntrospectionObjectType),
    #[serde(rename = "INTERFACE")]
    Interface(IntrospectionInterfaceType),
    #[serde(rename = "UNION")]
    Union(IntrospectionUnionType),
    #[serde(rename = "ENUM")]
    Enum(IntrospectionEnumType),
    #[serde(rename = "INPUT_OBJECT")]
    InputObject(IntrospectionInputObjectType),
}

impl IntrospectionType {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(t) => &t.name,
            Self::Object(t) => &t.name,
            Self::Interface(t) => &t.name,
            Self::Union(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::InputObject(t) => &t.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionScalarType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionObjectType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<IntrospectionField>,
    #[serde(default)]
    pub interfaces: Vec<IntrospectionTypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInterfaceType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<IntrospectionField>,
    #[serde(default)]
    pub interfaces: Option<Vec<IntrospectionTypeRef>>,
    #[serde(default)]
    pub possible_types: Option<Vec<IntrospectionTypeRef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionUnionType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub possible_types: Vec<IntrospectionTypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEnumType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub enum_values: Vec<IntrospectionEnumValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputObjectType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub input_fields: Vec<IntrospectionInputValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionField {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    pub type_ref: IntrospectionTypeRefFull,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: IntrospectionTypeRefFull,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEnumValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionDirective {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub locations: Vec<String>,
    #[serde(default)]
    pub args: Vec<IntrospectionInputValue>,
}

/// A possibly wrapped type reference (`NON_NULL` / `LIST` nest via `ofType`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionTypeRefFull {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<IntrospectionTypeRefFull>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl IntrospectionTypeRefFull {
    /// Render as a GraphQL type string such as `String`, `[ID!]!`.
    ///
    /// ```
    /// # use graphql_introspect::{IntrospectionTypeRefFull, TypeKind};
    /// let type_ref = IntrospectionTypeRefFull {
    ///     kind: TypeKind::NonNull,
    ///     name: None,
    ///     of_type: Some(Box::new(IntrospectionTypeRefFull {
    ///         kind: TypeKind::Scalar,
    ///         name: Some("String".to_string()),
    ///         of_type: None,
    ///     })),
    /// };
    /// assert_eq!(type_ref.to_type_string(), "String!");
    /// ```
    #[must_use]
    pub fn to_type_string(&self) -> String {
        match self.kind {
            TypeKind::NonNull => self.of_type.as_ref().map_or_else(
                || "!".to_string(),
                |of_type| format!("{}!", of_type.to_type_string()),
            ),
            TypeKind::List => self.of_type.as_ref().map_or_else(
                || "[]".to_string(),
                |of_type| format!("[{}]", of_type.to_type_string()),
            ),
            _ => self.name.clone().unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for IntrospectionTypeRefFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_type_string())
    }
}
