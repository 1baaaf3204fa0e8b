use apollo_compiler::ast;
use apollo_compiler::Node;
use graphql_syntax::{name_range, node_range};
use graphql_types::{LogicalName, OffsetRange};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Structure of a type definition (no field bodies)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: Arc<str>,
    pub kind: TypeDefKind,
    pub fields: Vec<FieldSignature>,
    pub implements: Vec<Arc<str>>,
    pub union_members: Vec<Arc<str>>,
    pub enum_values: Vec<EnumValue>,
    pub description: Option<Arc<str>>,
    pub directives: Vec<DirectiveUsage>,
    /// Document that defined the type. `None` for built-in scalars.
    pub origin: Option<LogicalName>,
    /// The byte range of the type name
    pub name_range: Option<OffsetRange>,
    /// The byte range of the entire type definition
    pub definition_range: Option<OffsetRange>,
    /// Whether this type was extracted from a type extension (extend type)
    pub is_extension: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDefKind {
    Object,
    Interface,
    Union,
    Enum,
    Scalar,
    InputObject,
}

impl TypeDefKind {
    /// Types whose fields can be selected.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Object | Self::Interface | Self::Union)
    }

    /// Types allowed as argument and variable types.
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Scalar | Self::Enum | Self::InputObject)
    }
}

impl std::fmt::Display for TypeDefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Object => "object",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::Scalar => "scalar",
            Self::InputObject => "input object",
        };
        f.write_str(s)
    }
}

/// Signature of a field (no resolver, no body)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSignature {
    pub name: Arc<str>,
    pub type_ref: TypeRef,
    pub arguments: Vec<ArgumentDef>,
    pub description: Option<Arc<str>>,
    pub is_deprecated: bool,
    pub deprecation_reason: Option<Arc<str>>,
    pub directives: Vec<DirectiveUsage>,
    pub name_range: Option<OffsetRange>,
    /// Extension fields can live in a different document than their type.
    pub origin: Option<LogicalName>,
}

/// Reference to a type (with list/non-null wrappers)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: Arc<str>,
    pub is_list: bool,
    pub is_non_null: bool,
    pub inner_non_null: bool,
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_list {
            write!(f, "[{}", self.name)?;
            if self.inner_non_null {
                f.write_str("!")?;
            }
            f.write_str("]")?;
        } else {
            f.write_str(&self.name)?;
        }
        if self.is_non_null {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// Argument definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDef {
    pub name: Arc<str>,
    pub type_ref: TypeRef,
    pub default_value: Option<Arc<str>>,
    pub description: Option<Arc<str>>,
    pub name_range: Option<OffsetRange>,
}

/// Enum value definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: Arc<str>,
    pub description: Option<Arc<str>>,
    pub is_deprecated: bool,
    pub deprecation_reason: Option<Arc<str>>,
}

/// A directive applied to a schema element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveUsage {
    pub name: Arc<str>,
    pub arguments: Vec<DirectiveArgument>,
}

/// An argument passed to a directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveArgument {
    pub name: Arc<str>,
    /// Serialized value (e.g. `"hello"`, `true`, `ENUM_VALUE`)
    pub value: Arc<str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    pub const ALL: [Self; 3] = [Self::Query, Self::Mutation, Self::Subscription];

    /// The keyword used in GraphQL source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }

    /// Root type name used when the schema has no `schema { ... }` block.
    #[must_use]
    pub const fn default_root_name(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
            Self::Subscription => "Subscription",
        }
    }
}

impl From<ast::OperationType> for OperationType {
    fn from(ty: ast::OperationType) -> Self {
        match ty {
            ast::OperationType::Query => Self::Query,
            ast::OperationType::Mutation => Self::Mutation,
            ast::OperationType::Subscription => Self::Subscription,
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A `schema { query: ... }` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootOperation {
    pub operation_type: OperationType,
    pub type_name: Arc<str>,
    pub origin: LogicalName,
    pub range: Option<OffsetRange>,
}

/// Type-system content of one schema document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDefinitions {
    pub types: Vec<TypeDef>,
    pub roots: Vec<RootOperation>,
}

/// Operation structure (name, variables and fragments it spreads)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStructure {
    pub name: Option<Arc<str>>,
    pub operation_type: OperationType,
    pub variables: Vec<VariableSignature>,
    /// Fragments spread directly by this operation, at any depth of its
    /// selection set.
    pub fragment_spreads: BTreeSet<Arc<str>>,
    /// Position among the operations of its document
    pub index: usize,
    pub name_range: Option<OffsetRange>,
    pub operation_range: Option<OffsetRange>,
}

/// Variable signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSignature {
    pub name: Arc<str>,
    pub type_ref: TypeRef,
    pub default_value: Option<Arc<str>>,
    pub name_range: Option<OffsetRange>,
}

/// Fragment structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentStructure {
    pub name: Arc<str>,
    pub type_condition: Arc<str>,
    pub fragment_spreads: BTreeSet<Arc<str>>,
    pub name_range: Option<OffsetRange>,
    pub fragment_range: Option<OffsetRange>,
}

/// Executable content of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutableStructure {
    pub operations: Vec<OperationStructure>,
    pub fragments: Vec<FragmentStructure>,
}

/// Extract type definitions, type extensions and root operation entries.
///
/// Extensions are returned as separate `TypeDef`s with `is_extension` set;
/// merging them onto their base type happens in [`crate::collect_schema_types`].
#[must_use]
pub fn extract_type_definitions(document: &ast::Document, origin: &LogicalName) -> TypeDefinitions {
    let mut out = TypeDefinitions::default();

    for definition in &document.definitions {
        match definition {
            ast::Definition::ObjectTypeDefinition(obj) => {
                let mut def = new_type_def(&obj.name, TypeDefKind::Object, origin, obj);
                def.fields = extract_fields(&obj.fields, origin);
                def.implements = names(&obj.implements_interfaces);
                def.description = description(obj.description.as_ref());
                def.directives = extract_directives(&obj.directives);
                out.types.push(def);
            }
            ast::Definition::InterfaceTypeDefinition(iface) => {
                let mut def = new_type_def(&iface.name, TypeDefKind::Interface, origin, iface);
                def.fields = extract_fields(&iface.fields, origin);
                def.implements = names(&iface.implements_interfaces);
                def.description = description(iface.description.as_ref());
                def.directives = extract_directives(&iface.directives);
                out.types.push(def);
            }
            ast::Definition::UnionTypeDefinition(union) => {
                let mut def = new_type_def(&union.name, TypeDefKind::Union, origin, union);
                def.union_members = names(&union.members);
                def.description = description(union.description.as_ref());
                def.directives = extract_directives(&union.directives);
                out.types.push(def);
            }
            ast::Definition::EnumTypeDefinition(enum_def) => {
                let mut def = new_type_def(&enum_def.name, TypeDefKind::Enum, origin, enum_def);
                def.enum_values = extract_enum_values(&enum_def.values);
                def.description = description(enum_def.description.as_ref());
                def.directives = extract_directives(&enum_def.directives);
                out.types.push(def);
            }
            ast::Definition::ScalarTypeDefinition(scalar) => {
                let mut def = new_type_def(&scalar.name, TypeDefKind::Scalar, origin, scalar);
                def.description = description(scalar.description.as_ref());
                def.directives = extract_directives(&scalar.directives);
                out.types.push(def);
            }
            ast::Definition::InputObjectTypeDefinition(input) => {
                let mut def = new_type_def(&input.name, TypeDefKind::InputObject, origin, input);
                def.fields = extract_input_fields(&input.fields, origin);
                def.description = description(input.description.as_ref());
                def.directives = extract_directives(&input.directives);
                out.types.push(def);
            }
            ast::Definition::ObjectTypeExtension(ext) => {
                let mut def = new_type_def(&ext.name, TypeDefKind::Object, origin, ext);
                def.fields = extract_fields(&ext.fields, origin);
                def.implements = names(&ext.implements_interfaces);
                def.directives = extract_directives(&ext.directives);
                def.is_extension = true;
                out.types.push(def);
            }
            ast::Definition::InterfaceTypeExtension(ext) => {
                let mut def = new_type_def(&ext.name, TypeDefKind::Interface, origin, ext);
                def.fields = extract_fields(&ext.fields, origin);
                def.implements = names(&ext.implements_interfaces);
                def.directives = extract_directives(&ext.directives);
                def.is_extension = true;
                out.types.push(def);
            }
            ast::Definition::UnionTypeExtension(ext) => {
                let mut def = new_type_def(&ext.name, TypeDefKind::Union, origin, ext);
                def.union_members = names(&ext.members);
                def.directives = extract_directives(&ext.directives);
                def.is_extension = true;
                out.types.push(def);
            }
            ast::Definition::EnumTypeExtension(ext) => {
                let mut def = new_type_def(&ext.name, TypeDefKind::Enum, origin, ext);
                def.enum_values = extract_enum_values(&ext.values);
                def.directives = extract_directives(&ext.directives);
                def.is_extension = true;
                out.types.push(def);
            }
            ast::Definition::ScalarTypeExtension(ext) => {
                let mut def = new_type_def(&ext.name, TypeDefKind::Scalar, origin, ext);
                def.directives = extract_directives(&ext.directives);
                def.is_extension = true;
                out.types.push(def);
            }
            ast::Definition::InputObjectTypeExtension(ext) => {
                let mut def = new_type_def(&ext.name, TypeDefKind::InputObject, origin, ext);
                def.fields = extract_input_fields(&ext.fields, origin);
                def.directives = extract_directives(&ext.directives);
                def.is_extension = true;
                out.types.push(def);
            }
            ast::Definition::SchemaDefinition(schema) => {
                out.roots
                    .extend(extract_roots(&schema.root_operations, origin));
            }
            ast::Definition::SchemaExtension(ext) => {
                out.roots.extend(extract_roots(&ext.root_operations, origin));
            }
            ast::Definition::DirectiveDefinition(_)
            | ast::Definition::OperationDefinition(_)
            | ast::Definition::FragmentDefinition(_) => {}
        }
    }

    out
}

/// Extract operations and fragments with the fragments each one spreads.
#[must_use]
pub fn extract_executable(document: &ast::Document) -> ExecutableStructure {
    let mut out = ExecutableStructure::default();

    for definition in &document.definitions {
        match definition {
            ast::Definition::OperationDefinition(op) => {
                let mut fragment_spreads = BTreeSet::new();
                collect_spreads(&op.selection_set, &mut fragment_spreads);

                out.operations.push(OperationStructure {
                    name: op.name.as_ref().map(|n| Arc::from(n.as_str())),
                    operation_type: op.operation_type.into(),
                    variables: op
                        .variables
                        .iter()
                        .map(|var| VariableSignature {
                            name: Arc::from(var.name.as_str()),
                            type_ref: extract_type_ref(&var.ty),
                            default_value: var
                                .default_value
                                .as_ref()
                                .map(|v| Arc::from(v.to_string().as_str())),
                            name_range: name_range(&var.name),
                        })
                        .collect(),
                    fragment_spreads,
                    index: out.operations.len(),
                    name_range: op.name.as_ref().and_then(name_range),
                    operation_range: node_range(op),
                });
            }
            ast::Definition::FragmentDefinition(frag) => {
                let mut fragment_spreads = BTreeSet::new();
                collect_spreads(&frag.selection_set, &mut fragment_spreads);

                out.fragments.push(FragmentStructure {
                    name: Arc::from(frag.name.as_str()),
                    type_condition: Arc::from(frag.type_condition.as_str()),
                    fragment_spreads,
                    name_range: name_range(&frag.name),
                    fragment_range: node_range(frag),
                });
            }
            _ => {}
        }
    }

    out
}

/// Collect fragment spread names from a selection set, recursing through
/// fields and inline fragments. Spreads inside the spread fragments are not
/// followed.
pub fn collect_spreads(selections: &[ast::Selection], used: &mut BTreeSet<Arc<str>>) {
    for selection in selections {
        match selection {
            ast::Selection::Field(field) => collect_spreads(&field.selection_set, used),
            ast::Selection::FragmentSpread(spread) => {
                used.insert(Arc::from(spread.fragment_name.as_str()));
            }
            ast::Selection::InlineFragment(inline) => {
                collect_spreads(&inline.selection_set, used);
            }
        }
    }
}

fn new_type_def<T>(
    name: &apollo_compiler::Name,
    kind: TypeDefKind,
    origin: &LogicalName,
    node: &Node<T>,
) -> TypeDef {
    TypeDef {
        name: Arc::from(name.as_str()),
        kind,
        fields: Vec::new(),
        implements: Vec::new(),
        union_members: Vec::new(),
        enum_values: Vec::new(),
        description: None,
        directives: Vec::new(),
        origin: Some(origin.clone()),
        name_range: name_range(name),
        definition_range: node_range(node),
        is_extension: false,
    }
}

fn names(list: &[apollo_compiler::Name]) -> Vec<Arc<str>> {
    list.iter().map(|n| Arc::from(n.as_str())).collect()
}

fn description(description: Option<&Node<str>>) -> Option<Arc<str>> {
    description.map(|d| Arc::from(&**d))
}

fn extract_roots<'a>(
    roots: &'a [Node<(ast::OperationType, ast::NamedType)>],
    origin: &'a LogicalName,
) -> impl Iterator<Item = RootOperation> + 'a {
    roots.iter().map(move |root| {
        let (operation_type, type_name) = &**root;
        RootOperation {
            operation_type: (*operation_type).into(),
            type_name: Arc::from(type_name.as_str()),
            origin: origin.clone(),
            range: node_range(root),
        }
    })
}

fn extract_fields(
    fields: &[Node<ast::FieldDefinition>],
    origin: &LogicalName,
) -> Vec<FieldSignature> {
    fields
        .iter()
        .map(|field| {
            let (is_deprecated, deprecation_reason) = extract_deprecation(&field.directives);
            FieldSignature {
                name: Arc::from(field.name.as_str()),
                type_ref: extract_type_ref(&field.ty),
                arguments: field.arguments.iter().map(|a| extract_argument_def(a)).collect(),
                description: description(field.description.as_ref()),
                is_deprecated,
                deprecation_reason,
                directives: extract_directives(&field.directives),
                name_range: name_range(&field.name),
                origin: Some(origin.clone()),
            }
        })
        .collect()
}

fn extract_input_fields(
    fields: &[Node<ast::InputValueDefinition>],
    origin: &LogicalName,
) -> Vec<FieldSignature> {
    fields
        .iter()
        .map(|field| {
            let (is_deprecated, deprecation_reason) = extract_deprecation(&field.directives);
            FieldSignature {
                name: Arc::from(field.name.as_str()),
                type_ref: extract_type_ref(&field.ty),
                arguments: Vec::new(),
                description: description(field.description.as_ref()),
                is_deprecated,
                deprecation_reason,
                directives: extract_directives(&field.directives),
                name_range: name_range(&field.name),
                origin: Some(origin.clone()),
            }
        })
        .collect()
}

fn extract_argument_def(arg: &ast::InputValueDefinition) -> ArgumentDef {
    ArgumentDef {
        name: Arc::from(arg.name.as_str()),
        type_ref: extract_type_ref(&arg.ty),
        default_value: arg
            .default_value
            .as_ref()
            .map(|v| Arc::from(v.to_string().as_str())),
        description: description(arg.description.as_ref()),
        name_range: name_range(&arg.name),
    }
}

fn extract_enum_values(values: &[Node<ast::EnumValueDefinition>]) -> Vec<EnumValue> {
    values
        .iter()
        .map(|value| {
            let (is_deprecated, deprecation_reason) = extract_deprecation(&value.directives);
            EnumValue {
                name: Arc::from(value.value.as_str()),
                description: description(value.description.as_ref()),
                is_deprecated,
                deprecation_reason,
            }
        })
        .collect()
}

fn extract_deprecation(directives: &ast::DirectiveList) -> (bool, Option<Arc<str>>) {
    for directive in directives {
        if directive.name == "deprecated" {
            let reason = directive.arguments.iter().find_map(|arg| {
                if arg.name == "reason" {
                    if let ast::Value::String(s) = &*arg.value {
                        Some(Arc::from(s.as_str()))
                    } else {
                        None
                    }
                } else {
                    None
                }
            });
            return (true, reason);
        }
    }
    (false, None)
}

fn extract_directives(directives: &ast::DirectiveList) -> Vec<DirectiveUsage> {
    directives
        .iter()
        .map(|directive| DirectiveUsage {
            name: Arc::from(directive.name.as_str()),
            arguments: directive
                .arguments
                .iter()
                .map(|arg| DirectiveArgument {
                    name: Arc::from(arg.name.as_str()),
                    value: Arc::from(arg.value.to_string().as_str()),
                })
                .collect(),
        })
        .collect()
}

/// Convert an AST type into a [`TypeRef`].
#[must_use]
pub fn extract_type_ref(ty: &ast::Type) -> TypeRef {
    let name = Arc::from(ty.inner_named_type().as_str());

    match ty {
        ast::Type::Named(_) => TypeRef {
            name,
            is_list: false,
            is_non_null: false,
            inner_non_null: false,
        },
        ast::Type::NonNullNamed(_) => TypeRef {
            name,
            is_list: false,
            is_non_null: true,
            inner_non_null: false,
        },
        ast::Type::List(inner) => TypeRef {
            name,
            is_list: true,
            is_non_null: false,
            inner_non_null: inner.is_non_null(),
        },
        ast::Type::NonNullList(inner) => TypeRef {
            name,
            is_list: true,
            is_non_null: true,
            inner_non_null: inner.is_non_null(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ast::Document {
        graphql_syntax::parse_graphql(src, "test.graphql").unwrap()
    }

    #[test]
    fn test_type_ref_display() {
        let doc = parse("type T { a: [String!]!, b: Int, c: [ID] }");
        let defs = extract_type_definitions(&doc, &LogicalName::new("schema.graphqls"));
        let fields = &defs.types[0].fields;
        assert_eq!(fields[0].type_ref.to_string(), "[String!]!");
        assert_eq!(fields[1].type_ref.to_string(), "Int");
        assert_eq!(fields[2].type_ref.to_string(), "[ID]");
    }

    #[test]
    fn test_extension_is_flagged() {
        let doc = parse("extend type Query { extra: String }");
        let defs = extract_type_definitions(&doc, &LogicalName::new("ext.graphqls"));
        assert_eq!(defs.types.len(), 1);
        assert!(defs.types[0].is_extension);
        assert_eq!(defs.types[0].fields[0].name.as_ref(), "extra");
    }

    #[test]
    fn test_schema_definition_roots() {
        let doc = parse("schema { query: Root mutation: Change } type Root { a: Int }");
        let defs = extract_type_definitions(&doc, &LogicalName::new("schema.graphqls"));
        assert_eq!(defs.roots.len(), 2);
        assert_eq!(defs.roots[0].operation_type, OperationType::Query);
        assert_eq!(defs.roots[0].type_name.as_ref(), "Root");
        assert_eq!(defs.roots[1].operation_type, OperationType::Mutation);
    }

    #[test]
    fn test_deprecation_reason() {
        let doc = parse(r#"type T { old: Int @deprecated(reason: "gone") }"#);
        let defs = extract_type_definitions(&doc, &LogicalName::new("schema.graphqls"));
        let field = &defs.types[0].fields[0];
        assert!(field.is_deprecated);
        assert_eq!(field.deprecation_reason.as_deref(), Some("gone"));
    }

    #[test]
    fn test_nested_spreads_are_collected() {
        let doc = parse(
            "query Q { a { ...A ... on B { ...C } } } fragment A on T { ...D }",
        );
        let structure = extract_executable(&doc);

        let op_spreads: Vec<_> = structure.operations[0]
            .fragment_spreads
            .iter()
            .map(AsRef::as_ref)
            .collect();
        assert_eq!(op_spreads, vec!["A", "C"]);

        let frag = &structure.fragments[0];
        assert_eq!(frag.type_condition.as_ref(), "T");
        assert!(frag.fragment_spreads.contains("D"));
    }

    #[test]
    fn test_anonymous_operation_has_no_name() {
        let doc = parse("{ a }");
        let structure = extract_executable(&doc);
        assert_eq!(structure.operations.len(), 1);
        assert!(structure.operations[0].name.is_none());
        assert_eq!(structure.operations[0].operation_type, OperationType::Query);
    }

    #[test]
    fn test_ranges_point_into_source() {
        let src = "query Hero { hero }";
        let doc = parse(src);
        let structure = extract_executable(&doc);
        let op = &structure.operations[0];
        let name = op.name_range.unwrap();
        assert_eq!(&src[name.start..name.end], "Hero");
        let whole = op.operation_range.unwrap();
        assert_eq!(&src[whole.start..whole.end], src);
    }
}
