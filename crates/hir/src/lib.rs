//! # GraphQL HIR
//!
//! Structural views over parsed GraphQL documents: the type definitions a
//! schema declares and the operations and fragments an executable document
//! declares. Source locations are kept as byte ranges plus the logical name of
//! the document they came from.

mod structure;

pub use structure::{
    collect_spreads, extract_executable, extract_type_definitions, extract_type_ref, ArgumentDef,
    DirectiveArgument, DirectiveUsage, EnumValue, ExecutableStructure, FieldSignature,
    FragmentStructure, OperationStructure, OperationType, RootOperation, TypeDef,
    TypeDefinitions, TypeDefKind, TypeRef, VariableSignature,
};

use apollo_compiler::ast;
use graphql_types::{LogicalName, OffsetRange};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Scalars every schema has without declaring them.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Every type of a schema, with extensions folded into their base types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTypes {
    types: BTreeMap<Arc<str>, TypeDef>,
    roots: BTreeMap<OperationType, Arc<str>>,
}

impl SchemaTypes {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Look up a field declared on an object, interface or input type.
    #[must_use]
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldSignature> {
        self.get(type_name)?
            .fields
            .iter()
            .find(|f| f.name.as_ref() == field_name)
    }

    /// Name of the root type for an operation type, if the schema has one.
    #[must_use]
    pub fn root_type(&self, operation_type: OperationType) -> Option<&str> {
        self.roots.get(&operation_type).map(AsRef::as_ref)
    }

    /// Object types a value of `name` can have at runtime. Empty for unknown
    /// and non-composite types.
    #[must_use]
    pub fn possible_types(&self, name: &str) -> BTreeSet<&str> {
        let Some(def) = self.get(name) else {
            return BTreeSet::new();
        };
        match def.kind {
            TypeDefKind::Object => BTreeSet::from([def.name.as_ref()]),
            TypeDefKind::Interface => self
                .types
                .values()
                .filter(|candidate| {
                    candidate.kind == TypeDefKind::Object
                        && candidate.implements.iter().any(|i| i.as_ref() == name)
                })
                .map(|candidate| candidate.name.as_ref())
                .collect(),
            TypeDefKind::Union => def
                .union_members
                .iter()
                .filter(|member| {
                    self.get(member)
                        .is_some_and(|m| m.kind == TypeDefKind::Object)
                })
                .map(AsRef::as_ref)
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Types in name order, built-in scalars included.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Names of all types, for "did you mean" suggestions.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Problems found while folding schema documents together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A type name is defined more than once.
    DuplicateType,
    /// `extend` targets a type no document defines.
    UnknownExtension,
    /// An extension's kind differs from its base type's kind.
    ExtensionKindMismatch,
    /// Two `schema` blocks name a root for the same operation type.
    DuplicateRootOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConflict {
    pub kind: ConflictKind,
    pub name: Arc<str>,
    pub origin: Option<LogicalName>,
    pub range: Option<OffsetRange>,
}

impl SchemaConflict {
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            ConflictKind::DuplicateType => format!("Type '{}' is defined more than once", self.name),
            ConflictKind::UnknownExtension => {
                format!("Cannot extend type '{}' because it is not defined", self.name)
            }
            ConflictKind::ExtensionKindMismatch => {
                format!("Extension of '{}' does not match the kind of its definition", self.name)
            }
            ConflictKind::DuplicateRootOperation => {
                format!("Root operation type '{}' is declared more than once", self.name)
            }
        }
    }
}

/// Fold the type definitions of several schema documents into one
/// [`SchemaTypes`].
///
/// Definitions are collected before extensions are applied, so the order of
/// the documents does not decide whether an extension finds its base type.
#[tracing::instrument(skip_all)]
pub fn collect_schema_types<'a, I>(documents: I) -> (SchemaTypes, Vec<SchemaConflict>)
where
    I: IntoIterator<Item = (&'a LogicalName, &'a ast::Document)>,
{
    let mut types: BTreeMap<Arc<str>, TypeDef> = BTreeMap::new();
    let mut roots: BTreeMap<OperationType, Arc<str>> = BTreeMap::new();
    let mut extensions = Vec::new();
    let mut conflicts = Vec::new();

    for (origin, document) in documents {
        let definitions = extract_type_definitions(document, origin);

        for type_def in definitions.types {
            if type_def.is_extension {
                extensions.push(type_def);
            } else if types.contains_key(&type_def.name) {
                conflicts.push(SchemaConflict {
                    kind: ConflictKind::DuplicateType,
                    name: type_def.name.clone(),
                    origin: type_def.origin.clone(),
                    range: type_def.name_range,
                });
            } else {
                types.insert(type_def.name.clone(), type_def);
            }
        }

        for root in definitions.roots {
            if roots.contains_key(&root.operation_type) {
                conflicts.push(SchemaConflict {
                    kind: ConflictKind::DuplicateRootOperation,
                    name: Arc::from(root.operation_type.keyword()),
                    origin: Some(root.origin),
                    range: root.range,
                });
            } else {
                roots.insert(root.operation_type, root.type_name);
            }
        }
    }

    for ext in extensions {
        let Some(base) = types.get_mut(&ext.name) else {
            conflicts.push(SchemaConflict {
                kind: ConflictKind::UnknownExtension,
                name: ext.name.clone(),
                origin: ext.origin.clone(),
                range: ext.name_range,
            });
            continue;
        };
        if base.kind != ext.kind {
            conflicts.push(SchemaConflict {
                kind: ConflictKind::ExtensionKindMismatch,
                name: ext.name.clone(),
                origin: ext.origin.clone(),
                range: ext.name_range,
            });
            continue;
        }
        base.fields.extend(ext.fields);
        base.implements.extend(ext.implements);
        base.union_members.extend(ext.union_members);
        base.enum_values.extend(ext.enum_values);
        base.directives.extend(ext.directives);
    }

    for scalar in BUILTIN_SCALARS {
        types
            .entry(Arc::from(scalar))
            .or_insert_with(|| builtin_scalar(scalar));
    }

    // Without a schema block the conventional names apply.
    if roots.is_empty() {
        for operation_type in OperationType::ALL {
            let name = operation_type.default_root_name();
            if types.contains_key(name) {
                roots.insert(operation_type, Arc::from(name));
            }
        }
    }

    tracing::debug!(
        types = types.len(),
        conflicts = conflicts.len(),
        "Collected schema types"
    );

    (SchemaTypes { types, roots }, conflicts)
}

fn builtin_scalar(name: &str) -> TypeDef {
    TypeDef {
        name: Arc::from(name),
        kind: TypeDefKind::Scalar,
        fields: Vec::new(),
        implements: Vec::new(),
        union_members: Vec::new(),
        enum_values: Vec::new(),
        description: None,
        directives: Vec::new(),
        origin: None,
        name_range: None,
        definition_range: None,
        is_extension: false,
    }
}
