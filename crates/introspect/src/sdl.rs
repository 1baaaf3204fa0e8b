//! SDL rendering of decoded introspection results.

use crate::types::{
    IntrospectionField, IntrospectionInputValue, IntrospectionSchema, IntrospectionType,
    IntrospectionTypeRef,
};
use std::fmt::{self, Write};

/// Built-in GraphQL scalar types that are implicit in SDL.
const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

/// Directives every GraphQL schema defines implicitly.
const BUILTIN_DIRECTIVES: &[&str] = &["skip", "include", "deprecated", "specifiedBy", "oneOf"];

/// Render an introspection result as SDL.
///
/// Built-in scalars, built-in directives and `__`-prefixed introspection types
/// are omitted. A `schema { ... }` block is written only when a root type
/// does not use its conventional name. Type order follows the input.
#[must_use]
#[tracing::instrument(skip(schema), fields(
    types = schema.types.len(),
    directives = schema.directives.len()
))]
pub fn introspection_to_sdl(schema: &IntrospectionSchema) -> String {
    let mut sdl = String::new();
    // Writing into a String cannot fail.
    let _ = write_schema(&mut sdl, schema);
    tracing::debug!(sdl_length = sdl.len(), "SDL generation complete");
    sdl.trim_end().to_string()
}

fn write_schema(sdl: &mut String, schema: &IntrospectionSchema) -> fmt::Result {
    let is_renamed = |root: Option<&IntrospectionTypeRef>, conventional: &str| {
        root.is_some_and(|t| t.name != conventional)
    };
    let needs_schema_def = is_renamed(schema.query_type.as_ref(), "Query")
        || is_renamed(schema.mutation_type.as_ref(), "Mutation")
        || is_renamed(schema.subscription_type.as_ref(), "Subscription");

    if needs_schema_def {
        sdl.push_str("schema {\n");
        if let Some(query) = &schema.query_type {
            writeln!(sdl, "  query: {}", query.name)?;
        }
        if let Some(mutation) = &schema.mutation_type {
            writeln!(sdl, "  mutation: {}", mutation.name)?;
        }
        if let Some(subscription) = &schema.subscription_type {
            writeln!(sdl, "  subscription: {}", subscription.name)?;
        }
        sdl.push_str("}\n\n");
    }

    for directive in &schema.directives {
        if BUILTIN_DIRECTIVES.contains(&directive.name.as_str()) {
            continue;
        }
        write_description(sdl, directive.description.as_deref(), 0)?;
        write!(sdl, "directive @{}", directive.name)?;
        write_arguments(sdl, &directive.args)?;
        writeln!(sdl, " on {}\n", directive.locations.join(" | "))?;
    }

    for type_def in &schema.types {
        let name = type_def.name();
        if name.starts_with("__") || BUILTIN_SCALARS.contains(&name) {
            continue;
        }
        write_type(sdl, type_def)?;
        sdl.push_str("\n\n");
    }

    Ok(())
}

fn write_type(sdl: &mut String, type_def: &IntrospectionType) -> fmt::Result {
    match type_def {
        IntrospectionType::Scalar(t) => {
            write_description(sdl, t.description.as_deref(), 0)?;
            write!(sdl, "scalar {}", t.name)
        }
        IntrospectionType::Object(t) => {
            write_description(sdl, t.description.as_deref(), 0)?;
            write!(sdl, "type {}", t.name)?;
            write_implements(sdl, &t.interfaces);
            write_fields(sdl, &t.fields)
        }
        IntrospectionType::Interface(t) => {
            write_description(sdl, t.description.as_deref(), 0)?;
            write!(sdl, "interface {}", t.name)?;
            write_implements(sdl, t.interfaces.as_deref().unwrap_or_default());
            write_fields(sdl, &t.fields)
        }
        IntrospectionType::Union(t) => {
            write_description(sdl, t.description.as_deref(), 0)?;
            let members: Vec<&str> = t.possible_types.iter().map(|m| m.name.as_str()).collect();
            write!(sdl, "union {} = {}", t.name, members.join(" | "))
        }
        IntrospectionType::Enum(t) => {
            write_description(sdl, t.description.as_deref(), 0)?;
            writeln!(sdl, "enum {} {{", t.name)?;
            for value in &t.enum_values {
                write_description(sdl, value.description.as_deref(), 1)?;
                write!(sdl, "  {}", value.name)?;
                if value.is_deprecated {
                    write_deprecated(sdl, value.deprecation_reason.as_deref())?;
                }
                sdl.push('\n');
            }
            sdl.push('}');
            Ok(())
        }
        IntrospectionType::InputObject(t) => {
            write_description(sdl, t.description.as_deref(), 0)?;
            writeln!(sdl, "input {} {{", t.name)?;
            for field in &t.input_fields {
                write_description(sdl, field.description.as_deref(), 1)?;
                sdl.push_str("  ");
                write_input_value(sdl, field)?;
                sdl.push('\n');
            }
            sdl.push('}');
            Ok(())
        }
    }
}

fn write_implements(sdl: &mut String, interfaces: &[IntrospectionTypeRef]) {
    if interfaces.is_empty() {
        return;
    }
    let names: Vec<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
    sdl.push_str(" implements ");
    sdl.push_str(&names.join(" & "));
}

fn write_fields(sdl: &mut String, fields: &[IntrospectionField]) -> fmt::Result {
    sdl.push_str(" {\n");
    for field in fields {
        write_description(sdl, field.description.as_deref(), 1)?;
        write!(sdl, "  {}", field.name)?;
        write_arguments(sdl, &field.args)?;
        write!(sdl, ": {}", field.type_ref)?;
        if field.is_deprecated {
            write_deprecated(sdl, field.deprecation_reason.as_deref())?;
        }
        sdl.push('\n');
    }
    sdl.push('}');
    Ok(())
}

fn write_arguments(sdl: &mut String, args: &[IntrospectionInputValue]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    sdl.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            sdl.push_str(", ");
        }
        write_input_value(sdl, arg)?;
    }
    sdl.push(')');
    Ok(())
}

fn write_input_value(sdl: &mut String, value: &IntrospectionInputValue) -> fmt::Result {
    write!(sdl, "{}: {}", value.name, value.type_ref)?;
    if let Some(default) = &value.default_value {
        write!(sdl, " = {default}")?;
    }
    Ok(())
}

fn write_deprecated(sdl: &mut String, reason: Option<&str>) -> fmt::Result {
    match reason {
        Some(reason) => write!(sdl, " @deprecated(reason: \"{}\")", escape_string(reason)),
        None => {
            sdl.push_str(" @deprecated");
            Ok(())
        }
    }
}

fn write_description(sdl: &mut String, description: Option<&str>, indent: usize) -> fmt::Result {
    let Some(desc) = description else {
        return Ok(());
    };
    let indent_str = "  ".repeat(indent);
    if desc.contains('\n') {
        writeln!(sdl, "{indent_str}\"\"\"\n{desc}\n{indent_str}\"\"\"")
    } else {
        writeln!(sdl, "{indent_str}\"{}\"", escape_string(desc))
    }
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
