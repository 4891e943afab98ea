//! JSON schema-file format and its compiler.
//!
//! A schema file is a JSON document declaring named types:
//!
//! ```json
//! {
//!     "name": "geo",
//!     "types": {
//!         "Point": {
//!             "type": "Struct",
//!             "fields": [
//!                 {"name": "x", "spec": {"type": "Real"}},
//!                 {"name": "y", "spec": {"type": "Real"}}
//!             ]
//!         },
//!         "Path": {
//!             "type": "Sequence",
//!             "element": {"type": "Ref", "target": "Point"},
//!             "min_size": 2
//!         }
//!     }
//! }
//! ```
//!
//! Every constructor of the type hierarchy has a spec form, tagged by
//! `type`. Integer enumerations are arrays of `[name, value]` pairs so
//! declaration order survives the trip. `Ref` targets without a dot are
//! qualified against the file being loaded; the current schema name is an
//! explicit parameter of compilation, never ambient state.
//!
//! A [`JsonSchemaSource`] holds the JSON documents for a set of schemas,
//! optionally with a companion [`ScalarTable`] per schema (the custom
//! scalar types visible while that schema's types are compiled). `Class`
//! specs resolve against the companion table first, then process-wide
//! registrations.

use crate::error::UnknownSchemaError;
use crate::schema::class::{ClassType, CustomScalar, ScalarTable};
use crate::schema::collections::{SequenceType, SetType, TupleType};
use crate::schema::mapping::MappingType;
use crate::schema::primitives::{BooleanType, IntegerType, RealType, StringType};
use crate::schema::reference::NamedType;
use crate::schema::registry::{SchemaFile, SchemaRegistry, SchemaSource};
use crate::schema::structure::StructType;
use crate::schema::types::ArcType;
use crate::schema::union::{DeprecatedType, OptionalType, OrType};
use crate::value::Value;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Serialized form of one type declaration.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum TypeSpec {
    Boolean {
        #[serde(default)]
        default: Option<bool>,
    },
    Integer {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
        #[serde(rename = "enum", default)]
        enumeration: Option<Vec<(String, i64)>>,
        #[serde(default)]
        default: Option<i64>,
    },
    Real {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        default: Option<f64>,
    },
    String {
        #[serde(default)]
        choices: Option<Vec<String>>,
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        strict: bool,
        #[serde(default)]
        default: Option<String>,
    },
    Sequence {
        element: Box<TypeSpec>,
        #[serde(default)]
        size: Option<usize>,
        #[serde(default)]
        min_size: Option<usize>,
        #[serde(default)]
        max_size: Option<usize>,
        #[serde(default)]
        default: Option<Vec<JsonValue>>,
    },
    Tuple {
        elements: Vec<TypeSpec>,
    },
    Set {
        element: Box<TypeSpec>,
    },
    Struct {
        fields: Vec<FieldSpec>,
        #[serde(default)]
        compatible: bool,
    },
    Mapping {
        key: Box<TypeSpec>,
        value: Box<TypeSpec>,
        #[serde(default)]
        overrides: BTreeMap<String, TypeSpec>,
    },
    Class {
        class: String,
    },
    Or {
        alternatives: Vec<TypeSpec>,
    },
    Optional {
        inner: Box<TypeSpec>,
    },
    Deprecated {
        inner: Box<TypeSpec>,
        #[serde(default)]
        message: Option<String>,
    },
    Ref {
        target: String,
    },
}

/// Serialized form of one struct field declaration: exactly one of
/// `spec` (a real field), `alias`, or `deprecated` (forwarding names).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub spec: Option<TypeSpec>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub deprecated: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Serialized form of a whole schema file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFileSpec {
    #[serde(default)]
    name: Option<String>,
    types: BTreeMap<String, TypeSpec>,
}

fn load_failed(schema: &str, message: impl std::fmt::Display) -> UnknownSchemaError {
    UnknownSchemaError::LoadFailed {
        schema: schema.to_string(),
        message: message.to_string(),
    }
}

/// Compile a type spec into a schema type.
///
/// `schema_name` qualifies unqualified `Ref` targets; `resolve_scalar`
/// looks up `Class` names (companion table first, then process-wide
/// registrations).
fn compile(
    spec: &TypeSpec,
    schema_name: &str,
    resolve_scalar: &dyn Fn(&str) -> Option<Arc<dyn CustomScalar>>,
) -> Result<ArcType, UnknownSchemaError> {
    let ty: ArcType = match spec {
        TypeSpec::Boolean { default } => {
            let mut ty = BooleanType::new();
            if let Some(default) = default {
                ty = ty.with_default(*default);
            }
            ty.into_type()
        }
        TypeSpec::Integer {
            min,
            max,
            enumeration,
            default,
        } => {
            let mut ty = IntegerType::new();
            if let Some(min) = min {
                ty = ty.with_min(*min);
            }
            if let Some(max) = max {
                ty = ty.with_max(*max);
            }
            if let Some(pairs) = enumeration {
                ty = ty.with_enum(pairs.iter().map(|(n, v)| (n.clone(), *v)));
            }
            if let Some(default) = default {
                ty = ty.with_default(*default);
            }
            ty.into_type()
        }
        TypeSpec::Real { min, max, default } => {
            let mut ty = RealType::new();
            if let Some(min) = min {
                ty = ty.with_min(*min);
            }
            if let Some(max) = max {
                ty = ty.with_max(*max);
            }
            if let Some(default) = default {
                ty = ty.with_default(*default);
            }
            ty.into_type()
        }
        TypeSpec::String {
            choices,
            pattern,
            strict,
            default,
        } => {
            let mut ty = StringType::new();
            if let Some(choices) = choices {
                ty = ty.with_choices(choices.iter().cloned());
            }
            if let Some(pattern) = pattern {
                ty = ty
                    .with_pattern(pattern)
                    .map_err(|e| load_failed(schema_name, e))?;
            }
            if *strict {
                ty = ty.strict();
            }
            if let Some(default) = default {
                ty = ty.with_default(default.clone());
            }
            ty.into_type()
        }
        TypeSpec::Sequence {
            element,
            size,
            min_size,
            max_size,
            default,
        } => {
            let mut ty = SequenceType::new(compile(element, schema_name, resolve_scalar)?);
            if let Some(size) = size {
                ty = ty.with_exact_size(*size);
            }
            if let Some(min) = min_size {
                ty = ty.with_min_size(*min);
            }
            if let Some(max) = max_size {
                ty = ty.with_max_size(*max);
            }
            if let Some(default) = default {
                ty = ty.with_default(default.iter().map(Value::from_json));
            }
            ty.into_type()
        }
        TypeSpec::Tuple { elements } => {
            let compiled: Result<Vec<_>, _> = elements
                .iter()
                .map(|e| compile(e, schema_name, resolve_scalar))
                .collect();
            TupleType::new(compiled?).into_type()
        }
        TypeSpec::Set { element } => {
            SetType::new(compile(element, schema_name, resolve_scalar)?).into_type()
        }
        TypeSpec::Struct { fields, compatible } => {
            let mut builder = StructType::builder();
            for field in fields {
                builder = match (&field.spec, &field.alias, &field.deprecated) {
                    (Some(spec), None, None) => builder.field(
                        field.name.clone(),
                        compile(spec, schema_name, resolve_scalar)?,
                    ),
                    (None, Some(target), None) => builder.alias(field.name.clone(), target.clone()),
                    (None, None, Some(target)) => match &field.message {
                        Some(message) => builder.deprecated_with_message(
                            field.name.clone(),
                            target.clone(),
                            message.clone(),
                        ),
                        None => builder.deprecated(field.name.clone(), target.clone()),
                    },
                    _ => {
                        return Err(load_failed(
                            schema_name,
                            format!(
                                "field '{}' must declare exactly one of spec/alias/deprecated",
                                field.name
                            ),
                        ));
                    }
                };
            }
            if *compatible {
                builder = builder.compatible();
            }
            let ty = builder.build().map_err(|e| load_failed(schema_name, e))?;
            Arc::new(ty)
        }
        TypeSpec::Mapping {
            key,
            value,
            overrides,
        } => {
            let mut ty = MappingType::new(
                compile(key, schema_name, resolve_scalar)?,
                compile(value, schema_name, resolve_scalar)?,
            );
            for (pinned_key, spec) in overrides {
                ty = ty.with_override(
                    pinned_key.clone(),
                    compile(spec, schema_name, resolve_scalar)?,
                );
            }
            ty.into_type()
        }
        TypeSpec::Class { class } => {
            let scalar = resolve_scalar(class).ok_or_else(|| {
                UnknownSchemaError::ScalarNotRegistered {
                    name: class.clone(),
                }
            })?;
            ClassType::new(scalar).into_type()
        }
        TypeSpec::Or { alternatives } => {
            let compiled: Result<Vec<_>, _> = alternatives
                .iter()
                .map(|a| compile(a, schema_name, resolve_scalar))
                .collect();
            OrType::new(compiled?).into_type()
        }
        TypeSpec::Optional { inner } => {
            OptionalType::new(compile(inner, schema_name, resolve_scalar)?).into_type()
        }
        TypeSpec::Deprecated { inner, message } => {
            let mut ty = DeprecatedType::new(compile(inner, schema_name, resolve_scalar)?);
            if let Some(message) = message {
                ty = ty.with_message(message.clone());
            }
            ty.into_type()
        }
        TypeSpec::Ref { target } => {
            let qualified = if target.contains('.') {
                target.clone()
            } else {
                format!("{schema_name}.{target}")
            };
            NamedType::new(qualified).into_type()
        }
    };
    Ok(ty)
}

/// Schema location backed by JSON schema documents.
#[derive(Debug, Default)]
pub struct JsonSchemaSource {
    documents: BTreeMap<String, String>,
    companions: BTreeMap<String, ScalarTable>,
}

impl JsonSchemaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema's JSON document under its schema name.
    pub fn with_document(mut self, schema: impl Into<String>, json: impl Into<String>) -> Self {
        self.documents.insert(schema.into(), json.into());
        self
    }

    /// Attach the companion scalar table for a schema: custom scalar
    /// types visible only while that schema's types are compiled.
    pub fn with_companion(mut self, schema: impl Into<String>, table: ScalarTable) -> Self {
        self.companions.insert(schema.into(), table);
        self
    }
}

impl SchemaSource for JsonSchemaSource {
    fn provides(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }

    fn load(
        &self,
        schema: &str,
        registry: &SchemaRegistry,
    ) -> Result<SchemaFile, UnknownSchemaError> {
        let json = self
            .documents
            .get(schema)
            .ok_or_else(|| UnknownSchemaError::SchemaNotFound {
                schema: schema.to_string(),
            })?;
        let spec: SchemaFileSpec =
            serde_json::from_str(json).map_err(|e| load_failed(schema, e))?;
        if let Some(declared) = &spec.name {
            if declared != schema {
                return Err(load_failed(
                    schema,
                    format!("document declares schema name '{declared}'"),
                ));
            }
        }
        let companion = self.companions.get(schema);
        let resolve_scalar = |name: &str| -> Option<Arc<dyn CustomScalar>> {
            companion
                .and_then(|table| table.get(name))
                .or_else(|| registry.scalar_for(name))
        };
        let mut builder = SchemaFile::builder(schema);
        for (type_name, type_spec) in &spec.types {
            builder = builder.ty(type_name.clone(), compile(type_spec, schema, &resolve_scalar)?);
        }
        Ok(builder.build())
    }
}
