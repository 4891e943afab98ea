//! Struct schema type: a named-field record with aliasing, deprecation
//! forwarding, and a compatibility mode for format migration.
//!
//! Field resolution per key lookup: a key naming an alias or deprecated
//! field redirects to its target; supplying a field and one of its
//! synonyms simultaneously with different values is a validation error.
//! In compatibility mode, missing non-optional fields are filled from
//! schema defaults, and unknown keys are tolerated only when every known
//! field was satisfied from supplied data rather than defaults. Strict
//! mode rejects both.

use crate::container::{Binding, StructValue, TypedValue};
use crate::error::{DocshapeError, ReservedNameError, ValidationError, ValidationResult};
use crate::schema::types::{ArcType, SchemaType, SchemaTypeExt, ValidationContext};
use crate::schema::union::{DeprecatedType, OptionalType};
use crate::value::Value;
use log::debug;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Names a struct field may not use: they collide with the struct
/// container's own operations.
const RESERVED_FIELD_NAMES: [&str; 14] = [
    "get",
    "get_mut",
    "set",
    "unset",
    "merge_from",
    "iter",
    "keys",
    "len",
    "is_empty",
    "contains",
    "to_value",
    "copy",
    "revalidate",
    "invoke",
];

/// Struct validation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructMode {
    /// Reject missing required fields and unknown keys.
    #[default]
    Strict,
    /// Fill missing non-optional fields from schema defaults; tolerate
    /// unknown keys only when no default fill was needed.
    Compatible,
}

/// One declared entry of a struct type.
#[derive(Debug)]
enum FieldDecl {
    /// A real field holding a value of `ty`.
    Field { name: String, ty: ArcType },
    /// A pure synonym for `target`.
    Alias { name: String, target: String },
    /// A retired name silently forwarded to `target`.
    Deprecated {
        name: String,
        target: String,
        message: Option<String>,
    },
}

impl FieldDecl {
    fn name(&self) -> &str {
        match self {
            FieldDecl::Field { name, .. }
            | FieldDecl::Alias { name, .. }
            | FieldDecl::Deprecated { name, .. } => name,
        }
    }

    fn signature(&self) -> String {
        match self {
            FieldDecl::Field { ty, .. } => ty.describe(),
            FieldDecl::Alias { target, .. } => format!("alias({target})"),
            FieldDecl::Deprecated { target, .. } => format!("deprecated({target})"),
        }
    }
}

/// Result of resolving a supplied key against the declared fields.
pub struct ResolvedField<'a> {
    /// The canonical field the key addresses.
    pub canonical: &'a str,
    /// The alias/deprecated name the lookup came in through, if any.
    pub forwarded_from: Option<&'a str>,
    /// Deprecation message, when the lookup came through a deprecated name.
    pub message: Option<&'a str>,
}

/// Named-field record schema type.
#[derive(Debug)]
pub struct StructType {
    fields: Vec<FieldDecl>,
    mode: StructMode,
}

/// Builder for [`StructType`]; declaration order is preserved.
#[derive(Debug, Default)]
pub struct StructBuilder {
    fields: Vec<FieldDecl>,
    mode: StructMode,
}

impl StructBuilder {
    /// Declare a field.
    pub fn field(mut self, name: impl Into<String>, ty: ArcType) -> Self {
        self.fields.push(FieldDecl::Field {
            name: name.into(),
            ty,
        });
        self
    }

    /// Declare a pure synonym for an existing field.
    pub fn alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.fields.push(FieldDecl::Alias {
            name: name.into(),
            target: target.into(),
        });
        self
    }

    /// Declare a retired field name forwarded to its replacement.
    pub fn deprecated(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.fields.push(FieldDecl::Deprecated {
            name: name.into(),
            target: target.into(),
            message: None,
        });
        self
    }

    /// Declare a retired field name with an explanatory message.
    pub fn deprecated_with_message(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldDecl::Deprecated {
            name: name.into(),
            target: target.into(),
            message: Some(message.into()),
        });
        self
    }

    /// Switch the struct to compatibility-mode validation.
    pub fn compatible(mut self) -> Self {
        self.mode = StructMode::Compatible;
        self
    }

    /// Finish the declaration, checking reserved names, duplicates, and
    /// alias targets.
    pub fn build(self) -> Result<StructType, DocshapeError> {
        let mut seen = std::collections::BTreeSet::new();
        for decl in &self.fields {
            let name = decl.name();
            if RESERVED_FIELD_NAMES.contains(&name) {
                return Err(ReservedNameError {
                    name: name.to_string(),
                    container: "struct",
                }
                .into());
            }
            if !seen.insert(name) {
                return Err(ValidationError::custom(format!(
                    "Field '{name}' is declared more than once"
                ))
                .into());
            }
        }
        for decl in &self.fields {
            if let FieldDecl::Alias { name, target } | FieldDecl::Deprecated { name, target, .. } =
                decl
            {
                let target_is_field = self
                    .fields
                    .iter()
                    .any(|d| matches!(d, FieldDecl::Field { name, .. } if name == target));
                if !target_is_field {
                    return Err(ValidationError::custom(format!(
                        "'{name}' forwards to '{target}', which is not a declared field"
                    ))
                    .into());
                }
            }
        }
        Ok(StructType {
            fields: self.fields,
            mode: self.mode,
        })
    }
}

/// Outcome of matching supplied keys against the declaration.
struct Analysis<'a> {
    /// Canonical field -> (name the value came in under, raw value).
    supplied: BTreeMap<&'a str, (&'a str, &'a Value)>,
    /// Required fields with no supplied value.
    missing_required: Vec<&'a str>,
    /// Supplied keys matching no declared field.
    unknown: Vec<&'a str>,
}

impl StructType {
    pub fn builder() -> StructBuilder {
        StructBuilder::default()
    }

    pub fn mode(&self) -> StructMode {
        self.mode
    }

    /// Resolve a supplied key to its canonical field.
    pub fn resolve_field(&self, name: &str) -> Option<ResolvedField<'_>> {
        self.fields
            .iter()
            .find(|d| d.name() == name)
            .map(|decl| match decl {
                FieldDecl::Field { name, .. } => ResolvedField {
                    canonical: name,
                    forwarded_from: None,
                    message: None,
                },
                FieldDecl::Alias { name, target } => ResolvedField {
                    canonical: target,
                    forwarded_from: Some(name),
                    message: None,
                },
                FieldDecl::Deprecated {
                    name,
                    target,
                    message,
                } => ResolvedField {
                    canonical: target,
                    forwarded_from: Some(name),
                    message: message.as_deref(),
                },
            })
    }

    /// Canonical field names in declared order.
    pub fn canonical_field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|d| match d {
            FieldDecl::Field { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Schema type of a canonical field.
    pub fn field_type(&self, canonical: &str) -> Option<&ArcType> {
        self.fields.iter().find_map(|d| match d {
            FieldDecl::Field { name, ty } if name == canonical => Some(ty),
            _ => None,
        })
    }

    /// Whether a canonical field may be absent. Optional and deprecated
    /// value types are absent-without-error.
    pub fn is_optional_field(&self, canonical: &str) -> bool {
        self.field_type(canonical)
            .map(|ty| {
                ty.as_any().downcast_ref::<OptionalType>().is_some()
                    || ty.as_any().downcast_ref::<DeprecatedType>().is_some()
            })
            .unwrap_or(false)
    }

    /// Field-set union with conflict detection, producing a new type.
    /// Neither input is mutated; child types are deep-copied.
    pub fn merged(&self, other: &StructType) -> ValidationResult<StructType> {
        let mut fields: Vec<FieldDecl> = self.fields.iter().map(clone_decl).collect();
        for decl in &other.fields {
            match fields.iter().find(|d| d.name() == decl.name()) {
                Some(existing) => {
                    if existing.signature() != decl.signature() {
                        return Err(ValidationError::MergeConflict {
                            field: decl.name().to_string(),
                            left: existing.signature(),
                            right: decl.signature(),
                        });
                    }
                }
                None => fields.push(clone_decl(decl)),
            }
        }
        Ok(StructType {
            fields,
            mode: self.mode,
        })
    }

    fn analyze<'a>(&'a self, map: &'a BTreeMap<String, Value>) -> ValidationResult<Analysis<'a>> {
        let mut supplied: BTreeMap<&str, (&str, &Value)> = BTreeMap::new();
        let mut unknown = Vec::new();
        for (key, value) in map {
            match self.resolve_field(key) {
                Some(resolved) => {
                    let existing = supplied.get(resolved.canonical).copied();
                    if let Some((prev_key, prev_value)) = existing {
                        if prev_value != value {
                            return Err(ValidationError::AliasConflict {
                                field: resolved.canonical.to_string(),
                                alias: if prev_key == resolved.canonical {
                                    key.clone()
                                } else {
                                    prev_key.to_string()
                                },
                            });
                        }
                        // equal values through two names collapse to one
                        if resolved.forwarded_from.is_none() {
                            supplied.insert(resolved.canonical, (key.as_str(), value));
                        }
                    } else {
                        supplied.insert(resolved.canonical, (key.as_str(), value));
                    }
                }
                None => unknown.push(key.as_str()),
            }
        }
        let missing_required = self
            .canonical_field_names()
            .filter(|name| !supplied.contains_key(name) && !self.is_optional_field(name))
            .collect();
        Ok(Analysis {
            supplied,
            missing_required,
            unknown,
        })
    }
}

fn clone_decl(decl: &FieldDecl) -> FieldDecl {
    match decl {
        FieldDecl::Field { name, ty } => FieldDecl::Field {
            name: name.clone(),
            ty: ty.clone_type(),
        },
        FieldDecl::Alias { name, target } => FieldDecl::Alias {
            name: name.clone(),
            target: target.clone(),
        },
        FieldDecl::Deprecated {
            name,
            target,
            message,
        } => FieldDecl::Deprecated {
            name: name.clone(),
            target: target.clone(),
            message: message.clone(),
        },
    }
}

impl SchemaType for StructType {
    fn kind(&self) -> &'static str {
        "Struct"
    }

    fn describe(&self) -> String {
        format!(
            "Struct[{}]",
            self.fields
                .iter()
                .map(|d| format!("{}: {}", d.name(), d.signature()))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        let map = raw
            .as_map()
            .ok_or_else(|| ValidationError::invalid_type("mapping", raw.kind()))?;
        let analysis = self.analyze(map)?;
        match self.mode {
            StructMode::Strict => {
                if let Some(field) = analysis.missing_required.first() {
                    return Err(ValidationError::missing_required(*field));
                }
                if let Some(field) = analysis.unknown.first() {
                    return Err(ValidationError::UnknownField {
                        field: (*field).to_string(),
                    });
                }
            }
            StructMode::Compatible => {
                // unknown keys ride along only once the schema is otherwise
                // fully satisfied from supplied data
                if !analysis.unknown.is_empty() && !analysis.missing_required.is_empty() {
                    return Err(ValidationError::UnknownField {
                        field: analysis.unknown[0].to_string(),
                    });
                }
            }
        }
        Ok(raw.clone())
    }

    fn build(
        &self,
        self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        self.validate_self(raw, ctx)?;
        let map = match raw.as_map() {
            Some(map) => map,
            None => return Err(ValidationError::invalid_type("mapping", raw.kind())),
        };
        let analysis = self.analyze(map)?;
        let child_ctx = ctx.descend()?;
        let mut fields = BTreeMap::new();
        for canonical in self.canonical_field_names() {
            let field_ty = match self.field_type(canonical) {
                Some(ty) => ty,
                None => continue,
            };
            match analysis.supplied.get(canonical).copied() {
                Some((via, value)) => {
                    if via != canonical {
                        debug!("field '{via}' supplied for '{canonical}'");
                    }
                    let typed = field_ty
                        .validate(value, &child_ctx)
                        .map_err(|e| e.for_field(canonical))?;
                    // optional fields supplied as null stay absent
                    if typed.to_value().is_null() && self.is_optional_field(canonical) {
                        continue;
                    }
                    fields.insert(canonical.to_string(), typed);
                }
                None if self.is_optional_field(canonical) => {}
                None => match self.mode {
                    StructMode::Compatible => {
                        let typed = field_ty
                            .make_default(&child_ctx)
                            .map_err(|e| e.for_field(canonical))?;
                        fields.insert(canonical.to_string(), typed);
                    }
                    StructMode::Strict => {
                        return Err(ValidationError::missing_required(canonical));
                    }
                },
            }
        }
        let binding = Binding::anonymous(self_arc.clone(), ctx.registry().clone());
        Ok(TypedValue::Struct(StructValue::from_parts(binding, fields)))
    }

    fn default_raw(&self, ctx: &ValidationContext) -> ValidationResult<Value> {
        let child_ctx = ctx.descend()?;
        let mut map = BTreeMap::new();
        for canonical in self.canonical_field_names() {
            if self.is_optional_field(canonical) {
                continue;
            }
            if let Some(field_ty) = self.field_type(canonical) {
                map.insert(canonical.to_string(), field_ty.default_raw(&child_ctx)?);
            }
        }
        Ok(Value::Map(map))
    }

    fn conform_raw(
        &self,
        raw: &Value,
        fill: bool,
        ctx: &ValidationContext,
    ) -> ValidationResult<Value> {
        let Some(map) = raw.as_map() else {
            return Ok(raw.clone());
        };
        let child_ctx = ctx.descend()?;
        let mut out = BTreeMap::new();
        // canonical names win over their synonyms; unknown keys are dropped
        for prefer_canonical in [true, false] {
            for (key, value) in map {
                let Some(resolved) = self.resolve_field(key) else {
                    continue;
                };
                if (resolved.forwarded_from.is_none()) != prefer_canonical {
                    continue;
                }
                let canonical = resolved.canonical.to_string();
                if out.contains_key(&canonical) {
                    continue;
                }
                if let Some(ty) = self.field_type(&canonical) {
                    out.insert(canonical, ty.conform_raw(value, fill, &child_ctx)?);
                }
            }
        }
        if fill {
            for canonical in self.canonical_field_names() {
                if self.is_optional_field(canonical) || out.contains_key(canonical) {
                    continue;
                }
                if let Some(ty) = self.field_type(canonical) {
                    out.insert(canonical.to_string(), ty.default_raw(&child_ctx)?);
                }
            }
        }
        Ok(Value::Map(out))
    }

    fn child_type(&self, key: Option<&str>, _index: Option<usize>) -> Option<ArcType> {
        let key = key?;
        let resolved = self.resolve_field(key)?;
        self.field_type(resolved.canonical).cloned()
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(StructType {
            fields: self.fields.iter().map(clone_decl).collect(),
            mode: self.mode,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
