//! Mapping schema type: a dynamic key/value dictionary.
//!
//! Raw document keys are strings; they are validated and coerced through
//! the key type and stored in canonical textual form, so an enumerated
//! integer key accepts both `"on"` and `1` and files both under `"1"`.
//! Individual (canonical) keys can be pinned to a different value type.

use crate::container::{Binding, MapValue, TypedValue};
use crate::error::{ValidationError, ValidationResult};
use crate::schema::types::{ArcType, SchemaType, SchemaTypeExt, ValidationContext};
use crate::value::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Dictionary schema type with a key type, a default value type, and
/// per-key value type overrides.
#[derive(Debug)]
pub struct MappingType {
    key: ArcType,
    value: ArcType,
    overrides: Vec<(String, ArcType)>,
}

impl MappingType {
    pub fn new(key: ArcType, value: ArcType) -> Self {
        Self {
            key,
            value,
            overrides: Vec::new(),
        }
    }

    /// Pin a specific canonical key to a different value type.
    pub fn with_override(mut self, key: impl Into<String>, ty: ArcType) -> Self {
        self.overrides.push((key.into(), ty));
        self
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }

    /// Validate and coerce a raw key through the key type, producing the
    /// canonical string under which the entry is stored.
    pub fn canonical_key(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<String> {
        let normalized = match raw {
            Value::Str(text) => self.key.string_to_value(text, ctx),
            other => self.key.validate_self(other, ctx),
        }
        .map_err(|e| match raw {
            Value::Str(text) => e.for_key(text.as_str()),
            other => e.for_key(other.to_string()),
        })?;
        Ok(self.key.value_to_string(&normalized))
    }

    /// Value type for a canonical key: its override, or the default.
    pub fn value_type_for(&self, canonical: &str) -> &ArcType {
        self.overrides
            .iter()
            .find_map(|(key, ty)| (key == canonical).then_some(ty))
            .unwrap_or(&self.value)
    }
}

impl SchemaType for MappingType {
    fn kind(&self) -> &'static str {
        "Mapping"
    }

    fn describe(&self) -> String {
        format!(
            "Mapping[{} -> {}]",
            self.key.describe(),
            self.value.describe()
        )
    }

    fn validate_self(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<Value> {
        let map = raw
            .as_map()
            .ok_or_else(|| ValidationError::invalid_type("mapping", raw.kind()))?;
        let mut seen = std::collections::BTreeSet::new();
        for key in map.keys() {
            let canonical = self.canonical_key(&Value::Str(key.clone()), ctx)?;
            if !seen.insert(canonical.clone()) {
                return Err(ValidationError::custom(format!(
                    "Keys collide after coercion: '{canonical}'"
                )));
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
        let child_ctx = ctx.descend()?;
        let mut entries = BTreeMap::new();
        for (key, value) in map {
            let canonical = self.canonical_key(&Value::Str(key.clone()), ctx)?;
            let typed = self
                .value_type_for(&canonical)
                .validate(value, &child_ctx)
                .map_err(|e| e.for_key(&canonical))?;
            entries.insert(canonical, typed);
        }
        let binding = Binding::anonymous(self_arc.clone(), ctx.registry().clone());
        Ok(TypedValue::Map(MapValue::from_parts(binding, entries)))
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        Ok(Value::Map(BTreeMap::new()))
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
        let mut conformed = BTreeMap::new();
        for (key, value) in map {
            let value_ty = match self.canonical_key(&Value::Str(key.clone()), ctx) {
                Ok(canonical) => self.value_type_for(&canonical).clone(),
                Err(_) => self.value.clone(),
            };
            conformed.insert(key.clone(), value_ty.conform_raw(value, fill, &child_ctx)?);
        }
        Ok(Value::Map(conformed))
    }

    fn child_type(&self, key: Option<&str>, _index: Option<usize>) -> Option<ArcType> {
        key.map(|k| self.value_type_for(k).clone())
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(MappingType {
            key: self.key.clone_type(),
            value: self.value.clone_type(),
            overrides: self
                .overrides
                .iter()
                .map(|(k, ty)| (k.clone(), ty.clone_type()))
                .collect(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
