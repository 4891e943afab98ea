//! Validating struct container: a named-field record bound to a
//! [`StructType`].
//!
//! Field access by an alias or deprecated name transparently redirects to
//! the canonical field. Every mutator validates the incoming value against
//! the field's schema type, re-runs the struct's structural self-check and
//! the global validation hook, and restores the previous state if either
//! fails.

use crate::container::binding::Binding;
use crate::container::{TypedValue, post_check};
use crate::error::{ValidationError, ValidationResult};
use crate::schema::structure::StructType;
use crate::schema::types::{SchemaTypeExt, ValidationContext};
use crate::value::Value;
use log::debug;
use std::collections::BTreeMap;

/// A mutable, schema-bound record value.
#[derive(Debug, Clone)]
pub struct StructValue {
    pub(crate) binding: Binding,
    /// Canonical field name -> value. Absent optional fields are omitted.
    pub(crate) fields: BTreeMap<String, TypedValue>,
}

impl StructValue {
    pub(crate) fn from_parts(binding: Binding, fields: BTreeMap<String, TypedValue>) -> Self {
        Self { binding, fields }
    }

    fn struct_type(&self) -> ValidationResult<&StructType> {
        self.binding
            .schema()
            .as_any()
            .downcast_ref::<StructType>()
            .ok_or_else(|| ValidationError::custom("Struct value is not bound to a struct type"))
    }

    /// Number of fields currently present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the (canonical, alias, or deprecated) field name currently
    /// holds a value.
    pub fn contains(&self, name: &str) -> bool {
        self.canonical_name(name)
            .map(|canonical| self.fields.contains_key(&canonical))
            .unwrap_or(false)
    }

    fn canonical_name(&self, name: &str) -> Option<String> {
        let st = self.struct_type().ok()?;
        let resolved = st.resolve_field(name)?;
        if let Some(from) = resolved.forwarded_from {
            debug!(
                "field '{from}' forwarded to '{canonical}'",
                canonical = resolved.canonical
            );
        }
        Some(resolved.canonical.to_string())
    }

    /// Read a field. Alias and deprecated names redirect to the canonical
    /// field; absent optional fields read as `None`.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        let canonical = self.canonical_name(name)?;
        self.fields.get(&canonical)
    }

    /// Mutable access to a field value for nested mutation. The child
    /// carries its own schema binding, so its mutators re-validate against
    /// the correct child type.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypedValue> {
        let canonical = self.canonical_name(name)?;
        self.fields.get_mut(&canonical)
    }

    /// Set a field to a raw value, validating it against the field's schema
    /// type. Setting an optional field to null clears it, exactly as an
    /// absent key would during construction. On any failure the struct is
    /// left exactly as it was.
    pub fn set(&mut self, name: &str, raw: Value) -> ValidationResult<()> {
        let (canonical, field_ty, optional) = {
            let st = self.struct_type()?;
            let resolved = st
                .resolve_field(name)
                .ok_or_else(|| ValidationError::UnknownField { field: name.into() })?;
            let canonical = resolved.canonical.to_string();
            let ty = st
                .field_type(&canonical)
                .ok_or_else(|| ValidationError::UnknownField { field: name.into() })?
                .clone();
            let optional = st.is_optional_field(&canonical);
            (canonical, ty, optional)
        };

        let registry = self.binding.registry().clone();
        let ctx = ValidationContext::new(&registry);
        let typed = field_ty
            .validate(&raw, &ctx)
            .map_err(|e| e.for_field(&canonical))?;

        if optional && typed.to_value().is_null() {
            return self.unset(&canonical).map(|_| ());
        }
        let prev = self.fields.insert(canonical.clone(), typed);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            match prev {
                Some(v) => {
                    self.fields.insert(canonical, v);
                }
                None => {
                    self.fields.remove(&canonical);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Remove an optional field, returning its previous value. Removing a
    /// required field is a validation error and leaves the struct unchanged.
    pub fn unset(&mut self, name: &str) -> ValidationResult<Option<TypedValue>> {
        let canonical = {
            let st = self.struct_type()?;
            let resolved = st
                .resolve_field(name)
                .ok_or_else(|| ValidationError::UnknownField { field: name.into() })?;
            if !st.is_optional_field(resolved.canonical) {
                return Err(ValidationError::custom(format!(
                    "Field '{}' is not optional and cannot be removed",
                    resolved.canonical
                )));
            }
            resolved.canonical.to_string()
        };

        let prev = self.fields.remove(&canonical);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            if let Some(v) = prev {
                self.fields.insert(canonical, v);
            }
            return Err(err);
        }
        Ok(prev)
    }

    /// Set several fields in one transaction. Validation failure of any
    /// entry rolls the whole struct back.
    pub fn merge_from(&mut self, entries: &BTreeMap<String, Value>) -> ValidationResult<()> {
        let snapshot = self.fields.clone();
        let result = self.apply_merge(entries);
        if let Err(err) = result {
            self.fields = snapshot;
            return Err(err);
        }
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.fields = snapshot;
            return Err(err);
        }
        Ok(())
    }

    fn apply_merge(&mut self, entries: &BTreeMap<String, Value>) -> ValidationResult<()> {
        let registry = self.binding.registry().clone();
        let ctx = ValidationContext::new(&registry);
        for (name, raw) in entries {
            let (canonical, field_ty) = {
                let st = self.struct_type()?;
                let resolved = st
                    .resolve_field(name)
                    .ok_or_else(|| ValidationError::UnknownField { field: name.clone() })?;
                let canonical = resolved.canonical.to_string();
                let ty = st
                    .field_type(&canonical)
                    .ok_or_else(|| ValidationError::UnknownField { field: name.clone() })?
                    .clone();
                (canonical, ty)
            };
            let typed = field_ty
                .validate(raw, &ctx)
                .map_err(|e| e.for_field(&canonical))?;
            self.fields.insert(canonical, typed);
        }
        Ok(())
    }

    /// Fields in declared order, skipping absent optionals. Yielded values
    /// carry their schema bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        let order: Vec<String> = self
            .struct_type()
            .map(|st| st.canonical_field_names().map(String::from).collect())
            .unwrap_or_default();
        order.into_iter().filter_map(move |name| {
            self.fields
                .get_key_value(name.as_str())
                .map(|(k, v)| (k.as_str(), v))
        })
    }

    /// Canonical names of the fields currently present, in declared order.
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(k, _)| k).collect()
    }

    /// Serialize to a raw mapping of the present fields.
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }

    pub(crate) fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut TypedValue)) {
        for child in self.fields.values_mut() {
            f(child);
        }
    }
}
