//! Validating mapping container: a dynamic key/value dictionary.
//!
//! Keys are validated and coerced through the mapping's key type and stored
//! in canonical string form, so `"on"` and `1` address the same entry under
//! an enumerated integer key type. Specific keys may be pinned to a
//! different value type by the schema's per-key overrides.

use crate::container::binding::Binding;
use crate::container::{TypedValue, post_check};
use crate::error::{ValidationError, ValidationResult};
use crate::schema::mapping::MappingType;
use crate::schema::types::{SchemaTypeExt, ValidationContext};
use crate::value::Value;
use std::collections::BTreeMap;

/// A mutable, schema-bound dictionary with canonical string keys.
#[derive(Debug, Clone)]
pub struct MapValue {
    pub(crate) binding: Binding,
    pub(crate) entries: BTreeMap<String, TypedValue>,
}

impl MapValue {
    pub(crate) fn from_parts(binding: Binding, entries: BTreeMap<String, TypedValue>) -> Self {
        Self { binding, entries }
    }

    fn mapping_type(&self) -> ValidationResult<&MappingType> {
        self.binding
            .schema()
            .as_any()
            .downcast_ref::<MappingType>()
            .ok_or_else(|| ValidationError::custom("Map value is not bound to a mapping type"))
    }

    /// Canonicalize a raw key through the mapping's key type.
    fn canonical_key(&self, key: &Value) -> ValidationResult<String> {
        let registry = self.binding.registry().clone();
        let ctx = ValidationContext::new(&registry);
        self.mapping_type()?.canonical_key(key, &ctx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the mapping holds an entry for the (coerced) key.
    pub fn contains_key(&self, key: &Value) -> ValidationResult<bool> {
        Ok(self.entries.contains_key(&self.canonical_key(key)?))
    }

    /// Read the entry for a key. The key is coerced through the key type,
    /// so equivalent spellings address the same entry.
    pub fn get(&self, key: &Value) -> ValidationResult<Option<&TypedValue>> {
        Ok(self.entries.get(&self.canonical_key(key)?))
    }

    /// Mutable access to an entry for nested mutation.
    pub fn get_mut(&mut self, key: &Value) -> ValidationResult<Option<&mut TypedValue>> {
        let canonical = self.canonical_key(key)?;
        Ok(self.entries.get_mut(&canonical))
    }

    /// Insert or replace the entry for a key, validating the value against
    /// the key's value type (respecting per-key overrides).
    pub fn insert(&mut self, key: Value, raw: Value) -> ValidationResult<()> {
        let canonical = self.canonical_key(&key)?;
        let value_ty = {
            let mt = self.mapping_type()?;
            mt.value_type_for(&canonical).clone()
        };
        let registry = self.binding.registry().clone();
        let ctx = ValidationContext::new(&registry);
        let typed = value_ty
            .validate(&raw, &ctx)
            .map_err(|e| e.for_key(&canonical))?;

        let prev = self.entries.insert(canonical.clone(), typed);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            match prev {
                Some(v) => {
                    self.entries.insert(canonical, v);
                }
                None => {
                    self.entries.remove(&canonical);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Remove and return the entry for a key.
    pub fn remove(&mut self, key: &Value) -> ValidationResult<Option<TypedValue>> {
        let canonical = self.canonical_key(key)?;
        let Some(prev) = self.entries.remove(&canonical) else {
            return Ok(None);
        };
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.entries.insert(canonical, prev);
            return Err(err);
        }
        Ok(Some(prev))
    }

    /// Remove all entries.
    pub fn clear(&mut self) -> ValidationResult<()> {
        let snapshot = std::mem::take(&mut self.entries);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.entries = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Insert every entry of `raw_entries` in one transaction; failure
    /// leaves the mapping unchanged.
    pub fn merge_from(&mut self, raw_entries: &BTreeMap<String, Value>) -> ValidationResult<()> {
        let snapshot = self.entries.clone();
        let result = (|| -> ValidationResult<()> {
            let registry = self.binding.registry().clone();
            let ctx = ValidationContext::new(&registry);
            for (key, raw) in raw_entries {
                let canonical = self.canonical_key(&Value::Str(key.clone()))?;
                let value_ty = self.mapping_type()?.value_type_for(&canonical).clone();
                let typed = value_ty
                    .validate(raw, &ctx)
                    .map_err(|e| e.for_key(&canonical))?;
                self.entries.insert(canonical, typed);
            }
            post_check(&self.binding, &self.to_value())
        })();
        if let Err(err) = result {
            self.entries = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Canonical keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in canonical key order, schema bindings attached.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_value(&self) -> Value {
        Value::Map(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }

    pub(crate) fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut TypedValue)) {
        for child in self.entries.values_mut() {
            f(child);
        }
    }
}
