//! Validating set container: unordered unique elements.
//!
//! Elements are keyed by their normalized raw value, so membership and
//! uniqueness are decided by value equality, never by binding identity.
//! In-place element mutation is not offered (it would change identity);
//! the mutators are insert/remove/take and the bulk set operations.

use crate::container::binding::Binding;
use crate::container::{TypedValue, post_check};
use crate::error::{ValidationError, ValidationResult};
use crate::schema::types::{SchemaTypeExt, ValidationContext};
use crate::value::Value;
use std::collections::BTreeMap;

/// A mutable, schema-bound set of unique values.
#[derive(Debug, Clone)]
pub struct SetValue {
    pub(crate) binding: Binding,
    /// Normalized element value -> typed element.
    pub(crate) items: BTreeMap<Value, TypedValue>,
}

impl SetValue {
    pub(crate) fn from_parts(binding: Binding, items: BTreeMap<Value, TypedValue>) -> Self {
        Self { binding, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Membership test against the normalized raw element value.
    pub fn contains(&self, raw: &Value) -> bool {
        self.items.contains_key(raw)
    }

    /// Elements in canonical order, schema bindings attached.
    pub fn iter(&self) -> impl Iterator<Item = &TypedValue> {
        self.items.values()
    }

    fn validate_element(&self, raw: &Value) -> ValidationResult<TypedValue> {
        let element_ty = self
            .binding
            .schema()
            .child_type(None, Some(0))
            .ok_or_else(|| ValidationError::custom("Set type has no element type"))?;
        let registry = self.binding.registry().clone();
        let ctx = ValidationContext::new(&registry);
        element_ty.validate(raw, &ctx)
    }

    /// Insert an element; returns `false` if the normalized value was
    /// already present (the set is unchanged).
    pub fn insert(&mut self, raw: Value) -> ValidationResult<bool> {
        let typed = self.validate_element(&raw)?;
        let key = typed.to_value();
        if self.items.contains_key(&key) {
            return Ok(false);
        }
        self.items.insert(key.clone(), typed);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items.remove(&key);
            return Err(err);
        }
        Ok(true)
    }

    /// Remove an element by normalized value; returns whether it was
    /// present.
    pub fn remove(&mut self, raw: &Value) -> ValidationResult<bool> {
        Ok(self.take(raw)?.is_some())
    }

    /// Remove and return an element by normalized value.
    pub fn take(&mut self, raw: &Value) -> ValidationResult<Option<TypedValue>> {
        let Some(prev) = self.items.remove(raw) else {
            return Ok(None);
        };
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items.insert(raw.clone(), prev);
            return Err(err);
        }
        Ok(Some(prev))
    }

    /// Remove all elements.
    pub fn clear(&mut self) -> ValidationResult<()> {
        let snapshot = std::mem::take(&mut self.items);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Insert every element of `raws` in one transaction (set union).
    pub fn union_with(&mut self, raws: impl IntoIterator<Item = Value>) -> ValidationResult<()> {
        let snapshot = self.items.clone();
        let result = (|| -> ValidationResult<()> {
            for raw in raws {
                let typed = self.validate_element(&raw)?;
                self.items.insert(typed.to_value(), typed);
            }
            post_check(&self.binding, &self.to_value())
        })();
        if let Err(err) = result {
            self.items = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Keep only elements whose normalized value appears in `keep`
    /// (set intersection).
    pub fn intersect_with<'a>(
        &mut self,
        keep: impl IntoIterator<Item = &'a Value>,
    ) -> ValidationResult<()> {
        let keep: std::collections::BTreeSet<&Value> = keep.into_iter().collect();
        let snapshot = self.items.clone();
        self.items.retain(|key, _| keep.contains(key));
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Remove every element whose normalized value appears in `drop`
    /// (set difference).
    pub fn difference_with<'a>(
        &mut self,
        drop: impl IntoIterator<Item = &'a Value>,
    ) -> ValidationResult<()> {
        let snapshot = self.items.clone();
        for raw in drop {
            self.items.remove(raw);
        }
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items = snapshot;
            return Err(err);
        }
        Ok(())
    }

    pub fn to_value(&self) -> Value {
        Value::Set(self.items.keys().cloned().collect())
    }

    pub(crate) fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut TypedValue)) {
        for child in self.items.values_mut() {
            f(child);
        }
    }
}
