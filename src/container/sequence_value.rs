//! Validating sequence and tuple containers.
//!
//! A sequence is a homogeneous ordered collection whose length may be
//! constrained; a tuple has fixed arity with a schema type per position.
//! Mutators follow the transactional protocol: validate the incoming
//! element, apply, re-run the container self-check and global hook, and
//! restore the previous state on failure.

use crate::container::binding::Binding;
use crate::container::{TypedValue, post_check};
use crate::error::{ValidationError, ValidationResult};
use crate::schema::types::{SchemaTypeExt, ValidationContext};
use crate::value::Value;

/// A mutable, schema-bound ordered sequence.
#[derive(Debug, Clone)]
pub struct SeqValue {
    pub(crate) binding: Binding,
    pub(crate) items: Vec<TypedValue>,
}

impl SeqValue {
    pub(crate) fn from_parts(binding: Binding, items: Vec<TypedValue>) -> Self {
        Self { binding, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TypedValue> {
        self.items.get(index)
    }

    /// Mutable access to an element for nested mutation; the element
    /// carries its own schema binding.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TypedValue> {
        self.items.get_mut(index)
    }

    /// Values in order, schema bindings attached.
    pub fn iter(&self) -> impl Iterator<Item = &TypedValue> {
        self.items.iter()
    }

    fn validate_element(&self, raw: &Value, index: usize) -> ValidationResult<TypedValue> {
        let registry = self.binding.registry().clone();
        let ctx = ValidationContext::new(&registry);
        self.binding
            .schema()
            .validate_child(raw, None, Some(index), &ctx)
    }

    /// Replace the element at `index`.
    pub fn set(&mut self, index: usize, raw: Value) -> ValidationResult<()> {
        if index >= self.items.len() {
            return Err(ValidationError::custom(format!(
                "Index {index} out of bounds for sequence of length {}",
                self.items.len()
            )));
        }
        let typed = self.validate_element(&raw, index)?;
        let prev = std::mem::replace(&mut self.items[index], typed);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items[index] = prev;
            return Err(err);
        }
        Ok(())
    }

    /// Append an element. Rejected (and rolled back) if the resulting
    /// length violates the sequence's size constraint.
    pub fn push(&mut self, raw: Value) -> ValidationResult<()> {
        let typed = self.validate_element(&raw, self.items.len())?;
        self.items.push(typed);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Insert an element at `index`, shifting the tail.
    pub fn insert(&mut self, index: usize, raw: Value) -> ValidationResult<()> {
        if index > self.items.len() {
            return Err(ValidationError::custom(format!(
                "Index {index} out of bounds for insertion into sequence of length {}",
                self.items.len()
            )));
        }
        let typed = self.validate_element(&raw, index)?;
        self.items.insert(index, typed);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items.remove(index);
            return Err(err);
        }
        Ok(())
    }

    /// Remove and return the element at `index`. Rejected if the resulting
    /// length violates the size constraint.
    pub fn remove(&mut self, index: usize) -> ValidationResult<TypedValue> {
        if index >= self.items.len() {
            return Err(ValidationError::custom(format!(
                "Index {index} out of bounds for sequence of length {}",
                self.items.len()
            )));
        }
        let removed = self.items.remove(index);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items.insert(index, removed);
            return Err(err);
        }
        Ok(removed)
    }

    /// Remove and return the last element, or `None` on an empty sequence.
    pub fn pop(&mut self) -> ValidationResult<Option<TypedValue>> {
        let Some(last) = self.items.pop() else {
            return Ok(None);
        };
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items.push(last);
            return Err(err);
        }
        Ok(Some(last))
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

    /// Append several elements in one transaction; failure leaves the
    /// sequence unchanged.
    pub fn extend(&mut self, raws: impl IntoIterator<Item = Value>) -> ValidationResult<()> {
        let snapshot_len = self.items.len();
        let result = (|| -> ValidationResult<()> {
            for raw in raws {
                let typed = self.validate_element(&raw, self.items.len())?;
                self.items.push(typed);
            }
            post_check(&self.binding, &self.to_value())
        })();
        if let Err(err) = result {
            self.items.truncate(snapshot_len);
            return Err(err);
        }
        Ok(())
    }

    /// Replace the elements in `range` with validated replacements
    /// (slice assignment). The whole splice is one transaction.
    pub fn splice(
        &mut self,
        range: std::ops::Range<usize>,
        raws: impl IntoIterator<Item = Value>,
    ) -> ValidationResult<()> {
        if range.start > range.end || range.end > self.items.len() {
            return Err(ValidationError::custom(format!(
                "Range {}..{} out of bounds for sequence of length {}",
                range.start,
                range.end,
                self.items.len()
            )));
        }
        let snapshot = self.items.clone();
        let result = (|| -> ValidationResult<()> {
            let mut replacements = Vec::new();
            for (offset, raw) in raws.into_iter().enumerate() {
                replacements.push(self.validate_element(&raw, range.start + offset)?);
            }
            let _ = self.items.splice(range.clone(), replacements);
            post_check(&self.binding, &self.to_value())
        })();
        if let Err(err) = result {
            self.items = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Shorten the sequence to at most `len` elements.
    pub fn truncate(&mut self, len: usize) -> ValidationResult<()> {
        if len >= self.items.len() {
            return Ok(());
        }
        let snapshot = self.items.clone();
        self.items.truncate(len);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items = snapshot;
            return Err(err);
        }
        Ok(())
    }

    pub fn to_value(&self) -> Value {
        Value::Seq(self.items.iter().map(TypedValue::to_value).collect())
    }

    pub(crate) fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut TypedValue)) {
        for child in &mut self.items {
            f(child);
        }
    }
}

/// A mutable, schema-bound fixed-arity tuple. Arity never changes; only
/// per-position replacement is supported.
#[derive(Debug, Clone)]
pub struct TupleValue {
    pub(crate) binding: Binding,
    pub(crate) items: Vec<TypedValue>,
}

impl TupleValue {
    pub(crate) fn from_parts(binding: Binding, items: Vec<TypedValue>) -> Self {
        Self { binding, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TypedValue> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TypedValue> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypedValue> {
        self.items.iter()
    }

    /// Replace the element at `index`, validated against that position's
    /// schema type.
    pub fn set(&mut self, index: usize, raw: Value) -> ValidationResult<()> {
        let registry = self.binding.registry().clone();
        let ctx = ValidationContext::new(&registry);
        let typed = self
            .binding
            .schema()
            .validate_child(&raw, None, Some(index), &ctx)?;

        let prev = std::mem::replace(&mut self.items[index], typed);
        if let Err(err) = post_check(&self.binding, &self.to_value()) {
            self.items[index] = prev;
            return Err(err);
        }
        Ok(())
    }

    pub fn to_value(&self) -> Value {
        Value::Tuple(self.items.iter().map(TypedValue::to_value).collect())
    }

    pub(crate) fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut TypedValue)) {
        for child in &mut self.items {
            f(child);
        }
    }
}
