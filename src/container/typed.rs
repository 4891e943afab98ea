//! The schema-bound runtime value.
//!
//! [`TypedValue`] is what validation produces: either a scalar carrying its
//! normalized raw value, or one of the validating containers. Every variant
//! holds a [`Binding`] back to the schema type that produced it, so nested
//! mutation re-validates against the correct child schema and behavior
//! lookups work anywhere in the tree.
//!
//! Equality and ordering compare normalized values only; bindings and
//! attached behavior are invisible to comparisons.

use crate::behavior::Behavior;
use crate::container::binding::Binding;
use crate::container::map_value::MapValue;
use crate::container::sequence_value::{SeqValue, TupleValue};
use crate::container::set_value::SetValue;
use crate::container::struct_value::StructValue;
use crate::error::{ValidationError, ValidationResult};
use crate::schema::types::{ArcType, ValidationContext};
use crate::value::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// A scalar value with its schema binding.
#[derive(Debug, Clone)]
pub struct ScalarValue {
    pub(crate) binding: Binding,
    pub(crate) value: Value,
}

impl ScalarValue {
    /// The normalized raw value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A runtime value bound to the schema type that validated it.
#[derive(Debug, Clone)]
pub enum TypedValue {
    Scalar(ScalarValue),
    Struct(StructValue),
    Seq(SeqValue),
    Tuple(TupleValue),
    Set(SetValue),
    Map(MapValue),
}

impl TypedValue {
    /// Wrap a normalized scalar under a binding.
    pub fn scalar(binding: Binding, value: Value) -> Self {
        TypedValue::Scalar(ScalarValue { binding, value })
    }

    /// The binding back to the schema type that produced this value.
    pub fn binding(&self) -> &Binding {
        match self {
            TypedValue::Scalar(v) => &v.binding,
            TypedValue::Struct(v) => &v.binding,
            TypedValue::Seq(v) => &v.binding,
            TypedValue::Tuple(v) => &v.binding,
            TypedValue::Set(v) => &v.binding,
            TypedValue::Map(v) => &v.binding,
        }
    }

    fn binding_mut(&mut self) -> &mut Binding {
        match self {
            TypedValue::Scalar(v) => &mut v.binding,
            TypedValue::Struct(v) => &mut v.binding,
            TypedValue::Seq(v) => &mut v.binding,
            TypedValue::Tuple(v) => &mut v.binding,
            TypedValue::Set(v) => &mut v.binding,
            TypedValue::Map(v) => &mut v.binding,
        }
    }

    /// The schema type this value is bound to.
    pub fn schema_type(&self) -> &ArcType {
        self.binding().schema()
    }

    /// Qualified schema-type name, when bound to a named type.
    pub fn type_name(&self) -> Option<&str> {
        self.binding().type_name()
    }

    /// Serialize back to the raw primitive tree (the write path handed to
    /// the document I/O adapter).
    pub fn to_value(&self) -> Value {
        match self {
            TypedValue::Scalar(v) => v.value.clone(),
            TypedValue::Struct(v) => v.to_value(),
            TypedValue::Seq(v) => v.to_value(),
            TypedValue::Tuple(v) => v.to_value(),
            TypedValue::Set(v) => v.to_value(),
            TypedValue::Map(v) => v.to_value(),
        }
    }

    /// Copy this value.
    ///
    /// A shallow copy re-wraps the immediate value under the same binding; a
    /// deep copy also refreshes bindings recursively through nested
    /// containers. Either way the registry behavior lookup re-runs, unless a
    /// behavior was explicitly bound, which is preserved.
    pub fn copy(&self, deep: bool) -> TypedValue {
        let mut out = self.clone();
        if deep {
            out.refresh_behavior_recursive();
        } else {
            out.binding_mut().refresh_behavior();
        }
        out
    }

    fn refresh_behavior_recursive(&mut self) {
        self.binding_mut().refresh_behavior();
        match self {
            TypedValue::Scalar(_) => {}
            TypedValue::Struct(v) => v.for_each_child_mut(|c| c.refresh_behavior_recursive()),
            TypedValue::Seq(v) => v.for_each_child_mut(|c| c.refresh_behavior_recursive()),
            TypedValue::Tuple(v) => v.for_each_child_mut(|c| c.refresh_behavior_recursive()),
            TypedValue::Set(v) => v.for_each_child_mut(|c| c.refresh_behavior_recursive()),
            TypedValue::Map(v) => v.for_each_child_mut(|c| c.refresh_behavior_recursive()),
        }
    }

    /// Bind this value to a qualified schema-type name, attaching any
    /// registered behavior for that name.
    pub(crate) fn bind_name(&mut self, name: &str) {
        self.binding_mut().bind_name(name);
    }

    /// Explicitly bind a behavior to this value.
    pub fn bind_behavior(&mut self, behavior: Arc<dyn Behavior>) {
        self.binding_mut().bind_behavior(behavior);
    }

    /// The behavior attached to this value, if any.
    pub fn behavior(&self) -> Option<&Arc<dyn Behavior>> {
        self.binding().behavior()
    }

    /// Invoke a named behavior operation against this value.
    pub fn invoke(&self, operation: &str, args: &[Value]) -> ValidationResult<Value> {
        let behavior = self.behavior().ok_or_else(|| {
            ValidationError::custom(format!(
                "No behavior attached for operation '{operation}'"
            ))
        })?;
        behavior.invoke(self, operation, args)
    }

    /// Re-run this value's structural self-check and global validation hook.
    ///
    /// Used by containers after mutation and by scoped validation pauses at
    /// scope exit.
    pub fn revalidate(&self) -> ValidationResult<()> {
        let raw = self.to_value();
        let registry = self.binding().registry().clone();
        let ctx = ValidationContext::new(&registry);
        self.schema_type().validate_self(&raw, &ctx)?;
        if let Some(name) = self.type_name() {
            registry.run_global_validator(name, &raw)?;
        }
        Ok(())
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            TypedValue::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            TypedValue::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&SeqValue> {
        match self {
            TypedValue::Seq(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut SeqValue> {
        match self {
            TypedValue::Seq(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleValue> {
        match self {
            TypedValue::Tuple(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tuple_mut(&mut self) -> Option<&mut TupleValue> {
        match self {
            TypedValue::Tuple(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetValue> {
        match self {
            TypedValue::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut SetValue> {
        match self {
            TypedValue::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            TypedValue::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut MapValue> {
        match self {
            TypedValue::Map(v) => Some(v),
            _ => None,
        }
    }

    /// The normalized scalar value, when this is a scalar.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            TypedValue::Scalar(v) => Some(&v.value),
            _ => None,
        }
    }
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        self.to_value() == other.to_value()
    }
}

impl Eq for TypedValue {}

impl PartialOrd for TypedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.to_value().cmp(&other.to_value()))
    }
}

impl Ord for TypedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_value().cmp(&other.to_value())
    }
}

impl PartialEq<Value> for TypedValue {
    fn eq(&self, other: &Value) -> bool {
        self.to_value() == *other
    }
}
