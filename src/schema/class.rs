//! Class schema type: validation delegated to an externally supplied
//! scalar implementation.
//!
//! Custom scalars are resolved by name at schema-load time from a
//! registration table (the compile-time counterpart of a dynamically
//! imported companion module). An implementation must default-construct
//! with no arguments via [`CustomScalar::default_value`]; textual
//! round-trip support is optional and falls back to the generic
//! string handling.

use crate::error::ValidationResult;
use crate::schema::types::{ArcType, SchemaType, ValidationContext};
use crate::value::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An externally supplied scalar type the engine can delegate to.
pub trait CustomScalar: fmt::Debug + Send + Sync {
    /// Name the scalar registers under and appears as in schema files.
    fn name(&self) -> &str;

    /// Validate and normalize a raw value.
    fn validate(&self, raw: &Value) -> ValidationResult<Value>;

    /// The value a no-argument construction produces.
    fn default_value(&self) -> Value;

    /// Parse a textual rendition. Defaults to validating the text as-is.
    fn string_to_value(&self, text: &str) -> ValidationResult<Value> {
        self.validate(&Value::Str(text.to_string()))
    }

    /// Canonical textual rendition of a normalized value.
    fn value_to_string(&self, value: &Value) -> String {
        match value {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Registration table mapping scalar names to implementations.
///
/// A table can be attached to a single schema file (the companion-module
/// mechanism: scalars visible only while that file's types are built) or
/// registered process-wide on the registry.
#[derive(Debug, Clone, Default)]
pub struct ScalarTable {
    entries: HashMap<String, Arc<dyn CustomScalar>>,
}

impl ScalarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scalar under its own name.
    pub fn register(&mut self, scalar: Arc<dyn CustomScalar>) {
        self.entries.insert(scalar.name().to_string(), scalar);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CustomScalar>> {
        self.entries.get(name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Schema type wrapping a custom scalar.
#[derive(Debug)]
pub struct ClassType {
    scalar: Arc<dyn CustomScalar>,
}

impl ClassType {
    pub fn new(scalar: Arc<dyn CustomScalar>) -> Self {
        Self { scalar }
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }
}

impl SchemaType for ClassType {
    fn kind(&self) -> &'static str {
        "Class"
    }

    fn describe(&self) -> String {
        format!("Class[{}]", self.scalar.name())
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        self.scalar.validate(raw)
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        Ok(self.scalar.default_value())
    }

    fn string_to_value(&self, text: &str, _ctx: &ValidationContext) -> ValidationResult<Value> {
        self.scalar.string_to_value(text)
    }

    fn value_to_string(&self, value: &Value) -> String {
        self.scalar.value_to_string(value)
    }

    fn clone_type(&self) -> ArcType {
        // scalar implementations are stateless configuration; sharing the
        // handle keeps the copy independent in every observable way
        Arc::new(ClassType {
            scalar: self.scalar.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
