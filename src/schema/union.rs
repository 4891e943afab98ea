//! Union and modifier schema types: Or, Optional, Deprecated.
//!
//! Or-type disambiguation is type-shape-based, not content-based:
//! alternatives are tried in declared order and the first whose shape-level
//! check accepts the value wins. Once a compound alternative starts
//! consuming children there is no backtracking, so unions of structurally
//! identical compounds are order-dependent. That tradeoff is deliberate
//! and tested, not an oversight to engineer around.

use crate::container::{Binding, TypedValue};
use crate::error::{ValidationError, ValidationResult};
use crate::schema::types::{ArcType, SchemaType, SchemaTypeExt, ValidationContext};
use crate::value::Value;
use log::warn;
use std::any::Any;
use std::sync::Arc;

/// Union of alternative schema types, resolved in declared order.
#[derive(Debug)]
pub struct OrType {
    alternatives: Vec<ArcType>,
}

impl OrType {
    pub fn new(alternatives: impl IntoIterator<Item = ArcType>) -> Self {
        Self {
            alternatives: alternatives.into_iter().collect(),
        }
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }

    fn no_match(&self) -> ValidationError {
        ValidationError::NoAlternativeMatched {
            alternatives: self.alternatives.iter().map(|a| a.describe()).collect(),
        }
    }

    /// First declared alternative whose shape check accepts the value.
    fn select(&self, raw: &Value, ctx: &ValidationContext) -> Option<&ArcType> {
        self.alternatives.iter().find(|alt| alt.accepts_shape(raw, ctx))
    }
}

impl SchemaType for OrType {
    fn kind(&self) -> &'static str {
        "Or"
    }

    fn describe(&self) -> String {
        format!(
            "Or[{}]",
            self.alternatives
                .iter()
                .map(|a| a.describe())
                .collect::<Vec<_>>()
                .join(" | ")
        )
    }

    fn validate_self(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<Value> {
        // alternative failures are swallowed; only "nothing matched" surfaces
        match self.select(raw, ctx) {
            Some(alt) => alt.validate_self(raw, ctx),
            None => Err(self.no_match()),
        }
    }

    fn build(
        &self,
        _self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        // commit to the first shape match; no backtracking if its children fail
        let alt = self.select(raw, ctx).ok_or_else(|| self.no_match())?;
        alt.validate(raw, &ctx.descend()?)
    }

    fn default_raw(&self, ctx: &ValidationContext) -> ValidationResult<Value> {
        match self.alternatives.first() {
            Some(alt) => alt.default_raw(&ctx.descend()?),
            None => Err(ValidationError::custom("Or type has no alternatives")),
        }
    }

    fn build_default(
        &self,
        _self_arc: &ArcType,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        match self.alternatives.first() {
            Some(alt) => alt.make_default(&ctx.descend()?),
            None => Err(ValidationError::custom("Or type has no alternatives")),
        }
    }

    fn conform_raw(
        &self,
        raw: &Value,
        fill: bool,
        ctx: &ValidationContext,
    ) -> ValidationResult<Value> {
        match self.select(raw, ctx) {
            Some(alt) => alt.conform_raw(raw, fill, &ctx.descend()?),
            None => Ok(raw.clone()),
        }
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(OrType {
            alternatives: self.alternatives.iter().map(|a| a.clone_type()).collect(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Modifier marking a value (typically a struct field) as
/// absent-without-error. Null is accepted and preserved.
#[derive(Debug)]
pub struct OptionalType {
    inner: ArcType,
}

impl OptionalType {
    pub fn new(inner: ArcType) -> Self {
        Self { inner }
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }

    pub fn inner(&self) -> &ArcType {
        &self.inner
    }
}

impl SchemaType for OptionalType {
    fn kind(&self) -> &'static str {
        "Optional"
    }

    fn describe(&self) -> String {
        format!("Optional[{}]", self.inner.describe())
    }

    fn validate_self(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<Value> {
        match raw {
            Value::Null => Ok(Value::Null),
            other => self.inner.validate_self(other, ctx),
        }
    }

    fn build(
        &self,
        self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        match raw {
            Value::Null => Ok(TypedValue::scalar(
                Binding::anonymous(self_arc.clone(), ctx.registry().clone()),
                Value::Null,
            )),
            other => self.inner.validate(other, &ctx.descend()?),
        }
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        Ok(Value::Null)
    }

    fn conform_raw(
        &self,
        raw: &Value,
        fill: bool,
        ctx: &ValidationContext,
    ) -> ValidationResult<Value> {
        match raw {
            Value::Null => Ok(Value::Null),
            other => self.inner.conform_raw(other, fill, &ctx.descend()?),
        }
    }

    fn child_type(&self, key: Option<&str>, index: Option<usize>) -> Option<ArcType> {
        self.inner.child_type(key, index)
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(OptionalType {
            inner: self.inner.clone_type(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Modifier marking a value as deprecated. Validation forwards to the
/// wrapped type with a warning; the default is the null absent sentinel,
/// which also validates, so retired data can drain away over time.
#[derive(Debug)]
pub struct DeprecatedType {
    inner: ArcType,
    message: Option<String>,
}

impl DeprecatedType {
    pub fn new(inner: ArcType) -> Self {
        Self {
            inner,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }

    fn warn_used(&self) {
        match &self.message {
            Some(msg) => warn!("deprecated value used: {msg}"),
            None => warn!("deprecated value used"),
        }
    }
}

impl SchemaType for DeprecatedType {
    fn kind(&self) -> &'static str {
        "Deprecated"
    }

    fn describe(&self) -> String {
        format!("Deprecated[{}]", self.inner.describe())
    }

    fn validate_self(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<Value> {
        match raw {
            Value::Null => Ok(Value::Null),
            other => {
                self.warn_used();
                self.inner.validate_self(other, ctx)
            }
        }
    }

    fn build(
        &self,
        self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        match raw {
            Value::Null => Ok(TypedValue::scalar(
                Binding::anonymous(self_arc.clone(), ctx.registry().clone()),
                Value::Null,
            )),
            other => {
                self.warn_used();
                self.inner.validate(other, &ctx.descend()?)
            }
        }
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        Ok(Value::Null)
    }

    fn child_type(&self, key: Option<&str>, index: Option<usize>) -> Option<ArcType> {
        self.inner.child_type(key, index)
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(DeprecatedType {
            inner: self.inner.clone_type(),
            message: self.message.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
