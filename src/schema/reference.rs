//! Named cross-references between schema types.
//!
//! A [`NamedType`] holds a qualified `schema.TypeName` reference and
//! resolves it through the registry at validation time, never at
//! construction time. Schema files can therefore reference each other
//! forward and mutually; a reference only has to resolve by first use.
//! The value a reference produces is bound to the resolved concrete type
//! and carries the qualified name, which is what behavior attachment and
//! global validation hooks key on.

use crate::container::TypedValue;
use crate::error::{ValidationError, ValidationResult};
use crate::schema::types::{ArcType, SchemaType, SchemaTypeExt, ValidationContext};
use crate::value::Value;
use std::any::Any;
use std::sync::Arc;

/// Lazy reference to a registered schema type by qualified name.
#[derive(Debug, Clone)]
pub struct NamedType {
    name: String,
}

impl NamedType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }

    /// The qualified `schema.TypeName` this reference points at.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, ctx: &ValidationContext) -> ValidationResult<ArcType> {
        ctx.registry().resolve_type(&self.name).map_err(|e| {
            ValidationError::UnresolvedReference {
                reference: self.name.clone(),
                message: e.to_string(),
            }
        })
    }
}

impl SchemaType for NamedType {
    fn kind(&self) -> &'static str {
        "Ref"
    }

    fn describe(&self) -> String {
        format!("Ref[{}]", self.name)
    }

    fn validate_self(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<Value> {
        let target = self.resolve(ctx)?;
        target.validate_self(raw, &ctx.descend()?)
    }

    fn build(
        &self,
        _self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        let target = self.resolve(ctx)?;
        let mut typed = target.validate(raw, &ctx.descend()?)?;
        typed.bind_name(&self.name);
        ctx.registry()
            .run_global_validator(&self.name, &typed.to_value())?;
        Ok(typed)
    }

    fn default_raw(&self, ctx: &ValidationContext) -> ValidationResult<Value> {
        let target = self.resolve(ctx)?;
        target.default_raw(&ctx.descend()?)
    }

    fn build_default(
        &self,
        _self_arc: &ArcType,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        let target = self.resolve(ctx)?;
        let mut typed = target.make_default(&ctx.descend()?)?;
        typed.bind_name(&self.name);
        ctx.registry()
            .run_global_validator(&self.name, &typed.to_value())?;
        Ok(typed)
    }

    fn string_to_value(&self, text: &str, ctx: &ValidationContext) -> ValidationResult<Value> {
        let target = self.resolve(ctx)?;
        target.string_to_value(text, &ctx.descend()?)
    }

    fn conform_raw(
        &self,
        raw: &Value,
        fill: bool,
        ctx: &ValidationContext,
    ) -> ValidationResult<Value> {
        let target = self.resolve(ctx)?;
        target.conform_raw(raw, fill, &ctx.descend()?)
    }

    fn accepts_shape(&self, raw: &Value, ctx: &ValidationContext) -> bool {
        match self.resolve(ctx) {
            Ok(target) => match ctx.descend() {
                Ok(child_ctx) => target.accepts_shape(raw, &child_ctx),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
