//! The schema type capability: validate, normalize, and default raw values.
//!
//! Every validator in the hierarchy implements [`SchemaType`]. The trait is
//! object safe and validators are always handled as `Arc<dyn SchemaType>`
//! ([`ArcType`]): the typed value produced by validation keeps a handle to the
//! exact validator instance that produced it, so containers can re-validate
//! children on mutation without re-resolving anything.
//!
//! The split between [`SchemaType::validate_self`] (shape-only, no recursion
//! into children) and the full recursive build is what drives or-type
//! disambiguation and cheap container self-checks after partial mutation.

use crate::container::{Binding, TypedValue};
use crate::error::{ValidationError, ValidationResult};
use crate::schema::registry::SchemaRegistry;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a schema type.
pub type ArcType = Arc<dyn SchemaType>;

/// Ceiling on schema recursion depth during validation and default
/// construction. A self-referential schema (legal to author, impossible to
/// satisfy) hits this instead of overflowing the stack.
pub const MAX_VALIDATION_DEPTH: usize = 64;

/// Context threaded through every validation call.
///
/// Carries the registry used to resolve named cross-references lazily, and
/// the recursion depth. Contexts are cheap to copy; child validations run
/// under a descended context.
pub struct ValidationContext<'a> {
    registry: &'a Arc<SchemaRegistry>,
    depth: usize,
}

impl<'a> ValidationContext<'a> {
    /// Root context for a validation entered through `registry`.
    pub fn new(registry: &'a Arc<SchemaRegistry>) -> Self {
        Self { registry, depth: 0 }
    }

    /// The registry resolving named references for this validation.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        self.registry
    }

    /// Context for validating one nesting level deeper.
    pub fn descend(&self) -> ValidationResult<ValidationContext<'a>> {
        if self.depth >= MAX_VALIDATION_DEPTH {
            return Err(ValidationError::RecursionLimit {
                limit: MAX_VALIDATION_DEPTH,
            });
        }
        Ok(ValidationContext {
            registry: self.registry,
            depth: self.depth + 1,
        })
    }
}

/// A schema type: a pure description of a shape plus constraints.
///
/// Implementations are stateless apart from their configuration. They know
/// nothing about containers; the container layer calls back into them for
/// every mutation.
pub trait SchemaType: fmt::Debug + Send + Sync {
    /// Kind name of this validator ("Integer", "Struct", ...).
    fn kind(&self) -> &'static str;

    /// Stable textual signature including constraints. Used in error
    /// messages and for conflict detection when struct types are merged.
    fn describe(&self) -> String {
        self.kind().to_string()
    }

    /// Check shape-only constraints and return the normalized raw value,
    /// without recursing into children.
    ///
    /// For scalars this is the whole validation (coercion included). For
    /// compounds it checks arity/size/key-set constraints and returns the
    /// input unchanged; children are only visited by the full build.
    fn validate_self(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<Value>;

    /// Full recursive validation producing a schema-bound typed value.
    ///
    /// `self_arc` is the handle the result's binding keeps; callers go
    /// through [`SchemaTypeExt::validate`], which supplies it.
    fn build(
        &self,
        self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        let normalized = self.validate_self(raw, ctx)?;
        Ok(TypedValue::scalar(
            Binding::anonymous(self_arc.clone(), ctx.registry().clone()),
            normalized,
        ))
    }

    /// The canonical default raw value for this type. Explicitly configured
    /// defaults win; otherwise each type defines its zero value.
    fn default_raw(&self, ctx: &ValidationContext) -> ValidationResult<Value>;

    /// Build the default typed value. Must never fail for a well-formed
    /// schema: the default raw value always validates.
    fn build_default(
        &self,
        self_arc: &ArcType,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        let raw = self.default_raw(ctx)?;
        self.build(self_arc, &raw, ctx)
    }

    /// The schema type governing the child at `key` (structs, mappings) or
    /// `index` (sequences, tuples), if this type has children.
    ///
    /// This is how a container asks "if I set the child at this key to this
    /// raw value, what would the validated child be" without revalidating
    /// the whole container.
    fn child_type(&self, _key: Option<&str>, _index: Option<usize>) -> Option<ArcType> {
        None
    }

    /// Parse a textual rendition of a value of this type, used to coerce
    /// mapping keys and other text-borne scalars. The default treats the
    /// text as a string value; numeric scalars override it to parse.
    fn string_to_value(&self, text: &str, ctx: &ValidationContext) -> ValidationResult<Value> {
        self.validate_self(&Value::Str(text.to_string()), ctx)
    }

    /// Canonical textual rendition of a normalized value of this type,
    /// the inverse of [`SchemaType::string_to_value`].
    fn value_to_string(&self, value: &Value) -> String {
        match value {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Best-effort pre-validation coercion: drop unknown struct fields and,
    /// when `fill` is set, fill missing ones with schema defaults. The
    /// result still goes through strict validation afterwards. The default
    /// leaves the value untouched; compound types override to recurse.
    fn conform_raw(
        &self,
        raw: &Value,
        _fill: bool,
        _ctx: &ValidationContext,
    ) -> ValidationResult<Value> {
        Ok(raw.clone())
    }

    /// Shape-compatibility check used for or-type disambiguation.
    ///
    /// Content of children is never consulted, only the shape-level
    /// constraints `validate_self` enforces.
    fn accepts_shape(&self, raw: &Value, ctx: &ValidationContext) -> bool {
        self.validate_self(raw, ctx).is_ok()
    }

    /// Deep copy: an independent validator with identical constraints,
    /// children recursively copied. Programmatic schema extension works on
    /// copies so registered originals are never mutated.
    fn clone_type(&self) -> ArcType;

    /// Downcasting support.
    fn as_any(&self) -> &dyn Any;
}

/// Entry points on `Arc<dyn SchemaType>` that thread the self-handle into
/// the trait's build methods.
pub trait SchemaTypeExt {
    /// Validate a raw value into a schema-bound typed value.
    fn validate(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<TypedValue>;

    /// Build this type's default value.
    fn make_default(&self, ctx: &ValidationContext) -> ValidationResult<TypedValue>;

    /// Validate a raw value destined for the child at `key`/`index`,
    /// annotating any failure with that position.
    fn validate_child(
        &self,
        raw: &Value,
        key: Option<&str>,
        index: Option<usize>,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue>;
}

impl SchemaTypeExt for ArcType {
    fn validate(&self, raw: &Value, ctx: &ValidationContext) -> ValidationResult<TypedValue> {
        self.build(self, raw, ctx)
    }

    fn make_default(&self, ctx: &ValidationContext) -> ValidationResult<TypedValue> {
        self.build_default(self, ctx)
    }

    fn validate_child(
        &self,
        raw: &Value,
        key: Option<&str>,
        index: Option<usize>,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        let child = self.child_type(key, index).ok_or_else(|| {
            ValidationError::custom(format!(
                "{} has no child at {}",
                self.kind(),
                match (key, index) {
                    (Some(k), _) => format!("key '{k}'"),
                    (_, Some(i)) => format!("index {i}"),
                    _ => "an unspecified position".to_string(),
                }
            ))
        })?;
        let result = child.validate(raw, &ctx.descend()?);
        match (key, index) {
            (Some(k), _) => result.map_err(|e| e.for_field(k)),
            (_, Some(i)) => result.map_err(|e| e.for_index(i)),
            _ => result,
        }
    }
}
