//! Behavior attachment: extra operations resolved by schema-type name.
//!
//! External code can register a [`Behavior`] for a qualified schema-type
//! name. Values produced by `validate()`, `make_default()`, or `copy()` for
//! that name automatically carry a handle to the registered behavior; a
//! behavior bound explicitly with [`TypedValue::bind_behavior`] is preserved
//! across re-validation and copies instead of being overwritten.
//!
//! Behavior is a polymorphic capability set resolved by name in the
//! process-wide registry. It never changes the value's own type identity:
//! dispatch goes through [`Behavior::invoke`], not through the value.
//!
//! [`TypedValue::bind_behavior`]: crate::container::TypedValue::bind_behavior

use crate::container::TypedValue;
use crate::error::ValidationResult;
use crate::value::Value;
use std::fmt;

/// A set of named operations attachable to values of one schema type.
pub trait Behavior: fmt::Debug + Send + Sync {
    /// Names of the operations this behavior provides.
    fn operations(&self) -> Vec<&str>;

    /// Invoke a named operation against a value.
    ///
    /// The value is read-only from the behavior's point of view; an
    /// operation that wants to mutate returns a replacement raw value for
    /// the caller to apply through the normal validating mutators.
    fn invoke(&self, value: &TypedValue, operation: &str, args: &[Value])
    -> ValidationResult<Value>;
}
