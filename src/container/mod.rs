//! Validating containers: mutable, schema-bound runtime values.
//!
//! Every container wraps validated children together with a [`Binding`]
//! back to the schema type that produced it. Each mutating operation
//! validates the incoming data against the bound child type, applies the
//! change, re-runs the container's structural self-check plus the global
//! validation hook, and rolls back to the pre-mutation state if anything
//! fails. A failed mutation is state-wise indistinguishable from a no-op.
//!
//! # Key Types
//!
//! - [`TypedValue`] - Schema-bound value: scalar or one of the containers
//! - [`StructValue`] - Named-field record with alias-transparent access
//! - [`SeqValue`] / [`TupleValue`] - Ordered collections
//! - [`SetValue`] - Unordered unique elements
//! - [`MapValue`] - Dynamic dictionary with coerced canonical keys

pub mod binding;
pub mod map_value;
pub mod sequence_value;
pub mod set_value;
pub mod struct_value;
pub mod typed;


pub use binding::Binding;
pub use map_value::MapValue;
pub use sequence_value::{SeqValue, TupleValue};
pub use set_value::SetValue;
pub use struct_value::StructValue;
pub use typed::{ScalarValue, TypedValue};

use crate::error::ValidationResult;
use crate::schema::types::ValidationContext;
use crate::value::Value;

/// Post-mutation check shared by all containers: the bound type's
/// structural self-check over the serialized state, then the global
/// validation hook when the value is bound to a named type.
pub(crate) fn post_check(binding: &Binding, raw: &Value) -> ValidationResult<()> {
    let registry = binding.registry().clone();
    let ctx = ValidationContext::new(&registry);
    binding.schema().validate_self(raw, &ctx)?;
    if let Some(name) = binding.type_name() {
        registry.run_global_validator(name, raw)?;
    }
    Ok(())
}
