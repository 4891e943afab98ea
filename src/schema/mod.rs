//! The schema type system: validators, named-type registry, and the
//! schema-file loader.
//!
//! # Key Types
//!
//! - [`SchemaType`] - The validator capability every type implements
//! - [`SchemaRegistry`] - Named-type resolution across schema locations
//! - [`StructType`] / [`SequenceType`] / [`MappingType`] / ... - The
//!   closed set of concrete validators
//! - [`NamedType`] - Lazy cross-reference resolved at validation time
//!
//! # Examples
//!
//! ```rust
//! use docshape::schema::primitives::{IntegerType, StringType};
//! use docshape::schema::structure::StructType;
//!
//! # fn main() -> Result<(), docshape::error::DocshapeError> {
//! let point = StructType::builder()
//!     .field("label", StringType::new().into_type())
//!     .field("weight", IntegerType::new().with_min(0).into_type())
//!     .build()?;
//! # let _ = point;
//! # Ok(())
//! # }
//! ```

pub mod class;
pub mod collections;
pub mod loader;
pub mod mapping;
pub mod primitives;
pub mod reference;
pub mod registry;
pub mod structure;
pub mod types;
pub mod union;

#[cfg(test)]
mod tests;

// Re-export the main types for convenience
pub use class::{ClassType, CustomScalar, ScalarTable};
pub use collections::{SequenceType, SetType, SizeConstraint, TupleType};
pub use loader::JsonSchemaSource;
pub use mapping::MappingType;
pub use primitives::{BooleanType, IntegerType, RealType, StringType};
pub use reference::NamedType;
pub use registry::{
    InMemorySource, RegistryExt, SchemaFile, SchemaFileBuilder, SchemaRegistry, SchemaSource,
    shared_registry,
};
pub use structure::{StructBuilder, StructMode, StructType};
pub use types::{ArcType, MAX_VALIDATION_DEPTH, SchemaType, SchemaTypeExt, ValidationContext};
pub use union::{DeprecatedType, OptionalType, OrType};
