//! Schema-driven data description and validation engine.
//!
//! `docshape` pairs a schema type system with validating containers: a
//! schema describes the shape, constraints, and defaults of permitted
//! documents, and the typed values validation produces re-validate on
//! every in-place mutation, rolling back atomically on failure. Named
//! schema types live in a registry with a configurable search path and
//! resolve lazily, so schema files can reference each other forward and
//! mutually.
//!
//! # Core Components
//!
//! - [`schema::SchemaType`] - The validator hierarchy (primitives,
//!   collections, structs, mappings, unions, references)
//! - [`container::TypedValue`] - Schema-bound values with transactional
//!   mutation semantics
//! - [`schema::SchemaRegistry`] - Named-type resolution, behavior and
//!   global-validator tables
//! - [`document`] - Metadata header parsing and version gating
//!
//! # Quick Start
//!
//! ```rust
//! use docshape::schema::{InMemorySource, RegistryExt, SchemaFile, SchemaRegistry};
//! use docshape::schema::primitives::{IntegerType, StringType};
//! use docshape::schema::structure::StructType;
//! use docshape::value::Value;
//!
//! # fn main() -> Result<(), docshape::error::DocshapeError> {
//! let point = StructType::builder()
//!     .field("label", StringType::new().into_type())
//!     .field("weight", IntegerType::new().with_min(0).into_type())
//!     .build()?;
//!
//! let file = SchemaFile::builder("demo")
//!     .ty("Point", std::sync::Arc::new(point))
//!     .build();
//! let registry = SchemaRegistry::shared(vec![Box::new(
//!     InMemorySource::new().with_file(file),
//! )]);
//!
//! let raw = Value::Map(
//!     [
//!         ("label".to_string(), Value::Str("origin".into())),
//!         ("weight".to_string(), Value::Int(3)),
//!     ]
//!     .into(),
//! );
//! let mut point = registry.validate(&raw, "demo.Point")?;
//!
//! // mutations re-validate; failures roll back
//! let fields = point.as_struct_mut().expect("struct value");
//! assert!(fields.set("weight", Value::Int(-1)).is_err());
//! assert_eq!(fields.get("weight").map(|v| v.to_value()), Some(Value::Int(3)));
//! # Ok(())
//! # }
//! ```

pub mod behavior;
pub mod container;
pub mod document;
pub mod error;
pub mod hooks;
pub mod schema;
pub mod value;

// Re-export commonly used types for convenience
pub use behavior::Behavior;
pub use container::{MapValue, SeqValue, SetValue, StructValue, TupleValue, TypedValue};
pub use document::{Document, DocumentHeader, load_document};
pub use error::{
    DocshapeError, ReservedNameError, SchemaResult, UnknownSchemaError, ValidationError,
    ValidationResult, VersionError,
};
pub use hooks::{GlobalValidator, ValidationPause, with_paused_validation};
pub use schema::{RegistryExt, SchemaRegistry, SchemaType, SchemaTypeExt, shared_registry};
pub use value::Value;
