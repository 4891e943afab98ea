//! Error types for schema validation and registry operations.
//!
//! The taxonomy separates "validation ran and the value failed"
//! ([`ValidationError`]) from "there was nothing to validate against"
//! ([`UnknownSchemaError`]), from "the document declares an unsupported
//! format version" ([`VersionError`]), from the configuration-time mistake
//! of naming a field after a container operation ([`ReservedNameError`]).
//! Callers that don't care which one they got can work with the umbrella
//! [`DocshapeError`].

/// Umbrella error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum DocshapeError {
    /// Value/shape/constraint mismatch; the target container is unchanged.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested schema or schema type not found in any configured location.
    #[error(transparent)]
    UnknownSchema(#[from] UnknownSchemaError),

    /// Document format version outside the supported range.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// A declared name collides with a container's built-in operation names.
    #[error(transparent)]
    ReservedName(#[from] ReservedNameError),
}

/// Validation errors raised while checking a value against a schema type.
///
/// Structural errors raised deep in a recursive validate/mutate call are
/// annotated with field/key/index context at each unwinding frame (the
/// `ForField`/`ForKey`/`ForIndex` wrappers) and re-raised until they reach
/// the mutation boundary.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Value has the wrong primitive kind for the schema type.
    #[error("Expected {expected}, got {actual}")]
    InvalidType { expected: String, actual: String },

    /// Numeric value outside an inclusive min/max range.
    #[error("Value {value} is outside the permitted range [{min}, {max}]")]
    OutOfRange {
        value: String,
        min: String,
        max: String,
    },

    /// Value not a member of a declared enumeration.
    #[error("Value {value} is not one of the permitted enum values {allowed:?}")]
    InvalidEnumValue { value: String, allowed: Vec<String> },

    /// String not in the declared choice set.
    #[error("Value '{value}' is not one of the permitted choices {allowed:?}")]
    InvalidChoice { value: String, allowed: Vec<String> },

    /// String does not match the declared pattern.
    #[error("Value '{value}' does not match pattern '{pattern}'")]
    PatternMismatch { value: String, pattern: String },

    /// String not recognized as a boolean literal.
    #[error("Value '{value}' is not a recognized boolean literal")]
    InvalidBooleanLiteral { value: String },

    /// Collection size violates an exact or bounded size constraint.
    #[error("Size {actual} violates the size constraint {constraint}")]
    InvalidSize { actual: usize, constraint: String },

    /// Required struct field absent from supplied data.
    #[error("Required field '{field}' is missing")]
    MissingRequiredField { field: String },

    /// Key not declared by the struct type (strict mode).
    #[error("Unknown field '{field}'")]
    UnknownField { field: String },

    /// A field and its alias were both supplied with differing values.
    #[error("Conflicting values supplied for field '{field}' and its alias '{alias}'")]
    AliasConflict { field: String, alias: String },

    /// No alternative of an or-type accepted the value.
    #[error("Value matches none of the alternatives: {alternatives:?}")]
    NoAlternativeMatched { alternatives: Vec<String> },

    /// Two merged struct types declare the same field differently.
    #[error("Field '{field}' is declared as both {left} and {right}")]
    MergeConflict {
        field: String,
        left: String,
        right: String,
    },

    /// A named cross-reference could not be resolved mid-validation.
    #[error("Cannot resolve schema type reference '{reference}': {message}")]
    UnresolvedReference { reference: String, message: String },

    /// Schema cross-references recursed past the depth ceiling.
    #[error("Validation exceeded the recursion depth limit of {limit}")]
    RecursionLimit { limit: usize },

    /// Child error annotated with the struct field it occurred under.
    #[error("Invalid value for field '{field}': {source}")]
    ForField {
        field: String,
        #[source]
        source: Box<ValidationError>,
    },

    /// Child error annotated with the mapping key it occurred under.
    #[error("Invalid value for key '{key}': {source}")]
    ForKey {
        key: String,
        #[source]
        source: Box<ValidationError>,
    },

    /// Child error annotated with the sequence/tuple index it occurred under.
    #[error("Invalid value at index {index}: {source}")]
    ForIndex {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    /// Cross-field veto from a registered global validator.
    #[error("Global validation for '{type_name}' failed: {message}")]
    GlobalVeto { type_name: String, message: String },

    /// General validation error with a custom message.
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl ValidationError {
    /// Create an invalid type error.
    pub fn invalid_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidType {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a missing required field error.
    pub fn missing_required(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Create a custom validation error.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    /// Annotate this error with the struct field it was raised under.
    pub fn for_field(self, field: impl Into<String>) -> Self {
        Self::ForField {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Annotate this error with the mapping key it was raised under.
    pub fn for_key(self, key: impl Into<String>) -> Self {
        Self::ForKey {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// Annotate this error with the element index it was raised under.
    pub fn for_index(self, index: usize) -> Self {
        Self::ForIndex {
            index,
            source: Box::new(self),
        }
    }
}

/// Requested schema or schema type could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum UnknownSchemaError {
    /// No configured location supplies the named schema file.
    #[error("Schema '{schema}' not found in any configured location")]
    SchemaNotFound { schema: String },

    /// The schema file loaded but does not declare the named type.
    #[error("Schema '{schema}' does not declare a type named '{type_name}'")]
    TypeNotFound { schema: String, type_name: String },

    /// A type reference was not a dotted `schema.TypeName` name.
    #[error("Malformed schema type reference '{reference}'")]
    MalformedReference { reference: String },

    /// A Class type names a custom scalar with no registered implementation.
    #[error("Custom scalar '{name}' is not registered")]
    ScalarNotRegistered { name: String },

    /// The schema file exists but could not be parsed or compiled.
    #[error("Schema '{schema}' failed to load: {message}")]
    LoadFailed { schema: String, message: String },
}

/// Document declares a format version outside the supported range.
#[derive(Debug, thiserror::Error)]
#[error("Document declares format version {declared}, supported range is {min}..={max}")]
pub struct VersionError {
    pub declared: u32,
    pub min: u32,
    pub max: u32,
}

/// A declared field name collides with a container's built-in operations.
#[derive(Debug, thiserror::Error)]
#[error("Name '{name}' is reserved by the {container} container")]
pub struct ReservedNameError {
    pub name: String,
    pub container: &'static str,
}

// Result type aliases for convenience
pub type SchemaResult<T> = Result<T, DocshapeError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
