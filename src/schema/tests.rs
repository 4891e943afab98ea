//! Tests for the schema type hierarchy and registry.
//!
//! Covers scalar coercion rules, collection constraints, struct field
//! resolution (aliases, deprecation, compatibility mode), or-type
//! disambiguation, named cross-references, the JSON loader, and the
//! conform pre-pass.

use super::class::{CustomScalar, ScalarTable};
use super::collections::{SequenceType, SetType, TupleType};
use super::loader::JsonSchemaSource;
use super::mapping::MappingType;
use super::primitives::{BooleanType, IntegerType, RealType, StringType};
use super::reference::NamedType;
use super::registry::{InMemorySource, RegistryExt, SchemaFile, SchemaRegistry, shared_registry};
use super::structure::StructType;
use super::types::{ArcType, SchemaTypeExt, ValidationContext};
use super::union::{DeprecatedType, OptionalType, OrType};
use crate::error::{DocshapeError, UnknownSchemaError, ValidationError, ValidationResult};
use crate::value::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

fn empty_registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::new())
}

fn map(entries: &[(&str, Value)]) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

fn set_of(values: impl IntoIterator<Item = Value>) -> Value {
    Value::Set(values.into_iter().collect::<BTreeSet<_>>())
}

fn validate(ty: &ArcType, raw: Value) -> ValidationResult<Value> {
    let registry = empty_registry();
    let ctx = ValidationContext::new(&registry);
    ty.validate(&raw, &ctx).map(|typed| typed.to_value())
}

fn default_of(ty: &ArcType) -> Value {
    let registry = empty_registry();
    let ctx = ValidationContext::new(&registry);
    ty.make_default(&ctx)
        .expect("default must validate")
        .to_value()
}

#[test]
fn test_boolean_literal_coercion() {
    let ty = BooleanType::new().into_type();
    for literal in ["1", "yes", "ON", "True"] {
        assert_eq!(
            validate(&ty, Value::Str(literal.into())).expect("true literal"),
            Value::Bool(true)
        );
    }
    for literal in ["0", "no", "OFF", "False"] {
        assert_eq!(
            validate(&ty, Value::Str(literal.into())).expect("false literal"),
            Value::Bool(false)
        );
    }
    assert!(matches!(
        validate(&ty, Value::Str("maybe".into())),
        Err(ValidationError::InvalidBooleanLiteral { .. })
    ));
    assert!(matches!(
        validate(&ty, Value::Int(1)),
        Err(ValidationError::InvalidType { .. })
    ));
}

#[test]
fn test_integer_enum_duality() {
    let ty = IntegerType::new()
        .with_enum([("on", 1), ("off", 0)])
        .into_type();
    assert_eq!(validate(&ty, Value::Int(1)).expect("value form"), Value::Int(1));
    assert_eq!(
        validate(&ty, Value::Str("on".into())).expect("name form"),
        Value::Int(1)
    );
    assert!(matches!(
        validate(&ty, Value::Int(2)),
        Err(ValidationError::InvalidEnumValue { .. })
    ));
    assert!(matches!(
        validate(&ty, Value::Str("maybe".into())),
        Err(ValidationError::InvalidEnumValue { .. })
    ));
}

#[test]
fn test_integer_range_inclusive_and_skipped_for_enums() {
    let ranged = IntegerType::new().with_min(0).with_max(10).into_type();
    assert!(validate(&ranged, Value::Int(0)).is_ok());
    assert!(validate(&ranged, Value::Int(10)).is_ok());
    assert!(matches!(
        validate(&ranged, Value::Int(11)),
        Err(ValidationError::OutOfRange { .. })
    ));

    // enum membership replaces the range check entirely
    let enumed = IntegerType::new()
        .with_min(0)
        .with_max(10)
        .with_enum([("big", 100)])
        .into_type();
    assert!(validate(&enumed, Value::Int(100)).is_ok());
}

#[test]
fn test_real_widens_integers() {
    let ty = RealType::new().with_min(0.0).with_max(1.0).into_type();
    assert_eq!(validate(&ty, Value::Int(1)).expect("widened"), Value::Real(1.0));
    assert!(matches!(
        validate(&ty, Value::Real(1.5)),
        Err(ValidationError::OutOfRange { .. })
    ));
}

#[test]
fn test_string_constraints() {
    let choices = StringType::new().with_choices(["a", "b"]).into_type();
    assert!(validate(&choices, Value::Str("a".into())).is_ok());
    assert!(matches!(
        validate(&choices, Value::Str("c".into())),
        Err(ValidationError::InvalidChoice { .. })
    ));

    let pattern = StringType::new()
        .with_pattern("^[a-z]+$")
        .expect("valid pattern")
        .with_default("abc")
        .into_type();
    assert!(validate(&pattern, Value::Str("abc".into())).is_ok());
    assert!(matches!(
        validate(&pattern, Value::Str("ABC".into())),
        Err(ValidationError::PatternMismatch { .. })
    ));
}

#[test]
fn test_string_strictness() {
    let lenient = StringType::new().into_type();
    assert_eq!(
        validate(&lenient, Value::Int(5)).expect("stringified"),
        Value::Str("5".into())
    );

    let strict = StringType::new().strict().into_type();
    assert!(matches!(
        validate(&strict, Value::Int(5)),
        Err(ValidationError::InvalidType { .. })
    ));
}

#[test]
fn test_sequence_size_constraints() {
    let ty = SequenceType::new(IntegerType::new().into_type())
        .with_min_size(1)
        .with_max_size(3)
        .into_type();
    assert!(validate(&ty, Value::Seq(vec![Value::Int(1)])).is_ok());
    assert!(matches!(
        validate(&ty, Value::Seq(vec![])),
        Err(ValidationError::InvalidSize { .. })
    ));
    let too_long: Vec<Value> = (0..4).map(Value::Int).collect();
    assert!(matches!(
        validate(&ty, Value::Seq(too_long)),
        Err(ValidationError::InvalidSize { .. })
    ));
    // child errors carry their index
    let err = validate(&ty, Value::Seq(vec![Value::Str("x".into())])).unwrap_err();
    assert!(matches!(err, ValidationError::ForIndex { index: 0, .. }));
}

#[test]
fn test_sequence_defaults() {
    let explicit = SequenceType::new(StringType::new().into_type())
        .with_min_size(1)
        .with_max_size(3)
        .with_default([Value::Str("a".into())])
        .into_type();
    assert_eq!(default_of(&explicit), Value::Seq(vec![Value::Str("a".into())]));

    // without an explicit default, min_size copies of the element default
    let implicit = SequenceType::new(IntegerType::new().with_min(2).into_type())
        .with_min_size(2)
        .into_type();
    assert_eq!(
        default_of(&implicit),
        Value::Seq(vec![Value::Int(2), Value::Int(2)])
    );
}

#[test]
fn test_tuple_arity_and_positions() {
    let ty = TupleType::new([
        IntegerType::new().into_type(),
        StringType::new().strict().into_type(),
    ])
    .into_type();
    assert!(validate(&ty, Value::Tuple(vec![Value::Int(1), Value::Str("x".into())])).is_ok());
    assert!(matches!(
        validate(&ty, Value::Tuple(vec![Value::Int(1)])),
        Err(ValidationError::InvalidSize { .. })
    ));
    // a sequence is not a tuple
    assert!(matches!(
        validate(&ty, Value::Seq(vec![Value::Int(1), Value::Str("x".into())])),
        Err(ValidationError::InvalidType { .. })
    ));
}

#[test]
fn test_set_collapses_equivalent_elements() {
    let ty = SetType::new(
        IntegerType::new().with_enum([("on", 1), ("off", 0)]).into_type(),
    )
    .into_type();
    // "on" and 1 normalize to the same element
    let raw = set_of([Value::Str("on".into()), Value::Int(1), Value::Int(0)]);
    let normalized = validate(&ty, raw).expect("set validates");
    assert_eq!(normalized, set_of([Value::Int(0), Value::Int(1)]));
}

fn point_type() -> ArcType {
    Arc::new(
        StructType::builder()
            .field("x", RealType::new().into_type())
            .field("y", RealType::new().into_type())
            .field("label", OptionalType::new(StringType::new().strict().into_type()).into_type())
            .alias("tag", "label")
            .build()
            .expect("valid struct"),
    )
}

#[test]
fn test_struct_required_and_unknown_fields() {
    let ty = point_type();
    let ok = map(&[("x", Value::Real(1.0)), ("y", Value::Real(2.0))]);
    assert!(validate(&ty, ok).is_ok());

    let missing = map(&[("x", Value::Real(1.0))]);
    assert!(matches!(
        validate(&ty, missing),
        Err(ValidationError::MissingRequiredField { .. })
    ));

    let unknown = map(&[
        ("x", Value::Real(1.0)),
        ("y", Value::Real(2.0)),
        ("z", Value::Real(3.0)),
    ]);
    assert!(matches!(
        validate(&ty, unknown),
        Err(ValidationError::UnknownField { .. })
    ));
}

#[test]
fn test_struct_alias_resolution() {
    let ty = point_type();
    let via_alias = map(&[
        ("x", Value::Real(0.0)),
        ("y", Value::Real(0.0)),
        ("tag", Value::Str("origin".into())),
    ]);
    let typed = {
        let registry = empty_registry();
        let ctx = ValidationContext::new(&registry);
        ty.validate(&via_alias, &ctx).expect("alias accepted")
    };
    let fields = typed.as_struct().expect("struct value");
    // alias and canonical name observe the same value
    assert_eq!(
        fields.get("label").map(|v| v.to_value()),
        Some(Value::Str("origin".into()))
    );
    assert_eq!(
        fields.get("tag").map(|v| v.to_value()),
        Some(Value::Str("origin".into()))
    );
}

#[test]
fn test_struct_alias_conflict() {
    let ty = point_type();
    let conflicting = map(&[
        ("x", Value::Real(0.0)),
        ("y", Value::Real(0.0)),
        ("label", Value::Str("a".into())),
        ("tag", Value::Str("b".into())),
    ]);
    assert!(matches!(
        validate(&ty, conflicting),
        Err(ValidationError::AliasConflict { .. })
    ));

    // agreeing duplicates are fine
    let agreeing = map(&[
        ("x", Value::Real(0.0)),
        ("y", Value::Real(0.0)),
        ("label", Value::Str("a".into())),
        ("tag", Value::Str("a".into())),
    ]);
    assert!(validate(&ty, agreeing).is_ok());
}

#[test]
fn test_struct_deprecated_name_forwards() {
    let ty: ArcType = Arc::new(
        StructType::builder()
            .field("size", IntegerType::new().into_type())
            .deprecated_with_message("length", "size", "renamed in v2")
            .build()
            .expect("valid struct"),
    );
    let normalized = validate(&ty, map(&[("length", Value::Int(4))])).expect("forwards");
    assert_eq!(normalized, map(&[("size", Value::Int(4))]));
}

#[test]
fn test_struct_reserved_field_name_rejected() {
    let err = StructType::builder()
        .field("set", IntegerType::new().into_type())
        .build()
        .unwrap_err();
    assert!(matches!(err, DocshapeError::ReservedName(_)));
}

#[test]
fn test_struct_merge_union_and_conflict() {
    let base = StructType::builder()
        .field("a", IntegerType::new().into_type())
        .build()
        .expect("base");
    let extension = StructType::builder()
        .field("b", StringType::new().into_type())
        .build()
        .expect("extension");
    let merged = base.merged(&extension).expect("merge succeeds");
    let names: Vec<&str> = merged.canonical_field_names().collect();
    assert_eq!(names, vec!["a", "b"]);

    let conflicting = StructType::builder()
        .field("a", StringType::new().into_type())
        .build()
        .expect("conflicting");
    assert!(matches!(
        base.merged(&conflicting),
        Err(ValidationError::MergeConflict { .. })
    ));
}

#[test]
fn test_compatibility_mode_fills_and_tolerates() {
    let ty: ArcType = Arc::new(
        StructType::builder()
            .field("name", StringType::new().strict().into_type())
            .field("count", IntegerType::new().with_default(1).into_type())
            .compatible()
            .build()
            .expect("compat struct"),
    );

    // missing required field filled from schema default
    let old_data = map(&[("name", Value::Str("thing".into()))]);
    let filled = validate(&ty, old_data).expect("compat fill");
    assert_eq!(
        filled,
        map(&[("name", Value::Str("thing".into())), ("count", Value::Int(1))])
    );

    // unknown keys tolerated when all known fields were supplied
    let newer_data = map(&[
        ("name", Value::Str("thing".into())),
        ("count", Value::Int(2)),
        ("flavour", Value::Str("new".into())),
    ]);
    let accepted = validate(&ty, newer_data).expect("forward compatible");
    assert_eq!(
        accepted,
        map(&[("name", Value::Str("thing".into())), ("count", Value::Int(2))])
    );

    // but not when a known field had to be defaulted
    let ambiguous = map(&[
        ("name", Value::Str("thing".into())),
        ("flavour", Value::Str("new".into())),
    ]);
    assert!(matches!(
        validate(&ty, ambiguous),
        Err(ValidationError::UnknownField { .. })
    ));
}

#[test]
fn test_or_disambiguates_by_shape_not_content() {
    let ty = OrType::new([
        IntegerType::new().into_type(),
        StringType::new().into_type(),
    ])
    .into_type();
    // no numeric coercion across the boundary
    assert_eq!(validate(&ty, Value::Int(5)).expect("integer wins"), Value::Int(5));
    assert_eq!(
        validate(&ty, Value::Str("5".into())).expect("string wins"),
        Value::Str("5".into())
    );
    assert!(matches!(
        validate(&ty, Value::Seq(vec![])),
        Err(ValidationError::NoAlternativeMatched { .. })
    ));
}

#[test]
fn test_or_first_declared_wins_between_identical_compounds() {
    let first: ArcType = Arc::new(
        StructType::builder()
            .field("v", IntegerType::new().with_default(1).into_type())
            .build()
            .expect("first"),
    );
    let second: ArcType = Arc::new(
        StructType::builder()
            .field("v", IntegerType::new().with_default(2).into_type())
            .build()
            .expect("second"),
    );
    let ty = OrType::new([first.clone(), second]).into_type();
    let registry = empty_registry();
    let ctx = ValidationContext::new(&registry);
    let typed = ty
        .validate(&map(&[("v", Value::Int(7))]), &ctx)
        .expect("struct accepted");
    // the winning alternative is the first declared one
    assert_eq!(typed.schema_type().describe(), first.describe());
}

#[test]
fn test_or_commits_without_backtracking() {
    // both alternatives accept a mapping shape with key "v"; the first
    // one's child type rejects the value, and no backtracking happens
    let strict_child: ArcType = Arc::new(
        StructType::builder()
            .field("v", IntegerType::new().with_max(0).into_type())
            .build()
            .expect("strict child"),
    );
    let lenient_child: ArcType = Arc::new(
        StructType::builder()
            .field("v", IntegerType::new().into_type())
            .build()
            .expect("lenient child"),
    );
    let ty = OrType::new([strict_child, lenient_child]).into_type();
    let err = validate(&ty, map(&[("v", Value::Int(5))])).unwrap_err();
    assert!(matches!(err, ValidationError::ForField { .. }));
}

#[test]
fn test_optional_and_deprecated_defaults() {
    let optional = OptionalType::new(IntegerType::new().into_type()).into_type();
    assert_eq!(default_of(&optional), Value::Null);
    assert!(validate(&optional, Value::Null).is_ok());
    assert!(validate(&optional, Value::Int(3)).is_ok());

    let deprecated = DeprecatedType::new(IntegerType::new().into_type())
        .with_message("gone in v3")
        .into_type();
    assert_eq!(default_of(&deprecated), Value::Null);
    assert!(validate(&deprecated, Value::Int(3)).is_ok());
}

#[test]
fn test_mapping_key_coercion_and_overrides() {
    let ty = MappingType::new(
        IntegerType::new().with_enum([("on", 1), ("off", 0)]).into_type(),
        StringType::new().into_type(),
    )
    .with_override("1", IntegerType::new().into_type())
    .into_type();

    let raw = map(&[("on", Value::Int(42)), ("off", Value::Str("idle".into()))]);
    let normalized = validate(&ty, raw).expect("mapping validates");
    // "on" files under the canonical key "1" and uses the pinned type
    assert_eq!(
        normalized,
        map(&[("0", Value::Str("idle".into())), ("1", Value::Int(42))])
    );

    // keys that collide after coercion are rejected
    let colliding = map(&[("on", Value::Int(1)), ("1", Value::Int(2))]);
    assert!(validate(&ty, colliding).is_err());
}

#[derive(Debug)]
struct Angle;

impl CustomScalar for Angle {
    fn name(&self) -> &str {
        "Angle"
    }

    fn validate(&self, raw: &Value) -> ValidationResult<Value> {
        let degrees = match raw {
            Value::Int(i) => *i as f64,
            Value::Real(r) => *r,
            other => return Err(ValidationError::invalid_type("angle", other.kind())),
        };
        if !(0.0..360.0).contains(&degrees) {
            return Err(ValidationError::custom("angle out of range"));
        }
        Ok(Value::Real(degrees))
    }

    fn default_value(&self) -> Value {
        Value::Real(0.0)
    }
}

#[test]
fn test_class_delegates_to_custom_scalar() {
    let ty = super::class::ClassType::new(Arc::new(Angle)).into_type();
    assert_eq!(validate(&ty, Value::Int(90)).expect("delegated"), Value::Real(90.0));
    assert!(validate(&ty, Value::Real(400.0)).is_err());
    assert_eq!(default_of(&ty), Value::Real(0.0));
}

fn geo_registry() -> Arc<SchemaRegistry> {
    let point = StructType::builder()
        .field("x", RealType::new().into_type())
        .field("y", RealType::new().into_type())
        .build()
        .expect("point");
    let path = SequenceType::new(NamedType::new("geo.Point").into_type()).with_min_size(1);
    let file = SchemaFile::builder("geo")
        .ty("Point", Arc::new(point))
        .ty("Path", path.into_type())
        .build();
    SchemaRegistry::shared(vec![Box::new(InMemorySource::new().with_file(file))])
}

#[test]
fn test_registry_resolution_and_errors() {
    let registry = geo_registry();
    assert!(registry.resolve_type("geo.Point").is_ok());
    assert!(matches!(
        registry.resolve_type("geo.Missing"),
        Err(UnknownSchemaError::TypeNotFound { .. })
    ));
    assert!(matches!(
        registry.resolve_type("nowhere.Point"),
        Err(UnknownSchemaError::SchemaNotFound { .. })
    ));
    assert!(matches!(
        registry.resolve_type("unqualified"),
        Err(UnknownSchemaError::MalformedReference { .. })
    ));
    assert_eq!(
        registry.list_schema_types().expect("listing loads"),
        vec!["geo.Path".to_string(), "geo.Point".to_string()]
    );
}

#[test]
fn test_named_reference_resolves_lazily() {
    let registry = geo_registry();
    let raw = Value::Seq(vec![map(&[("x", Value::Real(1.0)), ("y", Value::Real(2.0))])]);
    let typed = registry.validate(&raw, "geo.Path").expect("path validates");
    let seq = typed.as_seq().expect("sequence value");
    // elements are bound to the resolved named type
    assert_eq!(seq.get(0).and_then(|v| v.type_name()), Some("geo.Point"));
}

#[test]
fn test_unknown_schema_vs_validation_error() {
    let registry = geo_registry();
    assert!(matches!(
        registry.validate(&Value::Int(1), "nowhere.Point"),
        Err(DocshapeError::UnknownSchema(_))
    ));
    assert!(matches!(
        registry.validate(&Value::Int(1), "geo.Point"),
        Err(DocshapeError::Validation(_))
    ));
}

#[test]
fn test_self_referential_schema_hits_depth_ceiling() {
    let knot = StructType::builder()
        .field("next", NamedType::new("loopy.Knot").into_type())
        .build()
        .expect("knot");
    let file = SchemaFile::builder("loopy")
        .ty("Knot", Arc::new(knot))
        .build();
    let registry =
        SchemaRegistry::shared(vec![Box::new(InMemorySource::new().with_file(file))]);
    let err = registry.make_default("loopy.Knot").unwrap_err();
    assert!(matches!(
        err,
        DocshapeError::Validation(ValidationError::RecursionLimit { .. })
            | DocshapeError::Validation(ValidationError::ForField { .. })
    ));
}

#[test]
fn test_json_loader_end_to_end() {
    let json = r#"{
        "name": "geo",
        "types": {
            "Point": {
                "type": "Struct",
                "fields": [
                    {"name": "x", "spec": {"type": "Real"}},
                    {"name": "y", "spec": {"type": "Real"}},
                    {"name": "pos", "alias": "x"}
                ]
            },
            "Path": {
                "type": "Sequence",
                "element": {"type": "Ref", "target": "Point"},
                "min_size": 1
            },
            "Mode": {
                "type": "Integer",
                "enum": [["fast", 0], ["exact", 1]]
            }
        }
    }"#;
    let source = JsonSchemaSource::new().with_document("geo", json);
    let registry = SchemaRegistry::shared(vec![Box::new(source)]);

    let raw = Value::Seq(vec![map(&[("x", Value::Real(0.0)), ("y", Value::Real(1.0))])]);
    assert!(registry.validate(&raw, "geo.Path").is_ok());
    assert_eq!(
        registry
            .validate(&Value::Str("exact".into()), "geo.Mode")
            .expect("enum by name")
            .to_value(),
        Value::Int(1)
    );
}

#[test]
fn test_json_loader_companion_scalars() {
    let json = r#"{"types": {"Heading": {"type": "Class", "class": "Angle"}}}"#;
    let mut table = ScalarTable::new();
    table.register(Arc::new(Angle));
    let source = JsonSchemaSource::new()
        .with_document("nav", json)
        .with_companion("nav", table);
    let registry = SchemaRegistry::shared(vec![Box::new(source)]);
    assert_eq!(
        registry
            .validate(&Value::Int(45), "nav.Heading")
            .expect("companion scalar resolves")
            .to_value(),
        Value::Real(45.0)
    );

    // without the companion table the class name cannot resolve
    let bare = JsonSchemaSource::new()
        .with_document("nav", r#"{"types": {"Heading": {"type": "Class", "class": "Angle"}}}"#);
    let registry = SchemaRegistry::shared(vec![Box::new(bare)]);
    assert!(matches!(
        registry.resolve_type("nav.Heading"),
        Err(UnknownSchemaError::ScalarNotRegistered { .. })
    ));
}

#[test]
fn test_json_loader_rejects_malformed_documents() {
    let source = JsonSchemaSource::new().with_document("bad", "not json at all");
    let registry = SchemaRegistry::shared(vec![Box::new(source)]);
    assert!(matches!(
        registry.resolve_type("bad.Anything"),
        Err(UnknownSchemaError::LoadFailed { .. })
    ));
}

#[test]
fn test_conform_drops_unknowns_and_fills() {
    let registry = geo_registry();
    let messy = map(&[
        ("x", Value::Real(1.0)),
        ("obsolete", Value::Str("junk".into())),
    ]);
    // without fill the missing field still fails strict validation
    assert!(registry.conform(&messy, "geo.Point", false).is_err());

    let conformed = registry
        .conform(&messy, "geo.Point", true)
        .expect("conform fills and drops");
    assert_eq!(
        conformed.to_value(),
        map(&[("x", Value::Real(1.0)), ("y", Value::Real(0.0))])
    );
}

#[test]
fn test_default_validity_across_types() {
    let types: Vec<ArcType> = vec![
        BooleanType::new().into_type(),
        IntegerType::new().with_min(3).into_type(),
        RealType::new().with_max(-1.0).into_type(),
        StringType::new().with_choices(["only"]).into_type(),
        SequenceType::new(IntegerType::new().into_type())
            .with_min_size(2)
            .into_type(),
        TupleType::new([BooleanType::new().into_type(), RealType::new().into_type()]).into_type(),
        SetType::new(StringType::new().into_type()).into_type(),
        point_type(),
        MappingType::new(StringType::new().into_type(), IntegerType::new().into_type())
            .into_type(),
        OrType::new([IntegerType::new().into_type(), StringType::new().into_type()]).into_type(),
    ];
    let registry = empty_registry();
    let ctx = ValidationContext::new(&registry);
    for ty in &types {
        let default = ty.make_default(&ctx).expect("default builds");
        assert!(
            ty.validate(&default.to_value(), &ctx).is_ok(),
            "default of {} must validate",
            ty.describe()
        );
    }
}

#[test]
fn test_clone_type_is_independent() {
    let original = point_type();
    let copy = original.clone_type();
    assert_eq!(original.describe(), copy.describe());
    assert!(!Arc::ptr_eq(&original, &copy));
}

#[test]
fn test_shared_registry_rebuilds_on_path_change() {
    let file_a = SchemaFile::builder("a")
        .ty("T", IntegerType::new().into_type())
        .build();
    let file_b = SchemaFile::builder("b")
        .ty("T", IntegerType::new().into_type())
        .build();

    let first = shared_registry(vec![Box::new(InMemorySource::new().with_file(file_a.clone()))]);
    let again = shared_registry(vec![Box::new(InMemorySource::new().with_file(file_a))]);
    assert!(Arc::ptr_eq(&first, &again));

    let changed = shared_registry(vec![Box::new(InMemorySource::new().with_file(file_b))]);
    assert!(!Arc::ptr_eq(&first, &changed));
}

#[test]
fn test_registry_reload_clears_cache() {
    let registry = geo_registry();
    registry.schema_file("geo").expect("loads");
    registry.reload();
    // still resolvable after the cache is dropped
    assert!(registry.resolve_type("geo.Point").is_ok());
}
