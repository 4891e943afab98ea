//! Or-type disambiguation as observable through the public API:
//! declaration order wins, shape decides, content never does.

mod common;

use common::map;
use docshape::error::{DocshapeError, ValidationError};
use docshape::schema::collections::SequenceType;
use docshape::schema::primitives::{BooleanType, IntegerType, StringType};
use docshape::schema::registry::{InMemorySource, RegistryExt, SchemaFile, SchemaRegistry};
use docshape::schema::structure::StructType;
use docshape::schema::types::ArcType;
use docshape::schema::union::OrType;
use docshape::value::Value;
use std::sync::Arc;

fn registry() -> Arc<SchemaRegistry> {
    let scalar_or = OrType::new([
        IntegerType::new().into_type(),
        StringType::new().into_type(),
    ]);

    // two structs with identical field names; only defaults differ
    let metric = StructType::builder()
        .field("value", IntegerType::new().with_default(0).into_type())
        .build()
        .expect("metric");
    let gauge = StructType::builder()
        .field("value", IntegerType::new().with_default(100).into_type())
        .build()
        .expect("gauge");
    let tied: Vec<ArcType> = vec![Arc::new(metric), Arc::new(gauge)];
    let ambiguous = OrType::new(tied);

    let mixed = OrType::new([
        SequenceType::new(IntegerType::new().into_type()).into_type(),
        BooleanType::new().into_type(),
    ]);

    let file = SchemaFile::builder("u")
        .ty("Scalar", scalar_or.into_type())
        .ty("Ambiguous", ambiguous.into_type())
        .ty("Mixed", mixed.into_type())
        .build();
    SchemaRegistry::shared(vec![Box::new(InMemorySource::new().with_file(file))])
}

#[test]
fn integer_and_string_stay_on_their_side() {
    let registry = registry();
    let int_side = registry.validate(&Value::Int(5), "u.Scalar").expect("int");
    assert_eq!(int_side.schema_type().kind(), "Integer");
    assert_eq!(int_side.to_value(), Value::Int(5));

    let str_side = registry
        .validate(&Value::Str("5".into()), "u.Scalar")
        .expect("string");
    assert_eq!(str_side.schema_type().kind(), "String");
    assert_eq!(str_side.to_value(), Value::Str("5".into()));
}

#[test]
fn first_declared_alternative_wins_ties() {
    let registry = registry();
    let typed = registry
        .validate(&map(&[("value", Value::Int(7))]), "u.Ambiguous")
        .expect("ambiguous struct accepted");
    // the first declared struct won: its default shows through make_default
    let default = registry.make_default("u.Ambiguous").expect("default");
    assert_eq!(default.to_value(), map(&[("value", Value::Int(0))]));
    assert_eq!(typed.to_value(), map(&[("value", Value::Int(7))]));
}

#[test]
fn no_alternative_matching_is_the_only_surfaced_failure() {
    let registry = registry();
    let err = registry
        .validate(&Value::Tuple(vec![]), "u.Scalar")
        .unwrap_err();
    match err {
        DocshapeError::Validation(ValidationError::NoAlternativeMatched { alternatives }) => {
            assert_eq!(alternatives.len(), 2);
        }
        other => panic!("expected NoAlternativeMatched, got {other}"),
    }
}

#[test]
fn committed_compound_failures_surface_without_backtracking() {
    let registry = registry();
    // the sequence alternative matches the shape; its child then fails,
    // and the boolean alternative is never consulted
    let err = registry
        .validate(
            &Value::Seq(vec![Value::Str("not an int".into())]),
            "u.Mixed",
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DocshapeError::Validation(ValidationError::ForIndex { .. })
    ));

    // booleans still reach the second alternative
    assert!(registry.validate(&Value::Bool(true), "u.Mixed").is_ok());
    // boolean string literals are claimed by the boolean alternative
    let coerced = registry
        .validate(&Value::Str("yes".into()), "u.Mixed")
        .expect("boolean literal");
    assert_eq!(coerced.to_value(), Value::Bool(true));
}

#[test]
fn union_values_mutate_under_the_winning_alternative() {
    let registry = registry();
    let mut typed = registry
        .validate(&Value::Seq(vec![Value::Int(1)]), "u.Mixed")
        .expect("sequence side");
    let seq = typed.as_seq_mut().expect("sequence");
    seq.push(Value::Int(2)).expect("element of the winning type");
    assert!(seq.push(Value::Str("x".into())).is_err());
    assert_eq!(typed.to_value(), Value::Seq(vec![Value::Int(1), Value::Int(2)]));
}
