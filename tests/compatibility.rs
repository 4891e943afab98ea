//! Format-migration behavior: compatibility-mode structs, the conform
//! pre-pass, and document version gating.

mod common;

use common::map;
use docshape::document::{self, load_document};
use docshape::error::DocshapeError;
use docshape::schema::primitives::{IntegerType, StringType};
use docshape::schema::registry::{InMemorySource, RegistryExt, SchemaFile, SchemaRegistry};
use docshape::schema::structure::StructType;
use docshape::value::Value;
use std::sync::Arc;

/// One schema name, two revisions: v1 had only `host`; v2 adds a
/// required `port` with a default, reads old documents in compatibility
/// mode, and keeps the retired `address` spelling as a deprecated name.
fn registry(compatible: bool) -> Arc<SchemaRegistry> {
    let mut builder = StructType::builder()
        .field("host", StringType::new().strict().into_type())
        .field("port", IntegerType::new().with_min(1).with_default(8080).into_type())
        .deprecated("address", "host");
    if compatible {
        builder = builder.compatible();
    }
    let endpoint = builder.build().expect("endpoint type");
    let file = SchemaFile::builder("net")
        .ty("Endpoint", Arc::new(endpoint))
        .build();
    SchemaRegistry::shared(vec![Box::new(InMemorySource::new().with_file(file))])
}

#[test]
fn old_document_reads_in_compatibility_mode() {
    common::init_logging();
    let old = map(&[("host", Value::Str("example.com".into()))]);

    let strict = registry(false);
    let err = strict.validate(&old, "net.Endpoint").unwrap_err();
    assert!(matches!(err, DocshapeError::Validation(_)));

    let compat = registry(true);
    let endpoint = compat
        .validate(&old, "net.Endpoint")
        .expect("compat fills the new field");
    assert_eq!(
        endpoint.as_struct().and_then(|s| s.get("port")).map(|v| v.to_value()),
        Some(Value::Int(8080))
    );
}

#[test]
fn newer_document_tolerated_once_schema_is_satisfied() {
    let newer = map(&[
        ("host", Value::Str("example.com".into())),
        ("port", Value::Int(9090)),
        ("tls", Value::Bool(true)),
    ]);
    let compat = registry(true);
    let endpoint = compat
        .validate(&newer, "net.Endpoint")
        .expect("unknown field tolerated");
    // the unknown field is not carried into the typed value
    assert_eq!(
        endpoint.to_value(),
        map(&[
            ("host", Value::Str("example.com".into())),
            ("port", Value::Int(9090)),
        ])
    );

    // unknown fields are NOT tolerated while a known field is defaulted
    let ambiguous = map(&[
        ("host", Value::Str("example.com".into())),
        ("tls", Value::Bool(true)),
    ]);
    assert!(compat.validate(&ambiguous, "net.Endpoint").is_err());
}

#[test]
fn deprecated_spelling_forwards_in_both_modes() {
    let via_address = map(&[
        ("address", Value::Str("example.com".into())),
        ("port", Value::Int(80)),
    ]);
    for compatible in [false, true] {
        let endpoint = registry(compatible)
            .validate(&via_address, "net.Endpoint")
            .expect("deprecated name forwards");
        assert_eq!(
            endpoint.as_struct().and_then(|s| s.get("host")).map(|v| v.to_value()),
            Some(Value::Str("example.com".into()))
        );
    }
}

#[test]
fn conform_migrates_strict_documents() {
    let strict = registry(false);
    let messy = map(&[
        ("host", Value::Str("example.com".into())),
        ("legacy_flag", Value::Bool(true)),
    ]);
    // straight validation fails twice over: unknown field, missing port
    assert!(strict.validate(&messy, "net.Endpoint").is_err());

    let conformed = strict
        .conform(&messy, "net.Endpoint", true)
        .expect("conform drops unknown and fills missing");
    assert_eq!(
        conformed.to_value(),
        map(&[
            ("host", Value::Str("example.com".into())),
            ("port", Value::Int(8080)),
        ])
    );

    // without fill, the missing required field still fails
    assert!(strict.conform(&messy, "net.Endpoint", false).is_err());
}

#[test]
fn version_gate_precedes_validation() {
    let registry = registry(true);
    let header = format!("# version: {}\n# schema: net.Endpoint", document::FORMAT_VERSION + 1);
    // body is invalid too; the version error must win
    let err = load_document(&header, &Value::Int(0), &registry, None).unwrap_err();
    assert!(matches!(err, DocshapeError::Version(_)));
}

#[test]
fn document_round_trip_keeps_unknown_header_keys() {
    let registry = registry(true);
    let doc = load_document(
        "# version: 1\n# schema: net.Endpoint\n# exported-by: tool 3.1",
        &map(&[("host", Value::Str("example.com".into()))]),
        &registry,
        None,
    )
    .expect("document loads");

    let (header_text, raw) = doc.save();
    assert!(header_text.contains("exported-by: tool 3.1"));
    assert_eq!(
        raw,
        map(&[
            ("host", Value::Str("example.com".into())),
            ("port", Value::Int(8080)),
        ])
    );
}
