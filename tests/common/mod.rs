//! Shared fixtures for integration tests: a small inventory schema
//! exercising every container kind, plus raw-value helpers.

use docshape::schema::collections::{SequenceType, SetType, TupleType};
use docshape::schema::mapping::MappingType;
use docshape::schema::primitives::{IntegerType, RealType, StringType};
use docshape::schema::reference::NamedType;
use docshape::schema::registry::{InMemorySource, SchemaFile, SchemaRegistry};
use docshape::schema::structure::StructType;
use docshape::schema::union::OptionalType;
use docshape::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Initialize test logging once; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a raw mapping from string keys.
pub fn map(entries: &[(&str, Value)]) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

/// Build a raw set.
pub fn set_of(values: impl IntoIterator<Item = Value>) -> Value {
    Value::Set(values.into_iter().collect())
}

/// Registry with the `inv` schema: items, inventories, price tables.
pub fn inventory_registry() -> Arc<SchemaRegistry> {
    let item = StructType::builder()
        .field("sku", StringType::new().strict().into_type())
        .field("qty", IntegerType::new().with_min(0).into_type())
        .field("tags", SetType::new(StringType::new().into_type()).into_type())
        .field(
            "dims",
            OptionalType::new(
                TupleType::new([RealType::new().into_type(), RealType::new().into_type()])
                    .into_type(),
            )
            .into_type(),
        )
        .alias("article", "sku")
        .build()
        .expect("item type");

    let inventory = StructType::builder()
        .field("name", StringType::new().strict().into_type())
        .field(
            "items",
            SequenceType::new(NamedType::new("inv.Item").into_type())
                .with_max_size(4)
                .into_type(),
        )
        .build()
        .expect("inventory type");

    let prices = MappingType::new(
        StringType::new().strict().into_type(),
        RealType::new().with_min(0.0).into_type(),
    );

    let file = SchemaFile::builder("inv")
        .ty("Item", Arc::new(item))
        .ty("Inventory", Arc::new(inventory))
        .ty("Prices", prices.into_type())
        .build();
    SchemaRegistry::shared(vec![Box::new(InMemorySource::new().with_file(file))])
}

/// A valid raw `inv.Item`.
pub fn raw_item(sku: &str, qty: i64) -> Value {
    map(&[
        ("sku", Value::Str(sku.into())),
        ("qty", Value::Int(qty)),
        ("tags", set_of([Value::Str("new".into())])),
    ])
}

/// A valid raw `inv.Inventory` with one item.
pub fn raw_inventory(name: &str) -> Value {
    map(&[
        ("name", Value::Str(name.into())),
        ("items", Value::Seq(vec![raw_item("a-1", 1)])),
    ])
}

/// Entries for a raw `inv.Prices` mapping.
pub fn raw_prices() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("a-1".to_string(), Value::Real(2.5)),
        ("b-2".to_string(), Value::Real(0.5)),
    ])
}
