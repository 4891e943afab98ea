//! Rollback invariant across every container kind: a mutating operation
//! that fails validation leaves the container serialization unchanged.

mod common;

use common::{inventory_registry, map, raw_inventory, raw_item, raw_prices};
use docshape::schema::registry::RegistryExt;
use docshape::value::Value;
use std::collections::BTreeMap;

#[test]
fn struct_rollback_on_failed_set() {
    common::init_logging();
    let registry = inventory_registry();
    let mut item = registry
        .validate(&raw_item("a-1", 2), "inv.Item")
        .expect("item validates");
    let before = item.to_value();

    let fields = item.as_struct_mut().expect("struct");
    assert!(fields.set("qty", Value::Int(-1)).is_err());
    assert!(fields.set("sku", Value::Int(7)).is_err());
    assert!(fields.set("nope", Value::Int(0)).is_err());
    assert_eq!(item.to_value(), before);
}

#[test]
fn sequence_rollback_on_size_violation() {
    let registry = inventory_registry();
    let mut inventory = registry
        .validate(&raw_inventory("main"), "inv.Inventory")
        .expect("inventory validates");
    let before = inventory.to_value();

    let items = inventory
        .as_struct_mut()
        .and_then(|s| s.get_mut("items"))
        .and_then(|v| v.as_seq_mut())
        .expect("items sequence");
    // four more items would exceed max_size=4
    let extra: Vec<Value> = (0..4).map(|i| raw_item(&format!("x-{i}"), i)).collect();
    assert!(items.extend(extra).is_err());
    // an invalid element anywhere in the batch also rolls the batch back
    assert!(
        items
            .extend([raw_item("y-1", 1), raw_item("y-2", -1)])
            .is_err()
    );
    assert_eq!(inventory.to_value(), before);
}

#[test]
fn tuple_rollback_on_invalid_position() {
    let registry = inventory_registry();
    let raw = map(&[
        ("sku", Value::Str("a-1".into())),
        ("qty", Value::Int(1)),
        ("tags", common::set_of([])),
        ("dims", Value::Tuple(vec![Value::Real(2.0), Value::Real(3.0)])),
    ]);
    let mut item = registry.validate(&raw, "inv.Item").expect("item validates");
    let before = item.to_value();

    let dims = item
        .as_struct_mut()
        .and_then(|s| s.get_mut("dims"))
        .and_then(|v| v.as_tuple_mut())
        .expect("dims tuple");
    assert!(dims.set(0, Value::Str("wide".into())).is_err());
    assert_eq!(item.to_value(), before);
}

#[test]
fn set_rollback_on_invalid_element() {
    let registry = inventory_registry();
    let mut item = registry
        .validate(&raw_item("a-1", 2), "inv.Item")
        .expect("item validates");
    let before = item.to_value();

    let tags = item
        .as_struct_mut()
        .and_then(|s| s.get_mut("tags"))
        .and_then(|v| v.as_set_mut())
        .expect("tags set");
    // a compound element can never satisfy the string element type
    assert!(tags.insert(Value::Seq(vec![])).is_err());
    assert!(tags.union_with([Value::Str("ok".into()), Value::Map(BTreeMap::new())]).is_err());
    assert_eq!(item.to_value(), before);
}

#[test]
fn mapping_rollback_on_invalid_entry() {
    let registry = inventory_registry();
    let mut prices = registry
        .validate(&Value::Map(raw_prices()), "inv.Prices")
        .expect("prices validate");
    let before = prices.to_value();

    let entries = prices.as_map_mut().expect("mapping");
    assert!(entries.insert(Value::Str("c-3".into()), Value::Real(-1.0)).is_err());
    let bad_merge = BTreeMap::from([
        ("d-4".to_string(), Value::Real(1.0)),
        ("e-5".to_string(), Value::Str("free".into())),
    ]);
    assert!(entries.merge_from(&bad_merge).is_err());
    assert_eq!(prices.to_value(), before);
}

#[test]
fn failed_mutations_keep_containers_usable() {
    let registry = inventory_registry();
    let mut item = registry
        .validate(&raw_item("a-1", 2), "inv.Item")
        .expect("item validates");

    let fields = item.as_struct_mut().expect("struct");
    assert!(fields.set("qty", Value::Int(-1)).is_err());
    // the same container accepts a valid mutation immediately after
    fields.set("qty", Value::Int(5)).expect("valid set applies");
    assert_eq!(
        item.as_struct().and_then(|s| s.get("qty")).map(|v| v.to_value()),
        Some(Value::Int(5))
    );
}
