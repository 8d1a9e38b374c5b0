//! The `json` codec, exercised against the registry by name only (no
//! internal access to the codec implementation).

use porter::{Format, Map, Value};

#[test]
fn encodes_a_map_in_insertion_order_with_compact_output() {
    let mut person = Map::new();
    person.set("name", "John");
    person.set("age", 30);
    person.set("married", true);

    let format = Format::by_name("json").unwrap();
    let bytes = format.encode(&Value::Map(person)).unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"name":"John","age":30,"married":true}"#
    );
}

#[test]
fn round_trips_nested_lists_and_maps() {
    let mut inner = Map::new();
    inner.set("tag", "x");
    let list: porter::List = vec![Value::Int(1), Value::Map(inner), Value::Null]
        .into_iter()
        .collect();
    let original = Value::List(list);

    let format = Format::by_name("json").unwrap();
    let bytes = format.encode(&original).unwrap();
    let decoded = format.decode(&bytes).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn unknown_format_name_fails_closed() {
    assert!(Format::by_name("msgpack").is_err());
}
