//! A `Map` built in a fixed field order round-trips through the `json`
//! codec with that same key order preserved on the wire.

use porter::{Format, Map, Value};

fn main() {
    let mut person = Map::new();
    person.set("name", "John");
    person.set("age", 30);
    person.set("married", true);

    let format = Format::by_name("json").expect("json codec is always registered");
    let encoded = format.encode(&Value::Map(person)).expect("encode person");
    let json = String::from_utf8(encoded.clone()).expect("json codec emits utf8");
    println!("{json}");
    assert_eq!(json, r#"{"name":"John","age":30,"married":true}"#);

    let decoded = format.decode(&encoded).expect("decode person");
    let map = decoded.as_map().expect("decoded value is a map");
    assert_eq!(map.get("name"), Some(&Value::from("John")));
    assert_eq!(map.get("age"), Some(&Value::Int(30)));
    assert_eq!(map.get("married"), Some(&Value::Bool(true)));
    println!("round-trip preserved every field");
}
