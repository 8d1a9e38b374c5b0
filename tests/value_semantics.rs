//! Copy-on-write semantics for `List`/`Map`, exercised through the public API.

use porter::{List, Map, Value};

#[test]
fn list_copy_diverges_independently_from_its_source() {
    let list1: List = vec![2, 3, 5].into_iter().collect();

    let mut list2 = list1.copy();
    list2.set(0, 1);
    list2.append(7);

    let mut list3 = list1.copy();
    list3.append(7);

    assert_eq!(list1, vec![2, 3, 5].into_iter().collect::<List>());
    assert_eq!(list2, vec![1, 3, 5, 7].into_iter().collect::<List>());
    assert_eq!(list3, vec![2, 3, 5, 7].into_iter().collect::<List>());
}

#[test]
fn map_copy_diverges_independently_and_keeps_insertion_order() {
    let mut original = Map::new();
    original.set("a", 1);
    original.set("b", 2);

    let mut copy = original.copy();
    copy.set("c", 3);

    assert_eq!(original.len(), 2);
    assert_eq!(copy.len(), 3);
    assert_eq!(
        copy.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
}

#[test]
fn plain_clone_shares_storage_until_the_first_mutation() {
    let mut list1: List = vec![1, 2, 3].into_iter().collect();
    let list2 = list1.clone();
    list1.append(4);
    assert_eq!(list2, vec![1, 2, 3].into_iter().collect::<List>());
    assert_ne!(list1, list2);
}

#[test]
fn numeric_tags_never_cross_compare() {
    assert_ne!(Value::Int(3), Value::Float(3.0));
}
