//! Copying a `List` shares storage until one side mutates it.

use porter::{List, Value};

fn main() {
    let list1: List = vec![2, 3, 5].into_iter().collect();

    let mut list2 = list1.copy();
    list2.set(0, 1);
    list2.append(7);

    let mut list3 = list1.copy();
    list3.append(7);

    println!("list1 = {:?}", values(&list1));
    println!("list2 = {:?}", values(&list2));
    println!("list3 = {:?}", values(&list3));

    assert_eq!(values(&list1), vec!["2", "3", "5"]);
    assert_eq!(values(&list2), vec!["1", "3", "5", "7"]);
    assert_eq!(values(&list3), vec!["2", "3", "5", "7"]);
    println!("list1 is unaffected by mutations through list2/list3");
}

fn values(list: &List) -> Vec<String> {
    list.iter().map(describe).collect()
}

fn describe(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        other => format!("{other:?}"),
    }
}
