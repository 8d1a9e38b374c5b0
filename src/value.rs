//! Self-describing message data.
//!
//! `Value` is a tagged union covering the handful of shapes a dynamic
//! scripting binding can hand across the actor boundary: nulls, booleans,
//! numbers, strings, ordered lists and string-keyed maps. `List` and `Map`
//! carry their storage behind an `Arc`, so an ordinary `.clone()` is a cheap
//! handle copy; the first mutation through either handle privatizes storage
//! via `Arc::make_mut`, which is what gives `copy()` (itself just `.clone()`)
//! its "looks deep, shares when untouched" behaviour.

use std::sync::Arc;

use indexmap::IndexMap;

/// An ordered, self-describing unit of message data.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    List(List),
    Map(Map),
}

impl Value {
    /// Logically independent copy of this value. Mutating the result never
    /// affects `self`, and vice versa.
    pub fn copy(&self) -> Value {
        self.clone()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Structural equality. Numeric tags never cross-compare: `Int(1) != Float(1.0)`.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}
impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s.as_str()))
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::List(l)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

/// An ordered sequence of `Value`s with copy-on-write storage.
#[derive(Clone, Debug, Default)]
pub struct List(Arc<Vec<Value>>);

impl List {
    pub fn new() -> Self {
        List(Arc::new(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// `list[index] = value`. Panics if `index` is out of bounds, matching
    /// the host binding's own bounds-checked indexed assignment.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) {
        let inner = Arc::make_mut(&mut self.0);
        inner[index] = value.into();
    }

    pub fn append(&mut self, value: impl Into<Value>) {
        Arc::make_mut(&mut self.0).push(value.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Logically independent copy; see the module-level docs on `Value::copy`.
    pub fn copy(&self) -> List {
        self.clone()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl PartialEq for List {
    fn eq(&self, other: &List) -> bool {
        *self.0 == *other.0
    }
}

impl From<Vec<Value>> for List {
    fn from(v: Vec<Value>) -> Self {
        List(Arc::new(v))
    }
}

impl<T: Into<Value>> FromIterator<T> for List {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        List(Arc::new(iter.into_iter().map(Into::into).collect()))
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        // `Arc::try_unwrap` avoids a clone when this is the sole owner, which
        // is the common case for arguments freshly built for a `send`.
        match Arc::try_unwrap(self.0) {
            Ok(v) => v.into_iter(),
            Err(shared) => (*shared).clone().into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An ordered, string-keyed map with copy-on-write storage. Iteration order
/// is insertion order, which is also the codec's canonical emit order.
#[derive(Clone, Debug, Default)]
pub struct Map(Arc<IndexMap<String, Value>>);

impl Map {
    pub fn new() -> Self {
        Map(Arc::new(IndexMap::new()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// `map[key] = value`. Inserting a key that already exists keeps its
    /// original position (matching `IndexMap::insert`'s semantics).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        Arc::make_mut(&mut self.0).insert(key.into(), value.into());
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Logically independent copy; see the module-level docs on `Value::copy`.
    pub fn copy(&self) -> Map {
        self.clone()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Map) -> bool {
        *self.0 == *other.0
    }
}

impl From<IndexMap<String, Value>> for Map {
    fn from(m: IndexMap<String, Value>) -> Self {
        Map(Arc::new(m))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = IndexMap::new();
        for (k, v) in iter {
            m.insert(k.into(), v.into());
        }
        Map(Arc::new(m))
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_copy_is_independent() {
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
    fn map_preserves_insertion_order() {
        let mut map = Map::new();
        map.set("name", "John");
        map.set("age", 30);
        map.set("married", true);

        let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "age", "married"]);
    }

    #[test]
    fn numeric_tags_do_not_cross_compare() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_eq!(Value::Float(1.0), Value::Float(1.0));
    }

    #[test]
    fn cloning_a_value_shares_then_privatizes_on_mutation() {
        let mut list1: List = vec![1, 2, 3].into_iter().collect();
        let list2 = list1.clone();
        list1.append(4);
        assert_eq!(list2, vec![1, 2, 3].into_iter().collect::<List>());
    }
}
