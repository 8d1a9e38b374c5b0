//! The mandatory `"json"` [`super::Codec`]. Canonical output: compact UTF-8,
//! lowercase booleans, object keys in insertion order, numbers in their
//! shortest round-trippable form — all of which `serde_json`'s compact
//! serializer already gives us once keys keep insertion order (the
//! `preserve_order` feature backs `serde_json::Map` with an `IndexMap`).

use serde_json::{Map as JsonMap, Number, Value as Json};

use super::Codec;
use crate::error::Error;
use crate::value::{List, Map, Value};

pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, Error> {
        let json = to_json(value)?;
        serde_json::to_vec(&json).map_err(|e| Error::EncodeError(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, Error> {
        let json: Json =
            serde_json::from_slice(bytes).map_err(|e| Error::DecodeError(e.to_string()))?;
        Ok(from_json(json))
    }
}

fn to_json(value: &Value) -> Result<Json, Error> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number(Number::from(*i)),
        Value::Float(f) => Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| Error::EncodeError(format!("non-finite float: {f}")))?,
        Value::String(s) => Json::String(s.to_string()),
        Value::List(list) => {
            let mut items = Vec::with_capacity(list.len());
            for item in list.iter() {
                items.push(to_json(item)?);
            }
            Json::Array(items)
        }
        Value::Map(map) => {
            let mut object = JsonMap::new();
            for (key, value) in map.iter() {
                object.insert(key.clone(), to_json(value)?);
            }
            Json::Object(object)
        }
    })
}

fn from_json(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        Json::String(s) => Value::String(s.into()),
        Json::Array(items) => {
            let list: List = items.into_iter().map(from_json).collect();
            Value::List(list)
        }
        Json::Object(object) => {
            let map: Map = object
                .into_iter()
                .map(|(k, v)| (k, from_json(v)))
                .collect();
            Value::Map(map)
        }
    }
}
