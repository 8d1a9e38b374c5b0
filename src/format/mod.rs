//! Named codecs between [`Value`](crate::value::Value) and byte buffers.
//!
//! A [`Format`] is resolved by name from a small built-in registry (`"json"`
//! is always present) the same way an actor's mailbox resolves a method name
//! against its reader/writer tables: look up, fail closed with a typed error
//! on miss, never panic.

mod json;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::Error;
use crate::value::Value;

/// The codec behind a [`Format`]. Implementors are registered by name.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, Error>;
    fn decode(&self, bytes: &[u8]) -> Result<Value, Error>;
}

fn registry() -> &'static RwLock<HashMap<String, Arc<dyn Codec>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<dyn Codec>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<String, Arc<dyn Codec>> = HashMap::new();
        map.insert("json".to_string(), Arc::new(json::JsonCodec));
        RwLock::new(map)
    })
}

/// Registers (or replaces) the codec for `name`. Intended for host programs
/// that want to add a format beyond the built-in `"json"`.
pub fn register(name: impl Into<String>, codec: Arc<dyn Codec>) {
    registry().write().unwrap().insert(name.into(), codec);
}

/// A named codec handle. Cheap to clone; `encode`/`decode` forward to the
/// registered [`Codec`].
#[derive(Clone)]
pub struct Format {
    name: Arc<str>,
    codec: Arc<dyn Codec>,
}

impl Format {
    /// Resolves `name` against the registry. Fails with
    /// [`Error::UnknownFormat`] rather than panicking on a miss.
    pub fn by_name(name: &str) -> Result<Format, Error> {
        let codec = registry()
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownFormat(name.to_string()))?;
        Ok(Format {
            name: Arc::from(name),
            codec,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, Error> {
        self.codec.encode(value)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Value, Error> {
        self.codec.decode(bytes)
    }
}
