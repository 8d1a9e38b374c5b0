//! Dynamic actor loading: given a filesystem path and a configuration
//! `Map`, loads a shared library exporting a single versioned factory entry
//! point, invokes it with the configuration pre-encoded as JSON bytes, and
//! exposes the resulting [`StatelessActor`] as a [`Mailbox`].
//!
//! The library is kept alive for as long as the returned `Mailbox` is: the
//! `libloading::Library` handle is embedded inside the same `Arc` the
//! `StatelessActor` trait object is boxed into ([`LoadedActor`]), so it's
//! never unloaded while any clone of the mailbox could still dispatch
//! against it — not just while `Module` itself is alive.

use std::ffi::CString;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::actor::{mailbox_for, Mailbox, StatelessActor};
use crate::error::Error;
use crate::format::Format;
use crate::outcome::Outcome;
use crate::value::{List, Map};

/// The versioned ABI a loadable actor module exports. Receives the
/// configuration pre-encoded as JSON (pointer + length) and an out-parameter
/// for an owned, NUL-terminated error string. Returns null on failure.
type ActorFactory =
    unsafe extern "C" fn(*const u8, usize, *mut *mut c_char) -> *mut dyn StatelessActor;

const ENTRY_POINT: &[u8] = b"porter_actor_factory\0";

pub struct Module {
    mailbox: Mailbox,
}

/// Ties a loaded actor to the library it came from so the two share one
/// `Arc`: the library is only unloaded once the last mailbox clone (and
/// therefore the last reference to this wrapper) is dropped.
struct LoadedActor {
    library: Library,
    inner: Box<dyn StatelessActor>,
}

impl StatelessActor for LoadedActor {
    fn dispatch(&self, name: &str, args: &List) -> Outcome {
        self.inner.dispatch(name, args)
    }
}

impl Module {
    /// Loads `path`, invokes its factory entry point with `config`, and
    /// binds the resulting actor to a mailbox.
    pub fn load(path: impl AsRef<Path>, config: Map) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ModuleNotFound(path.display().to_string()));
        }

        // SAFETY: loading an artifact is inherently unsafe (arbitrary native
        // code runs at load time); the crate's contract puts the burden of
        // supplying a trusted path on the caller.
        let library = unsafe { Library::new(path) }
            .map_err(|e| Error::ModuleNotFound(format!("{}: {e}", path.display())))?;

        let factory: Symbol<ActorFactory> = unsafe { library.get(ENTRY_POINT) }
            .map_err(|_| Error::MissingEntryPoint(path.display().to_string()))?;

        let format = Format::by_name("json")?;
        let config_bytes = format.encode(&crate::value::Value::Map(config))?;

        let mut error_out: *mut c_char = std::ptr::null_mut();
        // SAFETY: the factory contract guarantees either a valid owning
        // pointer or null plus an owned error string, per ENTRY_POINT's ABI.
        let actor_ptr = unsafe {
            factory(
                config_bytes.as_ptr(),
                config_bytes.len(),
                &mut error_out as *mut *mut c_char,
            )
        };

        if actor_ptr.is_null() {
            let message = read_owned_error(error_out);
            return Err(Error::FactoryFailed(message));
        }

        // SAFETY: non-null per the contract above; reclaims the box the
        // factory allocated on our behalf.
        let actor: Box<dyn StatelessActor> = unsafe { Box::from_raw(actor_ptr) };
        let loaded: Arc<dyn StatelessActor> = Arc::new(LoadedActor {
            library,
            inner: actor,
        });
        let mailbox = mailbox_for(loaded);

        Ok(Module { mailbox })
    }

    pub fn mailbox(&self) -> Mailbox {
        self.mailbox.clone()
    }
}

/// Reclaims a `CString` the factory allocated with `CString::into_raw`.
fn read_owned_error(ptr: *mut c_char) -> String {
    if ptr.is_null() {
        return "module factory failed with no error message".to_string();
    }
    // SAFETY: the factory contract hands us ownership of a CString it built
    // with `CString::into_raw`.
    unsafe { CString::from_raw(ptr) }
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_fails_without_touching_libloading() {
        let err = Module::load("/nonexistent/path/to/module.so", Map::new()).unwrap_err();
        assert!(matches!(err, Error::ModuleNotFound(_)));
    }
}
