//! Transport: a process-level [`Context`] mints [`Publisher`]/[`Subscriber`]/
//! [`Requester`]/[`Replier`] endpoints bound to a `tcp://host:port` address
//! and a named [`Format`].
//!
//! Addresses are URI-style: a wildcard host (`tcp://*:5556`) binds; a named
//! host (`tcp://localhost:5555`) connects. The `tcp` scheme is the only one
//! registered today, but `Address::parse` is the single seam a second scheme
//! would plug into — the same open-ended-by-name shape as the format
//! registry.

mod address;
mod frame;
mod publisher;
mod replier;
mod requester;
mod subscriber;

pub use address::Address;
pub use publisher::Publisher;
pub use replier::Replier;
pub use requester::Requester;
pub use subscriber::Subscriber;

use crate::error::Error;
use crate::format::Format;

/// A process-level owner of transport resources. Cheap to clone; every
/// socket minted from a `Context` is independent of the others (no shared
/// connection pooling) but the `Context` itself must outlive them.
#[derive(Clone, Default)]
pub struct Context;

impl Context {
    pub fn new() -> Self {
        Context
    }

    /// Binds a fire-and-forget publish endpoint at `address`.
    pub fn publisher(&self, address: &str, format: &str) -> Result<Publisher, Error> {
        let address = Address::parse(address)?;
        let format = Format::by_name(format)?;
        Publisher::bind(address, format)
    }

    /// Connects a subscriber to `address`, filtering to `topics` (an empty
    /// list subscribes to everything). Publish frames carry no format tag of
    /// their own on the wire, so — like the original source's
    /// `context.subscriber(address, topics)` — this always speaks the
    /// mandatory `"json"` codec rather than taking a format argument.
    pub fn subscriber(&self, address: &str, topics: Vec<String>) -> Result<Subscriber, Error> {
        let address = Address::parse(address)?;
        let format = Format::by_name("json")?;
        Subscriber::connect(address, format, topics)
    }

    /// Connects a request/reply endpoint at `address`, exposing a
    /// [`crate::actor::Mailbox`] proxy over the wire.
    pub fn requester(&self, address: &str, format: &str) -> Result<Requester, Error> {
        let address = Address::parse(address)?;
        let format = Format::by_name(format)?;
        Requester::connect(address, format)
    }

    /// Binds a request/reply endpoint at `address` that forwards decoded
    /// requests to a local mailbox. Same fixed-`"json"` rationale as
    /// [`Context::subscriber`]: the original source's
    /// `context.replier(address)` takes no format argument either.
    pub fn replier(&self, address: &str) -> Result<Replier, Error> {
        let address = Address::parse(address)?;
        let format = Format::by_name("json")?;
        Replier::bind(address, format)
    }
}
