//! A minimal, portable actor runtime: value-semantics messages, a
//! cooperative thread-pool scheduler, composable promise/future pipelines,
//! and pluggable transports (in-process mailboxes and TCP sockets) carrying
//! encoded messages between actors.
//!
//! Start with [`value::Value`] for the data model, [`scheduler::Scheduler`]
//! and [`promise::Promise`] for composition, [`actor::Actor`] /
//! [`actor::Mailbox`] for dispatch, and [`context::Context`] for transports.

pub mod actor;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod logging;
pub mod module;
pub mod outcome;
pub mod promise;
pub mod scheduler;
pub mod value;

pub use actor::{Actor, Mailbox, StatelessActor};
pub use config::Config;
pub use context::Context;
pub use error::Error;
pub use format::Format;
pub use module::Module;
pub use outcome::Outcome;
pub use promise::Promise;
pub use scheduler::Scheduler;
pub use value::{List, Map, Value};
