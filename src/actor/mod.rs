//! Actors: private state plus a named reader/writer message interface,
//! dispatched through a per-actor serial lane.
//!
//! Two actor shapes share one dispatch capability, [`Mailbox`]:
//! - [`Actor<S>`] binds typed user state to `define_reader`/`define_writer`
//!   handlers and gets the full reader/writer lane (readers may batch
//!   concurrently between writers; writers are strictly serial).
//! - [`StatelessActor`] (the module loader's loaded shape) is a single
//!   opaque raw dispatch function with no reader/writer distinction of its
//!   own; every call through it is treated as a writer, which is always a
//!   safe (if more conservative) specialization of the general lane.

mod dispatch;
mod stateless;

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::scheduler::Scheduler;
use crate::value::List;

pub use stateless::{mailbox_for, StatelessActor};

/// `(state, arguments) -> Outcome`, the reader shape: runs against a shared
/// reference and may run concurrently with other readers.
pub type ReaderHandler<S> = Arc<dyn Fn(&S, &List) -> Outcome + Send + Sync>;

/// `(state, arguments) -> Outcome`, the writer shape: runs against an
/// exclusive reference and never overlaps any other handler on that actor.
pub type WriterHandler<S> = Arc<dyn Fn(&mut S, &List) -> Outcome + Send + Sync>;

/// The capability to send named messages to an actor. Carries no storage of
/// its own; cloning is cheap and two mailboxes compare equal iff they refer
/// to the same actor.
#[derive(Clone)]
pub struct Mailbox(Arc<dyn dispatch::Dispatch>);

impl Mailbox {
    pub(crate) fn new(dispatch: Arc<dyn dispatch::Dispatch>) -> Self {
        Mailbox(dispatch)
    }

    /// Submits a job to `scheduler` that dispatches `name` with `args`
    /// against the actor's RW-lane, returning a promise for the result.
    /// Settles with `Error("unknown method: <name>")` immediately, without
    /// running any handler, when `name` isn't registered.
    pub fn send(
        &self,
        scheduler: &Scheduler,
        name: impl AsRef<str>,
        args: impl Into<List>,
    ) -> Promise {
        self.0.clone().send(scheduler, name.as_ref(), args.into())
    }
}

impl PartialEq for Mailbox {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Mailbox {}

/// Owner-held state plus its name-indexed reader/writer handler tables.
pub struct Actor<S: Send + Sync + 'static>(Arc<ActorInner<S>>);

impl<S: Send + Sync + 'static> Clone for Actor<S> {
    fn clone(&self) -> Self {
        Actor(self.0.clone())
    }
}

pub(crate) struct ActorInner<S> {
    state: RwLock<S>,
    readers: Mutex<Vec<(Arc<str>, ReaderHandler<S>)>>,
    writers: Mutex<Vec<(Arc<str>, WriterHandler<S>)>>,
    lane: dispatch::Lane<S>,
}

impl<S: Send + Sync + 'static> Actor<S> {
    /// Binds `state` to a fresh actor with empty reader/writer tables.
    /// Handlers are ordinarily all defined up front, before the mailbox is
    /// shared with concurrent producers; the tables themselves aren't on the
    /// dispatch hot path, so a plain mutex-guarded vector is enough.
    pub fn new(state: S) -> Self {
        Actor(Arc::new(ActorInner {
            state: RwLock::new(state),
            readers: Mutex::new(Vec::new()),
            writers: Mutex::new(Vec::new()),
            lane: dispatch::Lane::new(),
        }))
    }

    /// Registers a concurrent-read handler for `name`, replacing any prior
    /// reader or writer definition of the same name.
    pub fn define_reader<F>(&self, name: impl Into<Arc<str>>, handler: F) -> &Self
    where
        F: Fn(&S, &List) -> Outcome + Send + Sync + 'static,
    {
        let name = name.into();
        self.0.writers.lock().retain(|(n, _)| *n != name);
        let mut readers = self.0.readers.lock();
        readers.retain(|(n, _)| *n != name);
        readers.push((name, Arc::new(handler)));
        self
    }

    /// Registers an exclusive-write handler for `name`, replacing any prior
    /// writer or reader definition of the same name.
    pub fn define_writer<F>(&self, name: impl Into<Arc<str>>, handler: F) -> &Self
    where
        F: Fn(&mut S, &List) -> Outcome + Send + Sync + 'static,
    {
        let name = name.into();
        self.0.readers.lock().retain(|(n, _)| *n != name);
        let mut writers = self.0.writers.lock();
        writers.retain(|(n, _)| *n != name);
        writers.push((name, Arc::new(handler)));
        self
    }

    pub fn mailbox(&self) -> Mailbox {
        Mailbox::new(self.0.clone())
    }

    #[cfg(test)]
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.0.state.read())
    }
}

impl<S: Send + Sync + 'static> ActorInner<S> {
    fn reader(&self, name: &str) -> Option<ReaderHandler<S>> {
        self.readers
            .lock()
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, h)| h.clone())
    }

    fn writer(&self, name: &str) -> Option<WriterHandler<S>> {
        self.writers
            .lock()
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, h)| h.clone())
    }
}

impl<S: Send + Sync + 'static> dispatch::Dispatch for ActorInner<S> {
    fn send(self: Arc<Self>, scheduler: &Scheduler, name: &str, args: List) -> Promise {
        let promise = Promise::new();

        let kind = if let Some(handler) = self.writer(name) {
            dispatch::Kind::Writer(handler)
        } else if let Some(handler) = self.reader(name) {
            dispatch::Kind::Reader(handler)
        } else {
            promise.set(Outcome::from_error(format!("unknown method: {name}")));
            return promise;
        };

        self.lane
            .enqueue(self.clone(), scheduler, kind, args, promise.clone());
        promise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn recv_f64(rx: &mpsc::Receiver<f64>) -> f64 {
        rx.recv_timeout(Duration::from_secs(1)).unwrap()
    }

    fn args(values: Vec<Value>) -> List {
        values.into_iter().collect()
    }

    use crate::value::Value;

    #[test]
    fn unknown_method_settles_without_running_any_handler() {
        let scheduler = Scheduler::new(2).unwrap();
        let actor = Actor::new(0i64);
        actor.define_writer("deposit", |state, a| {
            *state += a.get(0).and_then(Value::as_int).unwrap_or(0);
            Outcome::from_value(*state)
        });

        let promise = actor.mailbox().send(&scheduler, "withdraw", args(vec![1.into()]));
        let (tx, rx) = mpsc::channel();
        promise.fail(&scheduler, move |msg| tx.send(msg).unwrap());
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            "unknown method: withdraw"
        );
        assert_eq!(actor.with_state(|s| *s), 0);
    }

    #[test]
    fn deposit_sequence_matches_the_account_happy_path() {
        let scheduler = Scheduler::new(4).unwrap();
        let actor = Actor::new(0.0f64);
        actor.define_writer("deposit", |balance: &mut f64, a| {
            let amount = a.get(0).and_then(Value::as_float).unwrap_or(0.0);
            *balance += amount;
            Outcome::from_value(*balance)
        });
        actor.define_reader("balance", |balance: &f64, _a| Outcome::from_value(*balance));

        let mailbox = actor.mailbox();
        let (tx, rx) = mpsc::channel();
        for amount in [1000.0, 500.0, 250.0] {
            let promise = mailbox.send(&scheduler, "deposit", args(vec![amount.into()]));
            let tx = tx.clone();
            promise.then_result(&scheduler, move |v| {
                tx.send(v.as_float().unwrap()).unwrap();
            });
        }
        let results: Vec<f64> = (0..3).map(|_| recv_f64(&rx)).collect();
        assert_eq!(results, vec![1000.0, 1500.0, 1750.0]);

        let balance_promise = mailbox.send(&scheduler, "balance", List::new());
        let (tx2, rx2) = mpsc::channel();
        balance_promise.then_result(&scheduler, move |v| tx2.send(v.as_float().unwrap()).unwrap());
        assert_eq!(recv_f64(&rx2), 1750.0);
    }

    #[test]
    fn writer_fifo_order_is_preserved_from_a_single_producer() {
        let scheduler = Scheduler::new(8).unwrap();
        let actor = Actor::new(Vec::<i64>::new());
        actor.define_writer("push", |state: &mut Vec<i64>, a| {
            state.push(a.get(0).and_then(Value::as_int).unwrap());
            Outcome::from_value(())
        });
        let mailbox = actor.mailbox();
        for i in 0..200 {
            mailbox.send(&scheduler, "push", args(vec![i.into()]));
        }
        while scheduler.count() != 0 {
            std::thread::yield_now();
        }
        let expected: Vec<i64> = (0..200).collect();
        assert_eq!(actor.with_state(|s| s.clone()), expected);
    }

    #[test]
    fn readers_observe_a_consistent_snapshot_between_writers() {
        let scheduler = Scheduler::new(8).unwrap();
        let actor = Actor::new(0i64);
        actor.define_writer("incr", |state: &mut i64, _a| {
            *state += 1;
            Outcome::from_value(*state)
        });
        actor.define_reader("get", |state: &i64, _a| Outcome::from_value(*state));

        let mailbox = actor.mailbox();
        mailbox.send(&scheduler, "incr", List::new());
        mailbox.send(&scheduler, "incr", List::new());

        let (tx, rx) = mpsc::channel();
        let read_promise = mailbox.send(&scheduler, "get", List::new());
        read_promise.then_result(&scheduler, move |v| tx.send(v.as_int().unwrap()).unwrap());
        let value = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(value, 2);
    }
}
