//! The per-actor RW-lane: a FIFO queue of pending messages, serialized so
//! that writers never overlap any other handler and consecutive readers at
//! the head of the queue run concurrently as a batch.
//!
//! `Lane<S>` stays generic over the actor's state type — the only place type
//! erasure is needed is the [`Dispatch`] trait object behind [`super::Mailbox`],
//! whose `send` signature (`&str`, `List`) never mentions `S`.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{ActorInner, ReaderHandler, WriterHandler};
use crate::error::panic_message;
use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::scheduler::Scheduler;
use crate::value::List;

enum Item<S> {
    Reader {
        handler: ReaderHandler<S>,
        args: List,
        promise: Promise,
    },
    Writer {
        handler: WriterHandler<S>,
        args: List,
        promise: Promise,
    },
}

pub(crate) enum Kind<S> {
    Reader(ReaderHandler<S>),
    Writer(WriterHandler<S>),
}

enum Batch<S> {
    Readers(Vec<Item<S>>),
    Writer(Item<S>),
}

pub(crate) struct Lane<S> {
    queue: Mutex<(VecDeque<Item<S>>, bool)>,
}

impl<S: Send + Sync + 'static> Lane<S> {
    pub(crate) fn new() -> Self {
        Lane {
            queue: Mutex::new((VecDeque::new(), false)),
        }
    }

    /// Pushes a message onto the lane; starts draining if nothing already is.
    pub(crate) fn enqueue(
        &self,
        actor: Arc<ActorInner<S>>,
        scheduler: &Scheduler,
        kind: Kind<S>,
        args: List,
        promise: Promise,
    ) {
        let item = match kind {
            Kind::Reader(handler) => Item::Reader {
                handler,
                args,
                promise,
            },
            Kind::Writer(handler) => Item::Writer {
                handler,
                args,
                promise,
            },
        };

        let should_start = {
            let mut guard = self.queue.lock();
            guard.0.push_back(item);
            let already_busy = guard.1;
            guard.1 = true;
            !already_busy
        };

        if should_start {
            drain(actor, scheduler.clone());
        }
    }

    fn take_batch(&self) -> Option<Batch<S>> {
        let mut guard = self.queue.lock();
        match guard.0.front() {
            None => {
                guard.1 = false;
                None
            }
            Some(Item::Writer { .. }) => {
                let item = guard.0.pop_front().expect("front checked above");
                Some(Batch::Writer(item))
            }
            Some(Item::Reader { .. }) => {
                let mut readers = Vec::new();
                while matches!(guard.0.front(), Some(Item::Reader { .. })) {
                    readers.push(guard.0.pop_front().expect("front checked above"));
                }
                Some(Batch::Readers(readers))
            }
        }
    }
}

/// Pulls the next batch off the lane and schedules it; re-entered by each
/// scheduled job once its batch completes, so the lane keeps draining until
/// the queue is empty (at which point `busy` clears and `enqueue` is
/// responsible for restarting it).
fn drain<S: Send + Sync + 'static>(actor: Arc<ActorInner<S>>, scheduler: Scheduler) {
    let batch = match actor.lane.take_batch() {
        Some(batch) => batch,
        None => return,
    };

    match batch {
        Batch::Writer(Item::Writer {
            handler,
            args,
            promise,
        }) => {
            let next_actor = actor.clone();
            let next_scheduler = scheduler.clone();
            scheduler.schedule(move || {
                let outcome = actor.run_writer(&handler, &args);
                promise.set(outcome);
                drain(next_actor, next_scheduler);
            });
        }
        Batch::Readers(items) => {
            let remaining = Arc::new(AtomicUsize::new(items.len()));
            for item in items {
                if let Item::Reader {
                    handler,
                    args,
                    promise,
                } = item
                {
                    let actor = actor.clone();
                    let next_actor = actor.clone();
                    let scheduler2 = scheduler.clone();
                    let remaining = remaining.clone();
                    scheduler.schedule(move || {
                        let outcome = actor.run_reader(&handler, &args);
                        promise.set(outcome);
                        if remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                            drain(next_actor, scheduler2);
                        }
                    });
                }
            }
        }
        _ => unreachable!("take_batch only returns Writer items wrapped as Batch::Writer"),
    }
}

/// The generic dispatch capability behind [`super::Mailbox`]. Implemented by
/// [`ActorInner`] (typed, RW-lane aware) and by the module loader's
/// `StatelessDispatch` (always-writer, for raw [`super::StatelessActor`]s).
pub(crate) trait Dispatch: Send + Sync {
    fn send(self: Arc<Self>, scheduler: &Scheduler, name: &str, args: List) -> Promise;
}

impl<S: Send + Sync + 'static> ActorInner<S> {
    /// Runs a writer under an exclusive guard, folding a handler panic into
    /// an error outcome instead of unwinding the worker.
    pub(crate) fn run_writer(&self, handler: &WriterHandler<S>, args: &List) -> Outcome {
        let mut guard = self.state.write();
        match panic::catch_unwind(AssertUnwindSafe(|| handler(&mut guard, args))) {
            Ok(outcome) => outcome,
            Err(payload) => Outcome::from_error(panic_message(payload)),
        }
    }

    /// Runs a reader under a shared guard; same panic handling as writers.
    pub(crate) fn run_reader(&self, handler: &ReaderHandler<S>, args: &List) -> Outcome {
        let guard = self.state.read();
        match panic::catch_unwind(AssertUnwindSafe(|| handler(&guard, args))) {
            Ok(outcome) => outcome,
            Err(payload) => Outcome::from_error(panic_message(payload)),
        }
    }
}
