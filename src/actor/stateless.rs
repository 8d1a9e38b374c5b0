//! The raw dispatch shape behind a dynamically loaded actor: a single
//! opaque `(name, args) -> Outcome` function with no reader/writer
//! distinction. Every call is serialized — always treated as a writer —
//! which is the safe specialization of the general RW-lane when the loaded
//! artifact hasn't told us which names are read-only.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use super::dispatch::Dispatch;
use super::Mailbox;
use crate::error::panic_message;
use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::scheduler::Scheduler;
use crate::value::List;

/// The ABI a module-loaded actor exposes: `(state, arguments) -> Outcome`
/// with the state already bound inside the implementor.
pub trait StatelessActor: Send + Sync {
    fn dispatch(&self, name: &str, args: &List) -> Outcome;
}

struct Message {
    name: Arc<str>,
    args: List,
    promise: Promise,
}

struct StatelessDispatch {
    actor: Arc<dyn StatelessActor>,
    queue: Mutex<(VecDeque<Message>, bool)>,
}

impl Dispatch for StatelessDispatch {
    fn send(self: Arc<Self>, scheduler: &Scheduler, name: &str, args: List) -> Promise {
        let promise = Promise::new();
        let message = Message {
            name: Arc::from(name),
            args,
            promise: promise.clone(),
        };

        let should_start = {
            let mut guard = self.queue.lock();
            guard.0.push_back(message);
            let already_busy = guard.1;
            guard.1 = true;
            !already_busy
        };

        if should_start {
            drain(self, scheduler.clone());
        }
        promise
    }
}

fn drain(dispatch: Arc<StatelessDispatch>, scheduler: Scheduler) {
    let next = {
        let mut guard = dispatch.queue.lock();
        match guard.0.pop_front() {
            Some(message) => Some(message),
            None => {
                guard.1 = false;
                None
            }
        }
    };

    let message = match next {
        Some(message) => message,
        None => return,
    };

    let this = dispatch.clone();
    let next_scheduler = scheduler.clone();
    scheduler.schedule(move || {
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| {
            this.actor.dispatch(&message.name, &message.args)
        })) {
            Ok(outcome) => outcome,
            Err(payload) => Outcome::from_error(panic_message(payload)),
        };
        message.promise.set(outcome);
        drain(this, next_scheduler);
    });
}

/// Wraps a loaded [`StatelessActor`] in a [`Mailbox`] that serializes every
/// call through it.
pub fn mailbox_for(actor: Arc<dyn StatelessActor>) -> Mailbox {
    let dispatch: Arc<dyn Dispatch> = Arc::new(StatelessDispatch {
        actor,
        queue: Mutex::new((VecDeque::new(), false)),
    });
    Mailbox::new(dispatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;
    impl StatelessActor for Echo {
        fn dispatch(&self, name: &str, args: &List) -> Outcome {
            if name == "echo" {
                Outcome::from_value(args.get(0).cloned().unwrap_or(crate::value::Value::Null))
            } else {
                Outcome::from_error(format!("unknown method: {name}"))
            }
        }
    }

    #[test]
    fn serializes_calls_through_the_loaded_actor() {
        let scheduler = Scheduler::new(4).unwrap();
        let mailbox = mailbox_for(Arc::new(Echo));
        let promise = mailbox.send(&scheduler, "echo", vec![42.into()].into_iter().collect::<List>());
        let (tx, rx) = std::sync::mpsc::channel();
        promise.then_result(&scheduler, move |v| tx.send(v.as_int().unwrap()).unwrap());
        assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(1)).unwrap(), 42);
    }
}
