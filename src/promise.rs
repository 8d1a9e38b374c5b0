//! Single-assignment futures with `then_result`/`fail` continuations.
//!
//! A `Promise` is a cheaply-cloneable handle to a one-shot cell. Registering
//! a continuation while the cell is `Pending` enqueues it; once `set` settles
//! the cell, every enqueued continuation (and any registered afterwards) is
//! handed to a scheduler so it never runs on the setter's own stack. The same
//! handle doubles as the "stop promise" producers like `Subscriber`/`Replier`
//! poll: there is no separate resolver type.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::panic_message;
use crate::outcome::Outcome;
use crate::scheduler::Scheduler;
use crate::value::Value;

type Continuation = Box<dyn FnOnce(Outcome) + Send>;

enum State {
    Pending(Vec<Continuation>),
    Settled(Outcome),
}

struct Inner {
    state: Mutex<State>,
}

/// A single-assignment outcome cell with chainable continuations.
#[derive(Clone)]
pub struct Promise(Arc<Inner>);

impl Promise {
    pub fn new() -> Self {
        Promise(Arc::new(Inner {
            state: Mutex::new(State::Pending(Vec::new())),
        }))
    }

    /// Transitions Pending -> Settled. A second call is a no-op; the
    /// winning `set` drains and runs every registered continuation.
    pub fn set(&self, outcome: impl Into<Outcome>) {
        let outcome = outcome.into();
        let continuations = {
            let mut state = self.0.state.lock();
            match &*state {
                State::Settled(_) => {
                    log::debug!("set called on an already-settled promise; ignoring");
                    return;
                }
                State::Pending(_) => {
                    let previous = std::mem::replace(&mut *state, State::Settled(outcome.clone()));
                    match previous {
                        State::Pending(conts) => conts,
                        State::Settled(_) => unreachable!(),
                    }
                }
            }
        };
        for cont in continuations {
            cont(outcome.clone());
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(&*self.0.state.lock(), State::Settled(_))
    }

    /// The settled outcome, if any. Never blocks.
    pub fn peek(&self) -> Option<Outcome> {
        match &*self.0.state.lock() {
            State::Settled(outcome) => Some(outcome.clone()),
            State::Pending(_) => None,
        }
    }

    /// Registers a raw continuation. If already settled, runs it immediately
    /// (on the caller's stack) with the stored outcome; `then_result`/`fail`
    /// build on this to hand their own work off to a scheduler regardless.
    fn on_settle<F>(&self, f: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let mut state = self.0.state.lock();
        match &mut *state {
            State::Settled(outcome) => {
                let outcome = outcome.clone();
                drop(state);
                f(outcome);
            }
            State::Pending(conts) => conts.push(Box::new(f)),
        }
    }

    /// On success, schedules `f(value)` on `scheduler` and its return becomes
    /// the downstream promise's outcome; on error, the error propagates
    /// unchanged (without invoking `f`).
    pub fn then_result<F, T>(&self, scheduler: &Scheduler, f: F) -> Promise
    where
        F: FnOnce(Value) -> T + Send + 'static,
        T: Into<Outcome>,
    {
        let downstream = Promise::new();
        let out = downstream.clone();
        let scheduler = scheduler.clone();
        self.on_settle(move |outcome| match outcome {
            Outcome::Value(value) => {
                let out = out.clone();
                scheduler.schedule(move || {
                    let settled = run_continuation(move || f(value));
                    out.set(settled);
                });
            }
            Outcome::Error(message) => out.set(Outcome::Error(message)),
        });
        downstream
    }

    /// On error, schedules `f(message)` on `scheduler` and its return becomes
    /// a *success* of the downstream promise; on success, the value
    /// propagates unchanged (without invoking `f`).
    pub fn fail<F, T>(&self, scheduler: &Scheduler, f: F) -> Promise
    where
        F: FnOnce(String) -> T + Send + 'static,
        T: Into<Outcome>,
    {
        let downstream = Promise::new();
        let out = downstream.clone();
        let scheduler = scheduler.clone();
        self.on_settle(move |outcome| match outcome {
            Outcome::Value(value) => out.set(Outcome::Value(value)),
            Outcome::Error(message) => {
                let out = out.clone();
                scheduler.schedule(move || {
                    let settled = run_continuation(move || f(message));
                    out.set(settled);
                });
            }
        });
        downstream
    }
}

impl Default for Promise {
    fn default() -> Self {
        Promise::new()
    }
}

/// Runs a continuation, folding a panic into the downstream error channel
/// instead of letting it unwind the worker.
fn run_continuation<F, T>(f: F) -> Outcome
where
    F: FnOnce() -> T,
    T: Into<Outcome>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value.into(),
        Err(payload) => Outcome::from_error(panic_message(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn set_settles_and_ignores_second_set() {
        let promise = Promise::new();
        promise.set(Outcome::from_value(1));
        promise.set(Outcome::from_value(2));
        assert_eq!(promise.peek(), Some(Outcome::from_value(1)));
    }

    #[test]
    fn then_result_runs_on_success_and_propagates_value() {
        let scheduler = Scheduler::new(2).unwrap();
        let promise = Promise::new();
        let downstream = promise.then_result(&scheduler, |v| {
            Outcome::from_value(v.as_int().unwrap() + 1)
        });
        promise.set(Outcome::from_value(41));

        let (tx, rx) = mpsc::channel();
        downstream.then_result(&scheduler, move |v| {
            tx.send(v.as_int().unwrap()).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 42);
    }

    #[test]
    fn then_result_skips_on_error() {
        let scheduler = Scheduler::new(1).unwrap();
        let promise = Promise::new();
        let downstream = promise.then_result(&scheduler, |_: Value| Outcome::from_value(0));
        promise.set(Outcome::from_error("boom"));

        let (tx, rx) = mpsc::channel();
        downstream.fail(&scheduler, move |msg| {
            tx.send(msg).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), "boom");
    }

    #[test]
    fn fail_turns_error_into_success() {
        let scheduler = Scheduler::new(1).unwrap();
        let promise = Promise::new();
        let downstream = promise.fail(&scheduler, |_msg| Outcome::from_value("recovered"));
        promise.set(Outcome::from_error("boom"));

        let (tx, rx) = mpsc::channel();
        downstream.then_result(&scheduler, move |v| {
            tx.send(v.as_str().unwrap().to_string()).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), "recovered");
    }

    #[test]
    fn continuation_registered_after_settle_runs_immediately() {
        let scheduler = Scheduler::new(1).unwrap();
        let promise = Promise::new();
        promise.set(Outcome::from_value(7));

        let (tx, rx) = mpsc::channel();
        promise.then_result(&scheduler, move |v| {
            tx.send(v.as_int().unwrap()).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 7);
    }

    #[test]
    fn panicking_continuation_settles_downstream_as_error() {
        let scheduler = Scheduler::new(1).unwrap();
        let promise = Promise::new();
        let downstream: Promise = promise.then_result(&scheduler, |_: Value| -> Outcome {
            panic!("continuation exploded")
        });
        promise.set(Outcome::from_value(()));

        let (tx, rx) = mpsc::channel();
        downstream.fail(&scheduler, move |msg| {
            tx.send(msg).unwrap();
        });
        let msg = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(msg.contains("continuation exploded"));
    }
}
