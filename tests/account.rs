//! End-to-end account actor coverage, driven entirely through the public
//! crate surface (no module-private access): the happy-path deposit/debit
//! sequence and the invalid-amount error path.

use std::sync::mpsc;
use std::time::Duration;

use porter::{Actor, List, Outcome, Scheduler, Value};

fn account() -> Actor<f64> {
    let actor = Actor::new(0.0f64);
    actor.define_writer("deposit", |balance: &mut f64, args: &List| {
        let amount = args.get(0).and_then(Value::as_float).unwrap_or(0.0);
        if amount <= 0.0 {
            return Outcome::from_error("invalid amount");
        }
        *balance += amount;
        Outcome::from_value(*balance)
    });
    actor.define_writer("debit", |balance: &mut f64, args: &List| {
        let amount = args.get(0).and_then(Value::as_float).unwrap_or(0.0);
        if amount <= 0.0 || amount > *balance {
            return Outcome::from_error("invalid amount");
        }
        *balance -= amount;
        Outcome::from_value(*balance)
    });
    actor.define_reader("balance", |balance: &f64, _args: &List| {
        Outcome::from_value(*balance)
    });
    actor
}

fn args(values: Vec<Value>) -> List {
    values.into_iter().collect()
}

fn send(
    scheduler: &Scheduler,
    mailbox: &porter::Mailbox,
    method: &str,
    amount: f64,
) -> Result<f64, String> {
    let promise = mailbox.send(scheduler, method, args(vec![amount.into()]));
    let (tx, rx) = mpsc::channel();
    let tx_ok = tx.clone();
    promise.then_result(scheduler, move |v| {
        tx_ok.send(Ok(v.as_float().unwrap())).unwrap();
    });
    promise.fail(scheduler, move |msg| {
        tx.send(Err(msg)).unwrap();
    });
    rx.recv_timeout(Duration::from_secs(2)).unwrap()
}

#[test]
fn deposits_and_debits_follow_the_happy_and_error_paths() {
    let scheduler = Scheduler::new(4).unwrap();
    let account = account();
    let mailbox = account.mailbox();

    assert_eq!(send(&scheduler, &mailbox, "deposit", 1000.0), Ok(1000.0));
    assert_eq!(send(&scheduler, &mailbox, "deposit", 500.0), Ok(1500.0));
    assert_eq!(
        send(&scheduler, &mailbox, "deposit", 0.0),
        Err("invalid amount".to_string())
    );
    assert_eq!(
        send(&scheduler, &mailbox, "debit", -2000.0),
        Err("invalid amount".to_string())
    );
    assert_eq!(send(&scheduler, &mailbox, "debit", 750.0), Ok(750.0));
    assert_eq!(send(&scheduler, &mailbox, "debit", 500.0), Ok(250.0));

    scheduler.stop();
}

#[test]
fn unknown_method_fails_without_touching_balance() {
    let scheduler = Scheduler::new(2).unwrap();
    let account = account();
    let mailbox = account.mailbox();

    let promise = mailbox.send(&scheduler, "withdraw-all", List::new());
    let (tx, rx) = mpsc::channel();
    promise.fail(&scheduler, move |msg| tx.send(msg).unwrap());
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(1)).unwrap(),
        "unknown method: withdraw-all"
    );

    assert_eq!(send(&scheduler, &mailbox, "balance", 0.0), Ok(0.0));
    scheduler.stop();
}
