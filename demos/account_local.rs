//! A local Account actor driven entirely in-process, no transport involved:
//! deposits and debits against a running balance, including the invalid
//! amount cases.

use std::sync::mpsc;
use std::time::Duration;

use porter::{Actor, Config, List, Outcome, Scheduler, Value};

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

fn main() {
    let cfg = Config::load().unwrap_or_default();
    let scheduler = Scheduler::from_config(&cfg).expect("thread count >= 1");
    let account = account();
    let mailbox = account.mailbox();

    let (tx, rx) = mpsc::channel();
    for (method, amount) in [
        ("deposit", 1000.0),
        ("deposit", 500.0),
        ("deposit", 0.0),
        ("debit", -2000.0),
        ("debit", 750.0),
        ("debit", 500.0),
    ] {
        let promise = mailbox.send(&scheduler, method, args(vec![amount.into()]));
        let label = format!("{method}({amount})");
        let tx_ok = tx.clone();
        let label_ok = label.clone();
        promise.then_result(&scheduler, move |v| {
            println!("{label_ok} -> {v:?}");
            tx_ok.send(()).unwrap();
        });
        let tx_err = tx.clone();
        promise.fail(&scheduler, move |msg| {
            println!("{label} -> Error({msg})");
            tx_err.send(()).unwrap();
        });
    }

    for _ in 0..6 {
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
    }
    scheduler.stop();
}
