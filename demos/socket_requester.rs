//! Pairs with `socket_replier`: connects to `tcp://localhost:5555` and
//! drives the same deposit/debit sequence as `account_local`, this time
//! over the wire.

use std::sync::mpsc;
use std::time::Duration;

use porter::{Config, Context, Scheduler, Value};

fn main() {
    let cfg = Config::load().unwrap_or_default();
    let scheduler = Scheduler::from_config(&cfg).expect("thread count >= 1");
    let context = Context::new();
    let requester = context
        .requester("tcp://localhost:5555", "json")
        .expect("connect account requester");
    let mailbox = requester.mailbox();

    let (tx, rx) = mpsc::channel();
    for (method, amount) in [
        ("deposit", 1000.0),
        ("deposit", 500.0),
        ("deposit", 0.0),
        ("debit", -2000.0),
        ("debit", 750.0),
        ("debit", 500.0),
    ] {
        let args = vec![Value::from(amount)].into_iter().collect();
        let promise = mailbox.send(&scheduler, method, args);
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
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
    scheduler.stop();
}
