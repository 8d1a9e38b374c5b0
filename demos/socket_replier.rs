//! Pairs with `socket_requester`: binds `tcp://*:5555` and forwards every
//! decoded request to a local Account actor's mailbox.

use std::thread;
use std::time::Duration;

use porter::{Actor, Config, Context, List, Outcome, Scheduler, Value};

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

fn main() {
    let cfg = Config::load().unwrap_or_default();
    let scheduler = Scheduler::from_config(&cfg).expect("thread count >= 1");
    let context = Context::new();
    let replier = context
        .replier("tcp://*:5555")
        .expect("bind account replier");

    let account = account();
    let stop = replier.reply(&scheduler, account.mailbox());

    println!("serving Account on tcp://*:5555");
    while !stop.is_settled() {
        thread::sleep(Duration::from_millis(200));
    }
    scheduler.stop();
}
