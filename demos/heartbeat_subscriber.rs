//! Pairs with `heartbeat_publisher`: connects to `tcp://localhost:5556`,
//! subscribes to `heart-beat`, and prints every delivered tick until the
//! listener stops itself (publisher gone quiet, or a transport error).

use std::thread;
use std::time::Duration;

use porter::{Config, Context, Scheduler};

fn main() {
    let cfg = Config::load().unwrap_or_default();
    let scheduler = Scheduler::from_config(&cfg).expect("thread count >= 1");
    let context = Context::new();
    let subscriber = context
        .subscriber("tcp://localhost:5556", vec!["heart-beat".to_string()])
        .expect("connect heartbeat subscriber");

    let stop = subscriber.listen(&scheduler, |topic, value| {
        println!("{topic}: {value:?}");
    });

    let outcome = loop {
        if let Some(outcome) = stop.peek() {
            break outcome;
        }
        thread::sleep(Duration::from_millis(100));
    };
    println!("subscriber stopped: {outcome:?}");
    scheduler.stop();
}
