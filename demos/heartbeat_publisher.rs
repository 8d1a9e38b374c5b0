//! Pairs with `heartbeat_subscriber`: binds `tcp://*:5556` and publishes a
//! `heart-beat` topic every second, counting up from 0.

use std::thread;
use std::time::Duration;

use porter::{Config, Context, Scheduler};

fn main() {
    let cfg = Config::load().unwrap_or_default();
    let scheduler = Scheduler::from_config(&cfg).expect("thread count >= 1");
    let context = Context::new();
    let publisher = context
        .publisher("tcp://*:5556", "json")
        .expect("bind heartbeat publisher");

    println!("publishing heart-beat on tcp://*:5556");
    for tick in 0..10 {
        publisher.publish(&scheduler, "heart-beat", tick);
        thread::sleep(Duration::from_secs(1));
    }

    scheduler.stop();
}
