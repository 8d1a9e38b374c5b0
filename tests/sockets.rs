//! Transport integration: a real TCP requester/replier pair and a real
//! publisher/subscriber pair, each bound to an ephemeral port so the test
//! suite can run concurrently without colliding on fixed ports.

use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use porter::{Actor, Context, List, Outcome, Scheduler, Value};

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

fn echo_actor() -> Actor<()> {
    let actor = Actor::new(());
    actor.define_reader("echo", |_state: &(), args: &List| {
        Outcome::from_value(args.get(0).cloned().unwrap_or(Value::Null))
    });
    actor
}

#[test]
fn requester_and_replier_round_trip_over_tcp() {
    let scheduler = Scheduler::new(4).unwrap();
    let context = Context::new();
    let port = free_port();

    let replier = context.replier(&format!("tcp://*:{port}")).unwrap();
    let stop = replier.reply(&scheduler, echo_actor().mailbox());
    thread::sleep(Duration::from_millis(100));

    let requester = context
        .requester(&format!("tcp://localhost:{port}"), "json")
        .unwrap();
    let promise = requester
        .mailbox()
        .send(&scheduler, "echo", vec![Value::from("ping")].into_iter().collect());

    let (tx, rx) = mpsc::channel();
    promise.then_result(&scheduler, move |v| tx.send(v).unwrap());
    let reply = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(reply, Value::from("ping"));

    stop.set(Outcome::from_value(()));
    scheduler.stop();
}

#[test]
fn subscriber_only_receives_topics_it_subscribed_to() {
    let scheduler = Scheduler::new(4).unwrap();
    let context = Context::new();
    let port = free_port();

    let publisher = context.publisher(&format!("tcp://*:{port}"), "json").unwrap();
    thread::sleep(Duration::from_millis(100));

    let subscriber = context
        .subscriber(&format!("tcp://localhost:{port}"), vec!["wanted".to_string()])
        .unwrap();
    thread::sleep(Duration::from_millis(100));

    let (tx, rx) = mpsc::channel();
    let _stop = subscriber.listen(&scheduler, move |topic, value| {
        tx.send((topic, value)).unwrap();
    });

    publisher.publish(&scheduler, "ignored", 1);
    publisher.publish(&scheduler, "wanted", 42);

    let (topic, value) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(topic, "wanted");
    assert_eq!(value, Value::Int(42));
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

    scheduler.stop();
}
