//! Request/reply server: binds a listener, forwards every decoded request to
//! a local [`Mailbox`], and writes the settled outcome back. Like
//! [`super::Subscriber`], the returned promise is the stop handle — setting
//! it (externally, or from the accept loop once it notices) stops accepting
//! new connections and active connection threads exit at their next poll.

use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::address::Address;
use super::frame::{write_frame, FrameReader};
use crate::actor::Mailbox;
use crate::error::Error;
use crate::format::Format;
use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::scheduler::Scheduler;
use crate::value::{List, Value};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const REPLY_WAIT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Replier {
    listener: std::sync::Arc<TcpListener>,
    format: Format,
}

impl Replier {
    pub(crate) fn bind(address: Address, format: Format) -> Result<Self, Error> {
        let bind_addr = address.bind_addr()?;
        let listener = TcpListener::bind(&bind_addr)?;
        listener.set_nonblocking(true)?;
        log::debug!("replier bound on {bind_addr}");
        Ok(Replier {
            listener: std::sync::Arc::new(listener),
            format,
        })
    }

    /// Accepts connections and dispatches their requests to `mailbox` until
    /// the returned promise is settled.
    pub fn reply(&self, scheduler: &Scheduler, mailbox: Mailbox) -> Promise {
        let stop = Promise::new();
        let stop_loop = stop.clone();
        let listener = self.listener.clone();
        let format = self.format.clone();
        let scheduler = scheduler.clone();

        thread::spawn(move || {
            loop {
                if stop_loop.is_settled() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => {
                        let format = format.clone();
                        let mailbox = mailbox.clone();
                        let scheduler = scheduler.clone();
                        let stop = stop_loop.clone();
                        thread::spawn(move || serve_connection(stream, format, mailbox, scheduler, stop));
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(POLL_INTERVAL);
                    }
                    Err(e) => {
                        log::warn!("replier accept failed: {e}");
                        thread::sleep(POLL_INTERVAL);
                    }
                }
            }
            stop_loop.set(Outcome::from_value(()));
        });

        stop
    }
}

fn serve_connection(
    stream: TcpStream,
    format: Format,
    mailbox: Mailbox,
    scheduler: Scheduler,
    stop: Promise,
) {
    let mut reader = FrameReader::new(stream);
    let mut writer = match reader.try_clone_stream() {
        Ok(w) => w,
        Err(e) => {
            log::warn!("replier connection clone failed: {e}");
            return;
        }
    };

    loop {
        if stop.is_settled() {
            break;
        }
        let bytes = match reader.poll(POLL_INTERVAL) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => continue,
            Err(_) => break,
        };

        let request = match format.decode(&bytes) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("replier decode failed: {e}");
                continue;
            }
        };
        let (name, args) = match parse_request(&request) {
            Some(parsed) => parsed,
            None => {
                log::warn!("malformed request frame");
                continue;
            }
        };

        let outcome = dispatch_and_wait(&mailbox, &scheduler, &name, args);
        let (ok, payload) = match outcome {
            Outcome::Value(v) => (true, v),
            Outcome::Error(e) => (false, Value::from(e)),
        };
        let reply: List = vec![Value::Bool(ok), payload].into_iter().collect();
        let bytes = match format.encode(&Value::List(reply)) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("replier reply encode failed: {e}");
                break;
            }
        };
        if write_frame(&mut writer, &bytes).is_err() {
            break;
        }
    }
}

fn parse_request(request: &Value) -> Option<(String, List)> {
    let list = request.as_list().filter(|l| l.len() == 2)?;
    let name = list.get(0).and_then(Value::as_str)?.to_string();
    let args = list.get(1).and_then(Value::as_list)?.clone();
    Some((name, args))
}

fn dispatch_and_wait(mailbox: &Mailbox, scheduler: &Scheduler, name: &str, args: List) -> Outcome {
    let promise = mailbox.send(scheduler, name, args);
    let (tx, rx) = mpsc::channel();
    let tx_ok = tx.clone();
    promise.then_result(scheduler, move |v| {
        let _ = tx_ok.send(Outcome::Value(v));
    });
    promise.fail(scheduler, move |msg| {
        let _ = tx.send(Outcome::Error(msg));
    });
    rx.recv_timeout(REPLY_WAIT)
        .unwrap_or_else(|_| Outcome::from_error("reply timed out"))
}
