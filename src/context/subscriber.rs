//! Publish/subscribe consumer: connects to a publisher, filters to the
//! requested topics, and delivers `(topic, value)` pairs to a callback run
//! on the scheduler. The returned promise doubles as a stop handle:
//! setting it ends the listen loop, and the loop sets it itself once a
//! ≥2s gap in publisher activity is observed.

use std::collections::HashSet;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::address::Address;
use super::frame::FrameReader;
use crate::error::Error;
use crate::format::Format;
use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::scheduler::Scheduler;
use crate::value::Value;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const IDLE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct Subscriber {
    stream: Arc<TcpStream>,
    format: Format,
    topics: HashSet<String>,
}

impl Subscriber {
    pub(crate) fn connect(
        address: Address,
        format: Format,
        topics: Vec<String>,
    ) -> Result<Self, Error> {
        let connect_addr = address.connect_addr()?;
        let stream = TcpStream::connect(&connect_addr)?;
        log::debug!("subscriber connected to {connect_addr}");
        Ok(Subscriber {
            stream: Arc::new(stream),
            format,
            topics: topics.into_iter().collect(),
        })
    }

    /// Spawns a background reader thread and returns its stop promise.
    /// `on_message` runs on `scheduler` for every matching frame.
    pub fn listen<F>(&self, scheduler: &Scheduler, on_message: F) -> Promise
    where
        F: Fn(String, Value) + Send + Sync + 'static,
    {
        let stop = Promise::new();
        let stop_loop = stop.clone();
        let stream = self
            .stream
            .try_clone()
            .expect("tcp stream clones for the reader thread");
        let mut reader = FrameReader::new(stream);
        let format = self.format.clone();
        let topics = self.topics.clone();
        let on_message = Arc::new(on_message);
        let scheduler = scheduler.clone();

        thread::spawn(move || {
            let mut last_activity = Instant::now();
            loop {
                if stop_loop.is_settled() {
                    break;
                }
                match reader.poll(POLL_INTERVAL) {
                    Ok(Some(bytes)) => {
                        last_activity = Instant::now();
                        deliver(&format, &bytes, &topics, &on_message, &scheduler);
                    }
                    Ok(None) => {
                        if last_activity.elapsed() >= IDLE_TIMEOUT {
                            log::debug!("subscriber idle timeout: no publisher activity");
                            stop_loop.set(Outcome::from_value(()));
                            break;
                        }
                    }
                    Err(e) => {
                        stop_loop.set(Outcome::from_error(format!("transport error: {e}")));
                        break;
                    }
                }
            }
            stop_loop.set(Outcome::from_value(()));
        });

        stop
    }
}

fn deliver(
    format: &Format,
    bytes: &[u8],
    topics: &HashSet<String>,
    on_message: &Arc<dyn Fn(String, Value) + Send + Sync>,
    scheduler: &Scheduler,
) {
    let decoded = match format.decode(bytes) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("subscriber decode failed: {e}");
            return;
        }
    };
    let list = match decoded.as_list() {
        Some(list) if list.len() == 2 => list,
        _ => {
            log::warn!("malformed publish frame");
            return;
        }
    };
    let topic = match list.get(0).and_then(Value::as_str) {
        Some(topic) => topic.to_string(),
        None => {
            log::warn!("malformed publish frame: topic is not a string");
            return;
        }
    };
    let value = list.get(1).cloned().unwrap_or(Value::Null);
    if topics.is_empty() || topics.contains(&topic) {
        let on_message = on_message.clone();
        scheduler.schedule(move || on_message(topic, value));
    }
}
