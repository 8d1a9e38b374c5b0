//! Fire-and-forget publish endpoint: binds a listener, fans every
//! `publish()` out to all currently-connected subscribers.

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::address::Address;
use super::frame::write_frame;
use crate::error::Error;
use crate::format::Format;
use crate::scheduler::Scheduler;
use crate::value::{List, Value};

#[derive(Clone)]
pub struct Publisher {
    streams: Arc<Mutex<Vec<std::net::TcpStream>>>,
    format: Format,
}

impl Publisher {
    pub(crate) fn bind(address: Address, format: Format) -> Result<Self, Error> {
        let bind_addr = address.bind_addr()?;
        let listener = TcpListener::bind(&bind_addr)?;
        log::debug!("publisher bound on {bind_addr}");

        let streams: Arc<Mutex<Vec<std::net::TcpStream>>> = Arc::new(Mutex::new(Vec::new()));
        let accepted = streams.clone();
        thread::spawn(move || {
            for incoming in listener.incoming() {
                match incoming {
                    Ok(stream) => accepted.lock().push(stream),
                    Err(e) => log::warn!("publisher accept failed: {e}"),
                }
            }
        });

        Ok(Publisher { streams, format })
    }

    /// Encodes `(topic, value)` and writes it to every connected subscriber
    /// on `scheduler`; dead connections are pruned silently.
    pub fn publish(&self, scheduler: &Scheduler, topic: impl Into<String>, value: impl Into<Value>) {
        let topic = topic.into();
        let value = value.into();
        let format = self.format.clone();
        let streams = self.streams.clone();
        scheduler.schedule(move || {
            let frame: List = vec![Value::from(topic), value].into_iter().collect();
            let bytes = match format.encode(&Value::List(frame)) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("publish encode failed: {e}");
                    return;
                }
            };
            let mut guard = streams.lock();
            guard.retain_mut(|stream| write_frame(stream, &bytes).is_ok());
        });
    }
}
