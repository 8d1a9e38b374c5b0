//! Request/reply client: connects once and exposes a [`Mailbox`] that
//! proxies sends over the wire. Correlation is strictly synchronous per
//! connection — the proxy is itself a [`StatelessActor`], and
//! [`StatelessDispatch`](crate::actor) already serializes every call through
//! one mailbox, so the connection is never shared across an overlapping
//! request without extra bookkeeping.

use std::net::TcpStream;

use parking_lot::Mutex;

use super::address::Address;
use super::frame::{write_frame, FrameReader};
use crate::actor::{Mailbox, StatelessActor};
use crate::error::Error;
use crate::format::Format;
use crate::outcome::Outcome;
use crate::value::{List, Value};

pub struct Requester {
    mailbox: Mailbox,
}

impl Requester {
    pub(crate) fn connect(address: Address, format: Format) -> Result<Self, Error> {
        let connect_addr = address.connect_addr()?;
        let stream = TcpStream::connect(&connect_addr)?;
        log::debug!("requester connected to {connect_addr}");
        let reader = FrameReader::new(stream);
        let writer = reader.try_clone_stream()?;
        let proxy = RequesterProxy {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            format,
        };
        Ok(Requester {
            mailbox: crate::actor::mailbox_for(std::sync::Arc::new(proxy)),
        })
    }

    pub fn mailbox(&self) -> Mailbox {
        self.mailbox.clone()
    }
}

struct RequesterProxy {
    writer: Mutex<TcpStream>,
    reader: Mutex<FrameReader>,
    format: Format,
}

impl StatelessActor for RequesterProxy {
    fn dispatch(&self, name: &str, args: &List) -> Outcome {
        let request: List = vec![Value::from(name), Value::List(args.clone())]
            .into_iter()
            .collect();
        let bytes = match self.format.encode(&Value::List(request)) {
            Ok(bytes) => bytes,
            Err(e) => return Outcome::from_error(format!("encode error: {e}")),
        };

        if let Err(e) = write_frame(&mut self.writer.lock(), &bytes) {
            return Outcome::from_error(format!("transport error: {e}"));
        }

        let reply_bytes = match self.reader.lock().read_blocking() {
            Ok(bytes) => bytes,
            Err(e) => return Outcome::from_error(format!("transport error: {e}")),
        };

        let reply = match self.format.decode(&reply_bytes) {
            Ok(value) => value,
            Err(e) => return Outcome::from_error(format!("decode error: {e}")),
        };
        decode_reply(&reply)
    }
}

fn decode_reply(reply: &Value) -> Outcome {
    let list = match reply.as_list() {
        Some(list) if list.len() == 2 => list,
        _ => return Outcome::from_error("malformed reply frame"),
    };
    let ok = list.get(0).and_then(Value::as_bool).unwrap_or(false);
    let payload = list.get(1).cloned().unwrap_or(Value::Null);
    if ok {
        Outcome::from_value(payload)
    } else {
        let message = payload.as_str().unwrap_or("unknown error").to_string();
        Outcome::from_error(message)
    }
}
