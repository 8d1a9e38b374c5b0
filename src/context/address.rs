//! URI-style transport addresses: `tcp://*:PORT` to bind, `tcp://HOST:PORT`
//! to connect.

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    /// Bind on all interfaces at this port (`tcp://*:PORT`).
    Bind(u16),
    /// Connect to `host:port` (`tcp://HOST:PORT`).
    Connect(String, u16),
}

impl Address {
    pub fn parse(raw: &str) -> Result<Address, Error> {
        let rest = raw.strip_prefix("tcp://").ok_or_else(|| {
            Error::InvalidAddress(raw.to_string(), "only the tcp:// scheme is supported".into())
        })?;

        let (host, port) = rest.rsplit_once(':').ok_or_else(|| {
            Error::InvalidAddress(raw.to_string(), "expected host:port".into())
        })?;

        let port: u16 = port.parse().map_err(|_| {
            Error::InvalidAddress(raw.to_string(), format!("invalid port \"{port}\""))
        })?;

        if host == "*" {
            Ok(Address::Bind(port))
        } else {
            Ok(Address::Connect(host.to_string(), port))
        }
    }

    /// The address a `TcpListener` should bind to.
    pub(crate) fn bind_addr(&self) -> Result<String, Error> {
        match self {
            Address::Bind(port) => Ok(format!("0.0.0.0:{port}")),
            Address::Connect(host, port) => Err(Error::InvalidAddress(
                format!("{host}:{port}"),
                "expected a wildcard (tcp://*:PORT) bind address".into(),
            )),
        }
    }

    /// The address a `TcpStream` should connect to.
    pub(crate) fn connect_addr(&self) -> Result<String, Error> {
        match self {
            Address::Connect(host, port) => Ok(format!("{host}:{port}")),
            Address::Bind(port) => Err(Error::InvalidAddress(
                format!("*:{port}"),
                "expected a named host (tcp://HOST:PORT) connect address".into(),
            )),
        }
    }
}
