//! Wire framing: a 4-byte big-endian length prefix around a format-encoded
//! `List`. [`FrameReader`] accumulates partial reads across repeated
//! short-timeout polls so a `Subscriber`/`Replier` loop can check its stop
//! promise between reads without losing a frame that straddles a timeout.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::Error;

pub(crate) fn write_frame(stream: &mut TcpStream, bytes: &[u8]) -> Result<(), Error> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| Error::EncodeError("frame exceeds u32::MAX bytes".into()))?
        .to_be_bytes();
    stream.write_all(&len)?;
    stream.write_all(bytes)?;
    stream.flush()?;
    Ok(())
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

enum Progress {
    Header { have: usize, buf: [u8; 4] },
    Body { len: usize, have: usize, buf: Vec<u8> },
}

/// Incremental reader for one connection's stream of length-prefixed frames.
pub(crate) struct FrameReader {
    stream: TcpStream,
    progress: Progress,
}

impl FrameReader {
    pub(crate) fn new(stream: TcpStream) -> Self {
        FrameReader {
            stream,
            progress: Progress::Header {
                have: 0,
                buf: [0; 4],
            },
        }
    }

    /// Reads for up to `timeout`. `Ok(Some(bytes))` is a fully assembled
    /// frame; `Ok(None)` means no frame completed within the timeout (a
    /// normal poll tick, not an error); `Err` is a fatal transport error.
    pub(crate) fn poll(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, Error> {
        self.stream.set_read_timeout(Some(timeout))?;
        loop {
            match &mut self.progress {
                Progress::Header { have, buf } => match self.stream.read(&mut buf[*have..]) {
                    Ok(0) => return Err(Error::TransportError("connection closed".into())),
                    Ok(n) => {
                        *have += n;
                        if *have == 4 {
                            let len = u32::from_be_bytes(*buf) as usize;
                            self.progress = Progress::Body {
                                len,
                                have: 0,
                                buf: vec![0u8; len],
                            };
                        } else {
                            return Ok(None);
                        }
                    }
                    Err(e) if is_timeout(&e) => return Ok(None),
                    Err(e) => return Err(e.into()),
                },
                Progress::Body { len, have, buf } => match self.stream.read(&mut buf[*have..*len])
                {
                    Ok(0) => return Err(Error::TransportError("connection closed".into())),
                    Ok(n) => {
                        *have += n;
                        if *have == *len {
                            let bytes = std::mem::take(buf);
                            self.progress = Progress::Header {
                                have: 0,
                                buf: [0; 4],
                            };
                            return Ok(Some(bytes));
                        }
                    }
                    Err(e) if is_timeout(&e) => return Ok(None),
                    Err(e) => return Err(e.into()),
                },
            }
        }
    }

    /// Blocks (via repeated bounded polls) until a full frame arrives.
    pub(crate) fn read_blocking(&mut self) -> Result<Vec<u8>, Error> {
        loop {
            if let Some(bytes) = self.poll(Duration::from_secs(5))? {
                return Ok(bytes);
            }
        }
    }

    pub(crate) fn try_clone_stream(&self) -> Result<TcpStream, Error> {
        Ok(self.stream.try_clone()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn round_trips_a_frame_over_a_real_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let writer = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            write_frame(&mut stream, b"hello").unwrap();
        });

        let (stream, _) = listener.accept().unwrap();
        let mut reader = FrameReader::new(stream);
        let bytes = reader.read_blocking().unwrap();
        assert_eq!(bytes, b"hello");
        writer.join().unwrap();
    }

    #[test]
    fn poll_returns_none_on_timeout_without_losing_partial_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let writer = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(&4u32.to_be_bytes()).unwrap();
            thread::sleep(Duration::from_millis(100));
            stream.write_all(b"ping").unwrap();
        });

        let (stream, _) = listener.accept().unwrap();
        let mut reader = FrameReader::new(stream);
        assert_eq!(reader.poll(Duration::from_millis(20)).unwrap(), None);
        let bytes = reader.read_blocking().unwrap();
        assert_eq!(bytes, b"ping");
        writer.join().unwrap();
    }
}
