//! Transport
//!
//! One TCP connection to an SSDB server.

use std::io::{self, BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::config::{Endpoint, DEFAULT_CONNECT_TIMEOUT};
use crate::error::{ConnError, Result};
use crate::protocol::read_frame;

/// A live connection to one server
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Resolve the endpoint and connect to the first address that accepts.
    pub fn open(endpoint: &Endpoint) -> Result<Self> {
        let addr = endpoint.addr();
        let addrs: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|source| ConnError::Resolve {
                addr: addr.clone(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(ConnError::NoAddress { addr }.into());
        }

        let timeout = if endpoint.connect_timeout.is_zero() {
            DEFAULT_CONNECT_TIMEOUT
        } else {
            endpoint.connect_timeout
        };

        let mut last_err = None;
        for socket_addr in &addrs {
            match TcpStream::connect_timeout(socket_addr, timeout) {
                Ok(stream) => {
                    return Self::new(stream).map_err(|source| {
                        ConnError::Connect {
                            addr: addr.clone(),
                            source,
                        }
                        .into()
                    });
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", socket_addr, e);
                    last_err = Some(e);
                }
            }
        }

        let source = last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no address tried"));
        Err(ConnError::Connect { addr, source }.into())
    }

    /// Wrap an already-connected stream
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm: every command waits for its reply
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        })
    }

    /// Set the read timeout. `None` blocks indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)
    }

    /// Write a whole frame and flush it
    pub fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()
    }

    /// Block until one complete reply frame has been read
    pub fn read_frame(&mut self) -> Result<Bytes> {
        read_frame(&mut self.reader)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
