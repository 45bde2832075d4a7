//! Connection Handler
//!
//! One TCP connection to one cluster node, with the prologue and hello
//! handshake already performed. Exactly one request may be in flight at a
//! time; the response decoder is coupled to that request's expected shape,
//! so responses pair with requests in strict issue order.

use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::protocol::codec;
use crate::protocol::command::{Command, COMMAND_MASK, PROTOCOL_VERSION};
use crate::protocol::response;

/// An established, handshaken connection to a node
#[derive(Debug)]
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Server version banner from the hello exchange
    server_version: String,
}

impl Connection {
    /// Open a connection: TCP connect, send the prologue, run the hello
    /// handshake
    ///
    /// Fails with a connection error on transport failure; a handshake
    /// rejection (e.g. wrong cluster) surfaces as the server error the
    /// node reported.
    pub fn open(addr: &str, config: &Config) -> Result<Self> {
        let stream = Self::connect_stream(addr, config)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut conn = Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            server_version: String::new(),
        };

        conn.send_prologue(&config.cluster_id)?;
        conn.server_version = conn.request(
            &Command::Hello {
                client_id: config.client_id.clone(),
                cluster_id: config.cluster_id.clone(),
            },
            codec::read_string,
        )?;

        tracing::debug!(
            "handshake with {} complete: {}",
            conn.peer_addr,
            conn.server_version
        );

        Ok(conn)
    }

    /// TCP connect with the configured timeout
    fn connect_stream(addr: &str, config: &Config) -> Result<TcpStream> {
        if config.connect_timeout_ms == 0 {
            return Ok(TcpStream::connect(addr)?);
        }
        let timeout = Duration::from_millis(config.connect_timeout_ms);
        let mut last_err: Option<std::io::Error> = None;
        for sock_addr in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&sock_addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => ClientError::Io(e),
            None => ClientError::Handshake(format!("address {addr} did not resolve")),
        })
    }

    /// Send the connection prologue: magic, protocol version, cluster id.
    /// The prologue has no response; a mismatch is reported on the first
    /// command.
    fn send_prologue(&mut self, cluster_id: &str) -> Result<()> {
        let mut buf = Vec::with_capacity(8 + 4 + cluster_id.len());
        codec::write_u32(&mut buf, COMMAND_MASK);
        codec::write_u32(&mut buf, PROTOCOL_VERSION);
        codec::write_string(&mut buf, cluster_id);
        self.writer.write_all(&buf)?;
        self.writer.flush()?;
        Ok(())
    }

    /// One full request/response exchange.
    ///
    /// Writes the frame in order without interleaving, flushes, then reads
    /// the result code and hands the reader to the typed body decoder. The
    /// decoder consumes exactly the response body, never bytes of the next
    /// response.
    pub fn request<T, F>(&mut self, command: &Command, decode: F) -> Result<T>
    where
        F: FnOnce(&mut BufReader<TcpStream>) -> Result<T>,
    {
        tracing::trace!("sending {:?} to {}", command.code(), self.peer_addr);

        let frame = command.to_bytes();
        self.writer.write_all(&frame)?;
        self.writer.flush()?;

        response::read_status(&mut self.reader)?;
        decode(&mut self.reader)
    }

    /// The peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// The version banner the server sent during the handshake
    pub fn server_version(&self) -> &str {
        &self.server_version
    }
}
