//! Client Module
//!
//! The protocol engine: a blocking TCP client with one in-flight call per
//! connection, plus a fixed-size pool for concurrent callers.
//!
//! Per-call lifecycle on a connection:
//! ```text
//! Disconnected ──connect──▶ Connected
//!      ▲                        │ call: send frame, await status,
//!      │                        ▼       decode typed body
//!      └──── transport/decode ──┘
//!            failure
//! ```
//! Responses pair strictly with requests in issue order; a failure
//! mid-call poisons the connection and the caller must reconnect.

mod connection;
mod pool;

pub use connection::Connection;
pub use pool::{ClientPool, PooledClient};

use std::io::BufReader;
use std::net::TcpStream;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::protocol::codec;
use crate::protocol::command::Command;
use crate::protocol::consistency::Consistency;
use crate::protocol::sequence::Sequence;

/// A blocking client for one QuorumKV cluster
///
/// Owns at most one connection. Every method is a single request/response
/// exchange; no retries happen internally. When a call fails on the
/// transport, the connection is dropped and subsequent calls fail with
/// [`ClientError::NotConnected`] until [`Client::connect`] succeeds again.
#[derive(Debug)]
pub struct Client {
    config: Config,
    conn: Option<Connection>,
}

impl Client {
    /// Create a disconnected client; fails fast on an unusable config
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, conn: None })
    }

    /// Connect to the first reachable configured node and perform the
    /// prologue + hello handshake
    pub fn connect(&mut self) -> Result<()> {
        let mut last_err = ClientError::NotConnected;
        for addr in &self.config.nodes {
            match Connection::open(addr, &self.config) {
                Ok(conn) => {
                    tracing::debug!("connected to {}", conn.peer_addr());
                    self.conn = Some(conn);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("connection to {} failed: {}", addr, e);
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    /// Whether a connection is currently established
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Drop the connection, if any
    pub fn close(&mut self) {
        self.conn = None;
    }

    /// Connect if not already connected
    pub fn ensure_connected(&mut self) -> Result<()> {
        if self.conn.is_none() {
            self.connect()?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Read Operations
    // -------------------------------------------------------------------------

    /// Read the value of a key; `NotFound` if it does not exist
    pub fn get(&mut self, consistency: Option<Consistency>, key: &str) -> Result<String> {
        self.request(
            Command::Get {
                consistency: consistency.unwrap_or_default(),
                key: key.to_string(),
            },
            codec::read_string,
        )
    }

    /// Check whether a key exists
    pub fn exists(&mut self, consistency: Option<Consistency>, key: &str) -> Result<bool> {
        self.request(
            Command::Exists {
                consistency: consistency.unwrap_or_default(),
                key: key.to_string(),
            },
            codec::read_bool,
        )
    }

    /// Read several keys at once; fails with `NotFound` if any is missing
    pub fn multi_get(
        &mut self,
        consistency: Option<Consistency>,
        keys: &[String],
    ) -> Result<Vec<String>> {
        self.request(
            Command::MultiGet {
                consistency: consistency.unwrap_or_default(),
                keys: keys.to_vec(),
            },
            codec::read_string_list,
        )
    }

    /// Read several keys at once, `None` for the missing ones
    pub fn multi_get_option(
        &mut self,
        consistency: Option<Consistency>,
        keys: &[String],
    ) -> Result<Vec<Option<String>>> {
        self.request(
            Command::MultiGetOption {
                consistency: consistency.unwrap_or_default(),
                keys: keys.to_vec(),
            },
            codec::read_option_string_list,
        )
    }

    /// List keys starting with a prefix; `max` < 0 means unbounded
    pub fn prefix_keys(
        &mut self,
        consistency: Option<Consistency>,
        prefix: &str,
        max: i32,
    ) -> Result<Vec<String>> {
        self.request(
            Command::PrefixKeys {
                consistency: consistency.unwrap_or_default(),
                prefix: prefix.to_string(),
                max,
            },
            codec::read_string_list,
        )
    }

    /// List keys in a range; `None` bounds are open-ended
    #[allow(clippy::too_many_arguments)]
    pub fn range(
        &mut self,
        consistency: Option<Consistency>,
        begin: Option<&str>,
        begin_inclusive: bool,
        end: Option<&str>,
        end_inclusive: bool,
        max: i32,
    ) -> Result<Vec<String>> {
        self.request(
            Command::Range {
                consistency: consistency.unwrap_or_default(),
                begin: begin.map(str::to_string),
                begin_inclusive,
                end: end.map(str::to_string),
                end_inclusive,
                max,
            },
            codec::read_string_list,
        )
    }

    /// List key/value pairs in a range
    #[allow(clippy::too_many_arguments)]
    pub fn range_entries(
        &mut self,
        consistency: Option<Consistency>,
        begin: Option<&str>,
        begin_inclusive: bool,
        end: Option<&str>,
        end_inclusive: bool,
        max: i32,
    ) -> Result<Vec<(String, String)>> {
        self.request(
            Command::RangeEntries {
                consistency: consistency.unwrap_or_default(),
                begin: begin.map(str::to_string),
                begin_inclusive,
                end: end.map(str::to_string),
                end_inclusive,
                max,
            },
            codec::read_entry_list,
        )
    }

    // -------------------------------------------------------------------------
    // Write Operations
    // -------------------------------------------------------------------------

    /// Write a key/value pair
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.request(
            Command::Set {
                key: key.to_string(),
                value: value.to_string(),
            },
            codec::read_unit,
        )
    }

    /// Remove a key; `NotFound` if it does not exist
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.request(
            Command::Delete {
                key: key.to_string(),
            },
            codec::read_unit,
        )
    }

    /// Remove every key starting with a prefix; returns how many were removed
    pub fn delete_prefix(&mut self, prefix: &str) -> Result<i32> {
        self.request(
            Command::DeletePrefix {
                prefix: prefix.to_string(),
            },
            codec::read_i32,
        )
    }

    /// Atomically replace a value if it matches `expected`; returns the
    /// previous value either way
    pub fn test_and_set(
        &mut self,
        key: &str,
        expected: Option<&str>,
        replacement: Option<&str>,
    ) -> Result<Option<String>> {
        self.request(
            Command::TestAndSet {
                key: key.to_string(),
                expected: expected.map(str::to_string),
                replacement: replacement.map(str::to_string),
            },
            codec::read_option_string,
        )
    }

    /// Execute a sequence atomically; with `sync` the server fsyncs before
    /// acknowledging. A failed assert surfaces as one `assertion-failed`
    /// error and no step is applied.
    pub fn apply(&mut self, sequence: Sequence, sync: bool) -> Result<()> {
        self.request(Command::Sequence { sequence, sync }, codec::read_unit)
    }

    // -------------------------------------------------------------------------
    // Cluster / Admin Operations
    // -------------------------------------------------------------------------

    /// Which node currently holds mastership, if any
    pub fn who_master(&mut self) -> Result<Option<String>> {
        self.request(Command::WhoMaster, codec::read_option_string)
    }

    /// Fetch the server's statistics blob (opaque server-defined layout)
    pub fn statistics(&mut self) -> Result<Vec<u8>> {
        self.request(Command::Statistics, codec::read_blob)
    }

    /// Fetch the server version triple and build info string
    pub fn version(&mut self) -> Result<(i32, i32, i32, String)> {
        self.request(Command::Version, |r| {
            let major = codec::read_i32(r)?;
            let minor = codec::read_i32(r)?;
            let patch = codec::read_i32(r)?;
            let info = codec::read_string(r)?;
            Ok((major, minor, patch, info))
        })
    }

    /// No-op that still runs through consensus
    pub fn nop(&mut self) -> Result<()> {
        self.request(Command::Nop, codec::read_unit)
    }

    /// Ask the master to resign
    pub fn drop_master(&mut self) -> Result<()> {
        self.request(Command::DropMaster, codec::read_unit)
    }

    /// Trigger a database optimization pass on the node
    pub fn optimize_db(&mut self) -> Result<()> {
        self.request(Command::OptimizeDb, codec::read_unit)
    }

    /// Trigger database defragmentation on the node
    pub fn defrag_db(&mut self) -> Result<()> {
        self.request(Command::DefragDb, codec::read_unit)
    }

    /// Ask the node to collapse its transaction logs down to `count`
    pub fn collapse_tlogs(&mut self, count: i32) -> Result<()> {
        self.request(Command::CollapseTlogs { count }, codec::read_unit)
    }

    // -------------------------------------------------------------------------
    // Call Path
    // -------------------------------------------------------------------------

    /// The single call path every operation goes through.
    ///
    /// A transport or decode failure leaves the stream position unknown, so
    /// the connection is dropped before the error propagates.
    fn request<T, F>(&mut self, command: Command, decode: F) -> Result<T>
    where
        F: FnOnce(&mut BufReader<TcpStream>) -> Result<T>,
    {
        let conn = self.conn.as_mut().ok_or(ClientError::NotConnected)?;
        match conn.request(&command, decode) {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.poisons_connection() {
                    tracing::warn!("dropping connection after failed call: {}", e);
                    self.conn = None;
                }
                Err(e)
            }
        }
    }
}
