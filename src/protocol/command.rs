//! Command catalog
//!
//! One variant per RPC. A command carries its bound arguments and knows its
//! stable wire code and how to encode itself as a request frame; the typed
//! response decoder is selected by the caller at compile time (see the
//! client methods). Commands are built per call and never mutated.

use bytes::BufMut;

use crate::protocol::codec;
use crate::protocol::consistency::Consistency;
use crate::protocol::sequence::Sequence;

/// Command-class mask OR-ed into every request tag.
///
/// Doubles as the connection prologue magic. Documented constant; do not
/// alter.
pub const COMMAND_MASK: u32 = 0xb1ff_0000;

/// Protocol version sent in the connection prologue
pub const PROTOCOL_VERSION: u32 = 1;

/// Stable wire codes, one per command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CommandCode {
    Hello = 0x01,
    WhoMaster = 0x02,
    Exists = 0x07,
    Get = 0x08,
    Set = 0x09,
    Delete = 0x0a,
    Range = 0x0b,
    PrefixKeys = 0x0c,
    TestAndSet = 0x0d,
    RangeEntries = 0x0f,
    Sequence = 0x10,
    MultiGet = 0x11,
    Statistics = 0x13,
    CollapseTlogs = 0x14,
    SyncedSequence = 0x24,
    OptimizeDb = 0x25,
    DefragDb = 0x26,
    DeletePrefix = 0x27,
    Version = 0x28,
    DropMaster = 0x30,
    MultiGetOption = 0x31,
    Nop = 0x41,
}

/// A request with its arguments bound
#[derive(Debug, Clone)]
pub enum Command {
    /// Handshake; returns the server version banner
    Hello {
        client_id: String,
        cluster_id: String,
    },

    /// Ask which node currently holds mastership
    WhoMaster,

    /// Check whether a key exists
    Exists {
        consistency: Consistency,
        key: String,
    },

    /// Read the value of a key
    Get {
        consistency: Consistency,
        key: String,
    },

    /// Write a key/value pair
    Set { key: String, value: String },

    /// Remove a key
    Delete { key: String },

    /// List keys in a range; `max` < 0 means unbounded
    Range {
        consistency: Consistency,
        begin: Option<String>,
        begin_inclusive: bool,
        end: Option<String>,
        end_inclusive: bool,
        max: i32,
    },

    /// List keys starting with a prefix
    PrefixKeys {
        consistency: Consistency,
        prefix: String,
        max: i32,
    },

    /// Atomically replace a value if it matches the expected one;
    /// returns the previous value
    TestAndSet {
        key: String,
        expected: Option<String>,
        replacement: Option<String>,
    },

    /// List key/value pairs in a range
    RangeEntries {
        consistency: Consistency,
        begin: Option<String>,
        begin_inclusive: bool,
        end: Option<String>,
        end_inclusive: bool,
        max: i32,
    },

    /// Execute a multi-step sequence atomically; `sync` forces an fsync
    /// before the server acknowledges
    Sequence { sequence: Sequence, sync: bool },

    /// Read several keys; fails if any is missing
    MultiGet {
        consistency: Consistency,
        keys: Vec<String>,
    },

    /// Fetch the server's statistics blob
    Statistics,

    /// Ask the node to collapse its transaction logs down to `count`
    CollapseTlogs { count: i32 },

    /// Trigger a database optimization pass on the node
    OptimizeDb,

    /// Trigger database defragmentation on the node
    DefragDb,

    /// Remove every key starting with a prefix; returns how many
    DeletePrefix { prefix: String },

    /// Fetch the server version triple and info string
    Version,

    /// Ask the master to resign
    DropMaster,

    /// Read several keys, `None` for the missing ones
    MultiGetOption {
        consistency: Consistency,
        keys: Vec<String>,
    },

    /// No-op that still runs through consensus
    Nop,
}

impl Command {
    /// The command's stable wire code
    pub fn code(&self) -> CommandCode {
        match self {
            Command::Hello { .. } => CommandCode::Hello,
            Command::WhoMaster => CommandCode::WhoMaster,
            Command::Exists { .. } => CommandCode::Exists,
            Command::Get { .. } => CommandCode::Get,
            Command::Set { .. } => CommandCode::Set,
            Command::Delete { .. } => CommandCode::Delete,
            Command::Range { .. } => CommandCode::Range,
            Command::PrefixKeys { .. } => CommandCode::PrefixKeys,
            Command::TestAndSet { .. } => CommandCode::TestAndSet,
            Command::RangeEntries { .. } => CommandCode::RangeEntries,
            // The synced execution mode is a separate envelope code
            Command::Sequence { sync: false, .. } => CommandCode::Sequence,
            Command::Sequence { sync: true, .. } => CommandCode::SyncedSequence,
            Command::MultiGet { .. } => CommandCode::MultiGet,
            Command::Statistics => CommandCode::Statistics,
            Command::CollapseTlogs { .. } => CommandCode::CollapseTlogs,
            Command::OptimizeDb => CommandCode::OptimizeDb,
            Command::DefragDb => CommandCode::DefragDb,
            Command::DeletePrefix { .. } => CommandCode::DeletePrefix,
            Command::Version => CommandCode::Version,
            Command::DropMaster => CommandCode::DropMaster,
            Command::MultiGetOption { .. } => CommandCode::MultiGetOption,
            Command::Nop => CommandCode::Nop,
        }
    }

    /// The full 4-byte request tag: code OR-ed with the command mask
    pub fn tag(&self) -> u32 {
        self.code() as u32 | COMMAND_MASK
    }

    /// Encode the request frame: tag + arguments in declared order
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::write_u32(buf, self.tag());

        match self {
            Command::Hello {
                client_id,
                cluster_id,
            } => {
                codec::write_string(buf, client_id);
                codec::write_string(buf, cluster_id);
            }

            Command::WhoMaster
            | Command::Statistics
            | Command::OptimizeDb
            | Command::DefragDb
            | Command::Version
            | Command::DropMaster
            | Command::Nop => {}

            Command::Exists { consistency, key } | Command::Get { consistency, key } => {
                consistency.encode(buf);
                codec::write_string(buf, key);
            }

            Command::Set { key, value } => {
                codec::write_string(buf, key);
                codec::write_string(buf, value);
            }

            Command::Delete { key } => {
                codec::write_string(buf, key);
            }

            Command::Range {
                consistency,
                begin,
                begin_inclusive,
                end,
                end_inclusive,
                max,
            }
            | Command::RangeEntries {
                consistency,
                begin,
                begin_inclusive,
                end,
                end_inclusive,
                max,
            } => {
                consistency.encode(buf);
                codec::write_option_string(buf, begin.as_deref());
                codec::write_bool(buf, *begin_inclusive);
                codec::write_option_string(buf, end.as_deref());
                codec::write_bool(buf, *end_inclusive);
                codec::write_i32(buf, *max);
            }

            Command::PrefixKeys {
                consistency,
                prefix,
                max,
            } => {
                consistency.encode(buf);
                codec::write_string(buf, prefix);
                codec::write_i32(buf, *max);
            }

            Command::TestAndSet {
                key,
                expected,
                replacement,
            } => {
                codec::write_string(buf, key);
                codec::write_option_string(buf, expected.as_deref());
                codec::write_option_string(buf, replacement.as_deref());
            }

            // The step list serializes into its own blob, which travels as
            // one length-prefixed string argument
            Command::Sequence { sequence, .. } => {
                codec::write_blob(buf, &sequence.to_bytes());
            }

            Command::MultiGet { consistency, keys }
            | Command::MultiGetOption { consistency, keys } => {
                consistency.encode(buf);
                codec::write_list(buf, keys, |b, k| codec::write_string(b, k));
            }

            Command::CollapseTlogs { count } => {
                codec::write_i32(buf, *count);
            }

            Command::DeletePrefix { prefix } => {
                codec::write_string(buf, prefix);
            }
        }
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}
