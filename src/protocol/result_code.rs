//! Result code catalog
//!
//! The first 4 bytes of every response carry a result code: zero for
//! success, nonzero for one of the published error codes. Unrecognized
//! codes map to [`ErrorKind::Unknown`] rather than failing decode.

use std::fmt;

/// The success result code
pub const SUCCESS: u32 = 0x00;

/// Server-reported error kinds, one per published wire code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 0x01: request lacked the command magic
    NoMagic,
    /// 0x02: quorum cannot be reached
    TooManyDeadNodes,
    /// 0x03: command sent before the hello handshake
    NoHello,
    /// 0x04: node is not the master
    NotMaster,
    /// 0x05: key does not exist
    NotFound,
    /// 0x06: prologue named a different cluster
    WrongCluster,
    /// 0x07: an assert step did not hold
    AssertionFailed,
    /// 0x08: node is in read-only mode
    ReadOnly,
    /// 0x09: key outside the node's interval
    OutsideInterval,
    /// 0x10: node is shutting down
    GoingDown,
    /// 0x20: operation not supported by this node
    NotSupported,
    /// 0x21: node lost mastership mid-operation
    NoLongerMaster,
    /// 0x26: server rejected the request arguments
    BadInput,
    /// 0x80: requested consistency could not be satisfied
    InconsistentRead,
    /// 0xfe: node connection limit reached
    MaxConnections,
    /// 0xff: unspecified server failure
    UnknownFailure,
    /// Any code without a named mapping
    Unknown(u32),
}

impl ErrorKind {
    /// Map a nonzero wire code to its kind; never panics
    pub fn from_code(code: u32) -> Self {
        match code {
            0x01 => ErrorKind::NoMagic,
            0x02 => ErrorKind::TooManyDeadNodes,
            0x03 => ErrorKind::NoHello,
            0x04 => ErrorKind::NotMaster,
            0x05 => ErrorKind::NotFound,
            0x06 => ErrorKind::WrongCluster,
            0x07 => ErrorKind::AssertionFailed,
            0x08 => ErrorKind::ReadOnly,
            0x09 => ErrorKind::OutsideInterval,
            0x10 => ErrorKind::GoingDown,
            0x20 => ErrorKind::NotSupported,
            0x21 => ErrorKind::NoLongerMaster,
            0x26 => ErrorKind::BadInput,
            0x80 => ErrorKind::InconsistentRead,
            0xfe => ErrorKind::MaxConnections,
            0xff => ErrorKind::UnknownFailure,
            other => ErrorKind::Unknown(other),
        }
    }

    /// The wire code for this kind
    pub fn code(&self) -> u32 {
        match self {
            ErrorKind::NoMagic => 0x01,
            ErrorKind::TooManyDeadNodes => 0x02,
            ErrorKind::NoHello => 0x03,
            ErrorKind::NotMaster => 0x04,
            ErrorKind::NotFound => 0x05,
            ErrorKind::WrongCluster => 0x06,
            ErrorKind::AssertionFailed => 0x07,
            ErrorKind::ReadOnly => 0x08,
            ErrorKind::OutsideInterval => 0x09,
            ErrorKind::GoingDown => 0x10,
            ErrorKind::NotSupported => 0x20,
            ErrorKind::NoLongerMaster => 0x21,
            ErrorKind::BadInput => 0x26,
            ErrorKind::InconsistentRead => 0x80,
            ErrorKind::MaxConnections => 0xfe,
            ErrorKind::UnknownFailure => 0xff,
            ErrorKind::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NoMagic => write!(f, "no-magic"),
            ErrorKind::TooManyDeadNodes => write!(f, "too-many-dead-nodes"),
            ErrorKind::NoHello => write!(f, "no-hello"),
            ErrorKind::NotMaster => write!(f, "not-master"),
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::WrongCluster => write!(f, "wrong-cluster"),
            ErrorKind::AssertionFailed => write!(f, "assertion-failed"),
            ErrorKind::ReadOnly => write!(f, "read-only"),
            ErrorKind::OutsideInterval => write!(f, "outside-interval"),
            ErrorKind::GoingDown => write!(f, "going-down"),
            ErrorKind::NotSupported => write!(f, "not-supported"),
            ErrorKind::NoLongerMaster => write!(f, "no-longer-master"),
            ErrorKind::BadInput => write!(f, "bad-input"),
            ErrorKind::InconsistentRead => write!(f, "inconsistent-read"),
            ErrorKind::MaxConnections => write!(f, "max-connections"),
            ErrorKind::UnknownFailure => write!(f, "unknown-failure"),
            ErrorKind::Unknown(code) => write!(f, "unknown-code-0x{code:02x}"),
        }
    }
}
