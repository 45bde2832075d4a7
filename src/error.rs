//! Error types for the QuorumKV client
//!
//! Provides a unified error type for all operations, split along the
//! protocol's failure classes: connection failures, decode failures,
//! server-reported errors, and caller-side validation.

use thiserror::Error;

use crate::protocol::result_code::ErrorKind;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Unified error type for QuorumKV client operations
#[derive(Debug, Error)]
pub enum ClientError {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not connected")]
    NotConnected,

    #[error("handshake failed: {0}")]
    Handshake(String),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    // -------------------------------------------------------------------------
    // Server-Reported Errors
    // -------------------------------------------------------------------------
    #[error("server error ({kind}): {message}")]
    Server { kind: ErrorKind, message: String },

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    #[error("validation error: {0}")]
    Validation(String),
}

impl ClientError {
    /// Whether this error leaves the connection in an unusable state.
    ///
    /// A transport failure or a malformed response means the stream position
    /// is unknown; partial reads cannot be rewound, so the connection must
    /// be dropped. Server-reported errors consume their full error body and
    /// leave the stream aligned on the next response boundary.
    pub fn poisons_connection(&self) -> bool {
        matches!(
            self,
            ClientError::Io(_) | ClientError::Decode(_) | ClientError::Handshake(_)
        )
    }

    /// The server-reported error kind, if this is a server error
    pub fn server_kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Server { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Errors produced while decoding wire bytes
///
/// Decoders never recover locally: every malformed input surfaces one of
/// these at the call site, and the current call is abandoned.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input ended before the declared/fixed width was available.
    /// Distinct from [`DecodeError::UnknownTag`]: the bytes seen so far
    /// were well-formed, there just were not enough of them.
    #[error("truncated input while decoding {0}")]
    Truncated(&'static str),

    /// A tag byte outside the closed set for the type being decoded
    #[error("unknown {what} tag: 0x{tag:02x}")]
    UnknownTag { what: &'static str, tag: u8 },

    /// A declared length exceeding the protocol's sanity limit
    #[error("{what} length {len} exceeds maximum {max}")]
    LengthOutOfRange {
        what: &'static str,
        len: u64,
        max: u64,
    },

    /// String bytes that are not valid UTF-8
    #[error("invalid UTF-8 in {what}")]
    InvalidUtf8 {
        what: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
}
