//! Read-consistency policies
//!
//! Every read-capable command carries exactly one [`Consistency`]. Callers
//! that pass `None` get [`Consistency::Consistent`]: the alias encodes to
//! the same single byte, so the two are indistinguishable on the wire.

use std::io::Read;

use bytes::BufMut;

use crate::error::{DecodeError, Result};
use crate::protocol::codec;

/// How stale a read is allowed to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consistency {
    /// Strong read through the current master
    #[default]
    Consistent,

    /// Best-effort read; any node may answer from possibly stale state
    Inconsistent,

    /// Read no older than logical counter `i`
    AtLeast(i64),
}

impl Consistency {
    /// Encode: `Consistent` = `0x00`, `Inconsistent` = `0x01`,
    /// `AtLeast(i)` = `0x02` + i64
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        match self {
            Consistency::Consistent => buf.put_u8(0x00),
            Consistency::Inconsistent => buf.put_u8(0x01),
            Consistency::AtLeast(i) => {
                buf.put_u8(0x02);
                codec::write_i64(buf, *i);
            }
        }
    }

    /// Decode a consistency policy; any tag outside the closed set fails
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                crate::ClientError::from(DecodeError::Truncated("consistency"))
            } else {
                crate::ClientError::Io(e)
            }
        })?;
        match byte[0] {
            0x00 => Ok(Consistency::Consistent),
            0x01 => Ok(Consistency::Inconsistent),
            0x02 => Ok(Consistency::AtLeast(codec::read_i64(reader)?)),
            tag => Err(DecodeError::UnknownTag {
                what: "consistency",
                tag,
            }
            .into()),
        }
    }
}
