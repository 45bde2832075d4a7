//! Response status handling
//!
//! Every response opens with a 4-byte result code. Zero means the typed
//! body follows; nonzero means the body is a length-prefixed UTF-8 error
//! message, decoded here and raised as a typed server error. The status
//! must be inspected before any body decoding is attempted.

use std::io::Read;

use crate::error::{ClientError, Result};
use crate::protocol::codec;
use crate::protocol::result_code::{ErrorKind, SUCCESS};

/// Read and check the leading result code.
///
/// On success returns `Ok(())` with the reader positioned at the typed
/// body. On a nonzero code, consumes the error message so the stream stays
/// aligned on the next response boundary, then fails with the mapped kind.
pub fn read_status<R: Read>(reader: &mut R) -> Result<()> {
    let code = codec::read_u32(reader)?;
    if code == SUCCESS {
        return Ok(());
    }
    let message = codec::read_string(reader)?;
    Err(ClientError::Server {
        kind: ErrorKind::from_code(code),
        message,
    })
}
