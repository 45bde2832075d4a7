//! Primitive codecs
//!
//! Encoders and decoders for the wire protocol's primitive types. Every
//! primitive has exactly one canonical byte encoding; `read_*(write_*(v))`
//! is the identity for all representable values.
//!
//! Encoding appends to any [`bytes::BufMut`]. Decoding pulls from any
//! [`std::io::Read`] and consumes exactly the bytes a value declares, so
//! consecutive values (and consecutive responses on a socket) never bleed
//! into each other. Truncated input surfaces as [`DecodeError::Truncated`],
//! which is deliberately distinct from [`DecodeError::UnknownTag`].

use std::io::Read;

use bytes::BufMut;

use crate::error::{DecodeError, Result};

/// Sanity limit on declared string/blob/list lengths (16 MB)
pub const MAX_LENGTH: u32 = 16 * 1024 * 1024;

// =============================================================================
// Integers
// =============================================================================

/// Encode a signed 32-bit integer (4 bytes, little-endian)
pub fn write_i32<B: BufMut>(buf: &mut B, value: i32) {
    buf.put_i32_le(value);
}

/// Encode a signed 64-bit integer (8 bytes, little-endian)
pub fn write_i64<B: BufMut>(buf: &mut B, value: i64) {
    buf.put_i64_le(value);
}

/// Encode an unsigned 32-bit integer (lengths, counts, tags)
pub fn write_u32<B: BufMut>(buf: &mut B, value: u32) {
    buf.put_u32_le(value);
}

/// Decode a signed 32-bit integer
pub fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut bytes = [0u8; 4];
    read_exact(reader, &mut bytes, "i32")?;
    Ok(i32::from_le_bytes(bytes))
}

/// Decode a signed 64-bit integer
pub fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let mut bytes = [0u8; 8];
    read_exact(reader, &mut bytes, "i64")?;
    Ok(i64::from_le_bytes(bytes))
}

/// Decode an unsigned 32-bit integer
pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    read_exact(reader, &mut bytes, "u32")?;
    Ok(u32::from_le_bytes(bytes))
}

// =============================================================================
// Booleans
// =============================================================================

/// Encode a boolean as a single byte (`0x00`/`0x01`)
pub fn write_bool<B: BufMut>(buf: &mut B, value: bool) {
    buf.put_u8(value as u8);
}

/// Decode a boolean
///
/// Strict policy: only the canonical `0x00`/`0x01` are accepted. The
/// producer never emits anything else, so any other byte means the stream
/// is out of alignment.
pub fn read_bool<R: Read>(reader: &mut R) -> Result<bool> {
    let mut byte = [0u8; 1];
    read_exact(reader, &mut byte, "bool")?;
    match byte[0] {
        0x00 => Ok(false),
        0x01 => Ok(true),
        tag => Err(DecodeError::UnknownTag { what: "bool", tag }.into()),
    }
}

// =============================================================================
// Strings and Blobs
// =============================================================================

/// Encode a string: u32 byte length + raw UTF-8 bytes
///
/// The prefix counts bytes, not characters.
pub fn write_string<B: BufMut>(buf: &mut B, value: &str) {
    buf.put_u32_le(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

/// Decode a string
///
/// Reads exactly the declared number of bytes, never more; fewer available
/// bytes is a truncation error.
pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let bytes = read_blob(reader)?;
    String::from_utf8(bytes).map_err(|source| {
        DecodeError::InvalidUtf8 {
            what: "string",
            source,
        }
        .into()
    })
}

/// Encode an opaque blob: u32 length + raw bytes
pub fn write_blob<B: BufMut>(buf: &mut B, value: &[u8]) {
    buf.put_u32_le(value.len() as u32);
    buf.put_slice(value);
}

/// Decode an opaque length-prefixed blob
pub fn read_blob<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let len = read_u32(reader)?;
    if len > MAX_LENGTH {
        return Err(DecodeError::LengthOutOfRange {
            what: "blob",
            len: len as u64,
            max: MAX_LENGTH as u64,
        }
        .into());
    }
    let mut bytes = vec![0u8; len as usize];
    read_exact(reader, &mut bytes, "blob body")?;
    Ok(bytes)
}

// =============================================================================
// Options
// =============================================================================

/// Encode an option: tag byte `0` = absent, `1` = present + payload
pub fn write_option<B: BufMut, T>(
    buf: &mut B,
    value: Option<&T>,
    write: impl FnOnce(&mut B, &T),
) {
    match value {
        None => buf.put_u8(0x00),
        Some(inner) => {
            buf.put_u8(0x01);
            write(buf, inner);
        }
    }
}

/// Decode an option
pub fn read_option<R: Read, T>(
    reader: &mut R,
    read: impl FnOnce(&mut R) -> Result<T>,
) -> Result<Option<T>> {
    let mut byte = [0u8; 1];
    read_exact(reader, &mut byte, "option")?;
    match byte[0] {
        0x00 => Ok(None),
        0x01 => Ok(Some(read(reader)?)),
        tag => Err(DecodeError::UnknownTag { what: "option", tag }.into()),
    }
}

/// Encode an optional string (common enough to deserve a shorthand)
pub fn write_option_string<B: BufMut>(buf: &mut B, value: Option<&str>) {
    match value {
        None => buf.put_u8(0x00),
        Some(inner) => {
            buf.put_u8(0x01);
            write_string(buf, inner);
        }
    }
}

/// Decode an optional string
pub fn read_option_string<R: Read>(reader: &mut R) -> Result<Option<String>> {
    read_option(reader, read_string)
}

// =============================================================================
// Lists
// =============================================================================

/// Encode a list: u32 count + that many encodings, in order
///
/// An empty list is the bare count `0x00000000`.
pub fn write_list<B: BufMut, T>(buf: &mut B, items: &[T], mut write: impl FnMut(&mut B, &T)) {
    buf.put_u32_le(items.len() as u32);
    for item in items {
        write(buf, item);
    }
}

/// Decode a list
pub fn read_list<R: Read, T>(
    reader: &mut R,
    mut read: impl FnMut(&mut R) -> Result<T>,
) -> Result<Vec<T>> {
    let count = read_u32(reader)?;
    if count > MAX_LENGTH {
        return Err(DecodeError::LengthOutOfRange {
            what: "list",
            len: count as u64,
            max: MAX_LENGTH as u64,
        }
        .into());
    }
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(read(reader)?);
    }
    Ok(items)
}

/// Decode a list of strings
pub fn read_string_list<R: Read>(reader: &mut R) -> Result<Vec<String>> {
    read_list(reader, read_string)
}

/// Decode a list of optional strings
pub fn read_option_string_list<R: Read>(reader: &mut R) -> Result<Vec<Option<String>>> {
    read_list(reader, read_option_string)
}

/// Decode a list of key/value pairs
pub fn read_entry_list<R: Read>(reader: &mut R) -> Result<Vec<(String, String)>> {
    read_list(reader, |r| {
        let key = read_string(r)?;
        let value = read_string(r)?;
        Ok((key, value))
    })
}

// =============================================================================
// Unit
// =============================================================================

/// Decode a unit body (no bytes on the wire)
pub fn read_unit<R: Read>(_reader: &mut R) -> Result<()> {
    Ok(())
}

// =============================================================================
// Internals
// =============================================================================

/// `read_exact` with end-of-input mapped to a truncation error
fn read_exact<R: Read>(reader: &mut R, bytes: &mut [u8], what: &'static str) -> Result<()> {
    reader.read_exact(bytes).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            DecodeError::Truncated(what).into()
        } else {
            crate::ClientError::Io(e)
        }
    })
}
