//! Protocol Module
//!
//! Defines the client-side wire protocol for QuorumKV.
//!
//! ## Wire Format
//!
//! All multi-byte scalars are little-endian.
//!
//! ### Request Format
//! ```text
//! ┌───────────────────┬──────────────────────────────────────┐
//! │ Tag (4)           │  arg1 arg2 ... argN                  │
//! │ code | 0xb1ff0000 │  (per-command argument encodings)    │
//! └───────────────────┴──────────────────────────────────────┘
//! ```
//!
//! ### Response Format
//! ```text
//! ┌───────────────────┬──────────────────────────────────────┐
//! │ Result code (4)   │  body                                │
//! │ 0 = success       │  typed return value on success,      │
//! │ nonzero = error   │  length-prefixed error msg otherwise │
//! └───────────────────┴──────────────────────────────────────┘
//! ```
//!
//! ### Primitive Encodings
//! - `i32`/`i64`: fixed-width little-endian, signed
//! - string: u32 byte length + raw UTF-8
//! - bool: one byte, `0x00`/`0x01`
//! - option: one tag byte (`0`/`1`) + payload if present
//! - list: u32 count + that many encodings, in order
//!
//! ### Connection Prologue
//! Sent once per connection, before any command, with no response:
//! ```text
//! magic (4) = 0xb1ff0000, version (4) = 1, cluster_id (string)
//! ```

pub mod codec;
pub mod consistency;
pub mod result_code;
pub mod command;
pub mod sequence;
pub mod response;

pub use command::{Command, CommandCode, COMMAND_MASK, PROTOCOL_VERSION};
pub use consistency::Consistency;
pub use result_code::{ErrorKind, SUCCESS};
pub use sequence::{Sequence, Step};
