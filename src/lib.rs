//! # QuorumKV Client
//!
//! Client library for the QuorumKV consensus-backed key-value store:
//! - Typed binary wire protocol (little-endian framing, tagged commands)
//! - Read-consistency policies (`Consistent`, `Inconsistent`, `AtLeast`)
//! - Atomic multi-step sequences (all-or-nothing server-side transactions)
//! - Typed error catalog decoded from wire result codes
//! - Blocking TCP protocol engine with one in-flight call per connection
//! - Fixed-size connection pool for concurrent callers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Client / ClientPool                      │
//! │              (typed methods: get, set, apply, ...)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Connection                              │
//! │        (prologue + hello handshake, request/response)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Command   │          │ ResultCode  │
//!   │  (catalog)  │          │  (catalog)  │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │    Codec    │
//!   │ (primitives)│
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ClientError, DecodeError, Result};
pub use config::Config;
pub use client::{Client, ClientPool, PooledClient};
pub use protocol::consistency::Consistency;
pub use protocol::sequence::{Sequence, Step};
pub use protocol::result_code::ErrorKind;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the QuorumKV client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
