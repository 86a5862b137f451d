//! The `DefaultConnectionSettings` record.
//!
//! Wire layout (all integers little-endian):
//! ```text
//! [reserved:4][version:4][flags:4]
//! [proxy_len:4][proxy:N][bypass_len:4][bypass:N][script_len:4][script:N]
//! [trailer:32]
//! ```
//! The meaning of `reserved` and `trailer` is unknown.  They are stored as
//! opaque byte arrays and written back exactly as they were read.

use std::fmt;

use crate::protocol::flags::{ConnectionFlags, Flag};

// ── Layout constants ──────────────────────────────────────────────────────────

/// Size of the fixed header: reserved + version + flags.
pub const HEADER_SIZE: usize = 12;

/// Size of each string length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of the unknown trailing block.
pub const TRAILER_SIZE: usize = 32;

/// Smallest valid encoding: header, three empty strings and the trailer.
pub const MIN_ENCODED_SIZE: usize = HEADER_SIZE + 3 * LENGTH_PREFIX_SIZE + TRAILER_SIZE;

/// Value Windows writes into the reserved field of a freshly created record.
pub const DEFAULT_RESERVED: i32 = 70;

/// Decoded `DefaultConnectionSettings` value.
///
/// String fields are raw byte runs: the registry value carries no encoding
/// information, so nothing here assumes UTF-8.
#[derive(Clone, PartialEq, Eq)]
pub struct RawSettings {
    /// Unknown legacy field, round-tripped verbatim.
    pub reserved: [u8; 4],
    /// Incremented on every write; never validated.
    pub version: i32,
    pub flags: ConnectionFlags,
    /// `host:port`, or empty.
    pub proxy_address: Vec<u8>,
    /// `;`-delimited list of hosts that bypass the proxy.
    pub bypass_list: Vec<u8>,
    /// URL of the auto-configuration script.
    pub script_address: Vec<u8>,
    /// Unknown trailing block, round-tripped verbatim.
    pub trailer: [u8; TRAILER_SIZE],
}

impl RawSettings {
    /// Creates the record Windows would write on a fresh profile:
    /// `reserved = 70`, `version = 0`, `flags = Direct`, everything else empty.
    pub fn new() -> Self {
        Self {
            reserved: DEFAULT_RESERVED.to_le_bytes(),
            version: 0,
            flags: ConnectionFlags::from(Flag::Direct),
            proxy_address: Vec::new(),
            bypass_list: Vec::new(),
            script_address: Vec::new(),
            trailer: [0u8; TRAILER_SIZE],
        }
    }

    /// Returns the reserved field read as a little-endian integer.
    pub fn reserved_value(&self) -> i32 {
        i32::from_le_bytes(self.reserved)
    }
}

impl Default for RawSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSettings")
            .field("reserved", &self.reserved_value())
            .field("version", &self.version)
            .field("flags", &format_args!("{}", self.flags))
            .field("proxy_address", &String::from_utf8_lossy(&self.proxy_address))
            .field("bypass_list", &String::from_utf8_lossy(&self.bypass_list))
            .field("script_address", &String::from_utf8_lossy(&self.script_address))
            .finish_non_exhaustive()
    }
}
