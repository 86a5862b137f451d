//! # winproxy-core
//!
//! Shared library for winproxy containing the binary codec for the Windows
//! `DefaultConnectionSettings` value, the connection flag set and the bypass
//! list helpers.
//!
//! It has zero dependencies on OS APIs: the registry, files and the CLI all
//! live in the `winproxy` crate.
//!
//! # Architecture overview (for beginners)
//!
//! Windows keeps the per-user proxy configuration in a single opaque binary
//! registry value.  Nothing documents its layout, so the codec has to preserve
//! every byte it does not understand.  This crate defines:
//!
//! - **`protocol`** – How the record is laid out in bytes.  [`RawSettings`] is
//!   the typed record, [`ConnectionFlags`] the bitmask, and the codec turns one
//!   into the other without losing the unknown regions.
//!
//! - **`domain`** – Pure helpers with no knowledge of the byte layout.  The
//!   bypass list is stored as one `;`-delimited string; `domain::bypass` splits
//!   and joins it.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `winproxy_core::RawSettings` instead of `winproxy_core::protocol::record::RawSettings`.
pub use protocol::codec::{decode_settings, decode_settings_exact, encode_settings, CodecError};
pub use protocol::flags::{ConnectionFlags, Flag};
pub use protocol::record::RawSettings;
