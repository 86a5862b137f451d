//! Protocol module containing the settings record, its flags and the binary codec.

pub mod codec;
pub mod flags;
pub mod record;

pub use codec::{decode_settings, decode_settings_exact, encode_settings, encoded_len, CodecError};
pub use flags::{ConnectionFlags, Flag};
pub use record::*;
