//! Binary codec for the `DefaultConnectionSettings` registry value.
//!
//! Wire format:
//! ```text
//! [reserved:4][version:4][flags:4]
//! [len:4][proxy_address:len][len:4][bypass_list:len][len:4][script_address:len]
//! [trailer:32]
//! ```
//! All integers are little-endian `i32`.  Strings are raw byte runs with no
//! terminator and no encoding check.  There are no tags: fields are read and
//! written in exactly this order.
//!
//! Decoding checks every length against the bytes that are actually left
//! before slicing, so a corrupt or hostile blob can only produce an error,
//! never an out-of-bounds read.

use thiserror::Error;
use tracing::trace;

use crate::protocol::flags::ConnectionFlags;
use crate::protocol::record::{RawSettings, MIN_ENCODED_SIZE, TRAILER_SIZE};

/// Errors that can occur while encoding or decoding a settings record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A field declares more bytes than remain in the input, or declares a
    /// negative length.
    #[error("truncated input reading {field}: declared {declared} bytes, {available} available")]
    TruncatedInput {
        field: &'static str,
        declared: i64,
        available: usize,
    },

    /// Bytes remain after the trailing block.  Only reported by
    /// [`decode_settings_exact`]; [`decode_settings`] leaves the decision to
    /// the caller.
    #[error("{count} unexpected trailing bytes after the settings record")]
    TrailingBytes { count: usize },

    /// A string is too long for its `i32` length prefix.
    #[error("{field} is {len} bytes long, which does not fit a 32-bit length prefix")]
    FieldTooLong { field: &'static str, len: usize },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Returns the number of bytes [`encode_settings`] will produce for `settings`.
pub fn encoded_len(settings: &RawSettings) -> usize {
    MIN_ENCODED_SIZE
        + settings.proxy_address.len()
        + settings.bypass_list.len()
        + settings.script_address.len()
}

/// Encodes a [`RawSettings`] into the registry byte layout.
///
/// # Errors
///
/// Returns [`CodecError::FieldTooLong`] if a string field exceeds `i32::MAX`
/// bytes.
///
/// # Examples
///
/// ```rust
/// use winproxy_core::protocol::{decode_settings, encode_settings, RawSettings};
///
/// let raw = RawSettings::new();
/// let bytes = encode_settings(&raw).unwrap();
/// let (decoded, consumed) = decode_settings(&bytes).unwrap();
/// assert_eq!(decoded, raw);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_settings(settings: &RawSettings) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(encoded_len(settings));

    buf.extend_from_slice(&settings.reserved);
    buf.extend_from_slice(&settings.version.to_le_bytes());
    buf.extend_from_slice(&settings.flags.bits().to_le_bytes());
    write_length_prefixed(&mut buf, "proxy_address", &settings.proxy_address)?;
    write_length_prefixed(&mut buf, "bypass_list", &settings.bypass_list)?;
    write_length_prefixed(&mut buf, "script_address", &settings.script_address)?;
    buf.extend_from_slice(&settings.trailer);

    Ok(buf)
}

/// Decodes one [`RawSettings`] from the beginning of `bytes`.
///
/// Returns the record and the number of bytes consumed.  Bytes after the
/// trailing block are not an error here: Windows itself has been seen to
/// leave them, and the legacy tools ignored them.  Compare the consumed count
/// with `bytes.len()` to detect them, or use [`decode_settings_exact`].
///
/// # Errors
///
/// Returns [`CodecError::TruncatedInput`] if any field runs past the end of
/// the input or a length prefix is negative.
pub fn decode_settings(bytes: &[u8]) -> Result<(RawSettings, usize), CodecError> {
    let mut reader = Reader::new(bytes);

    let settings = RawSettings {
        reserved: reader.read_array("reserved")?,
        version: reader.read_i32("version")?,
        flags: ConnectionFlags::from_bits_retain(reader.read_i32("flags")?),
        proxy_address: reader.read_length_prefixed("proxy_address")?,
        bypass_list: reader.read_length_prefixed("bypass_list")?,
        script_address: reader.read_length_prefixed("script_address")?,
        trailer: reader.read_array::<TRAILER_SIZE>("trailer")?,
    };

    trace!(
        consumed = reader.offset,
        total = bytes.len(),
        "decoded settings record"
    );
    Ok((settings, reader.offset))
}

/// Decodes a [`RawSettings`] that must span `bytes` exactly.
///
/// # Errors
///
/// Returns [`CodecError::TruncatedInput`] as [`decode_settings`] does, and
/// [`CodecError::TrailingBytes`] if anything follows the trailing block.
pub fn decode_settings_exact(bytes: &[u8]) -> Result<RawSettings, CodecError> {
    let (settings, consumed) = decode_settings(bytes)?;
    if consumed < bytes.len() {
        return Err(CodecError::TrailingBytes {
            count: bytes.len() - consumed,
        });
    }
    Ok(settings)
}

// ── Encode helpers ────────────────────────────────────────────────────────────

/// Writes a 4-byte little-endian length prefix followed by the raw bytes.
fn write_length_prefixed(
    buf: &mut Vec<u8>,
    field: &'static str,
    bytes: &[u8],
) -> Result<(), CodecError> {
    let len = i32::try_from(bytes.len()).map_err(|_| CodecError::FieldTooLong {
        field,
        len: bytes.len(),
    })?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

// ── Decode helpers ────────────────────────────────────────────────────────────

/// Bounds-checked cursor over the input.
struct Reader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    fn truncated(&self, field: &'static str, declared: i64) -> CodecError {
        CodecError::TruncatedInput {
            field,
            declared,
            available: self.remaining(),
        }
    }

    /// Takes the next `len` bytes, or fails without moving the cursor.
    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(self.truncated(field, i64::try_from(len).unwrap_or(i64::MAX)));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.buf[start..self.offset])
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let bytes = self.take(field, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn read_i32(&mut self, field: &'static str) -> Result<i32, CodecError> {
        self.read_array::<4>(field).map(i32::from_le_bytes)
    }

    /// Reads a 4-byte length prefix and then that many raw bytes.
    fn read_length_prefixed(&mut self, field: &'static str) -> Result<Vec<u8>, CodecError> {
        let declared = self.read_i32(field)?;
        let len = usize::try_from(declared).map_err(|_| self.truncated(field, declared.into()))?;
        Ok(self.take(field, len)?.to_vec())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::flags::Flag;
    use crate::protocol::record::HEADER_SIZE;

    /// A blob as Windows writes it with a manual proxy and `<local>` bypass.
    fn windows_blob() -> Vec<u8> {
        let mut blob = Vec::new();
        blob.extend_from_slice(&70i32.to_le_bytes());
        blob.extend_from_slice(&5i32.to_le_bytes());
        blob.extend_from_slice(&3i32.to_le_bytes());
        blob.extend_from_slice(&14i32.to_le_bytes());
        blob.extend_from_slice(b"127.0.0.1:7890");
        blob.extend_from_slice(&7i32.to_le_bytes());
        blob.extend_from_slice(b"<local>");
        blob.extend_from_slice(&0i32.to_le_bytes());
        blob.extend_from_slice(&[0u8; TRAILER_SIZE]);
        blob
    }

    fn sample_settings() -> RawSettings {
        let mut trailer = [0u8; TRAILER_SIZE];
        for (i, byte) in trailer.iter_mut().enumerate() {
            *byte = i as u8 ^ 0x5A;
        }
        RawSettings {
            reserved: [0x46, 0x00, 0x12, 0x34],
            version: 42,
            flags: ConnectionFlags::from_bits_retain(0x40 | Flag::Proxy.bit()),
            proxy_address: b"proxy.corp:3128".to_vec(),
            bypass_list: b"*.local;10.*;<local>".to_vec(),
            script_address: b"http://wpad/wpad.dat".to_vec(),
            trailer,
        }
    }

    // ── Encoding ─────────────────────────────────────────────────────────────

    #[test]
    fn test_encode_fresh_settings_layout() {
        // Arrange
        let raw = RawSettings::new();

        // Act
        let bytes = encode_settings(&raw).expect("encode failed");

        // Assert
        assert_eq!(bytes.len(), MIN_ENCODED_SIZE);
        assert_eq!(&bytes[0..4], &[70, 0, 0, 0], "reserved");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0], "version");
        assert_eq!(&bytes[8..12], &[1, 0, 0, 0], "flags = Direct");
        assert_eq!(&bytes[12..24], &[0u8; 12], "three empty length prefixes");
        assert_eq!(&bytes[24..], &[0u8; TRAILER_SIZE]);
    }

    #[test]
    fn test_encode_writes_little_endian_length_prefix_then_bytes() {
        let mut raw = RawSettings::new();
        raw.proxy_address = b"10.0.0.1:8080".to_vec();

        let bytes = encode_settings(&raw).expect("encode failed");

        assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 4], &13i32.to_le_bytes());
        assert_eq!(&bytes[HEADER_SIZE + 4..HEADER_SIZE + 17], b"10.0.0.1:8080");
    }

    #[test]
    fn test_encoded_len_matches_encoding() {
        let raw = sample_settings();
        let bytes = encode_settings(&raw).expect("encode failed");
        assert_eq!(encoded_len(&raw), bytes.len());
    }

    // ── Round trips ──────────────────────────────────────────────────────────

    #[test]
    fn test_fresh_settings_round_trip() {
        let raw = RawSettings::new();
        let bytes = encode_settings(&raw).expect("encode failed");
        let decoded = decode_settings_exact(&bytes).expect("decode failed");
        assert_eq!(decoded, raw);
    }

    #[test]
    fn test_settings_with_unknown_regions_round_trip() {
        let raw = sample_settings();
        let bytes = encode_settings(&raw).expect("encode failed");
        let decoded = decode_settings_exact(&bytes).expect("decode failed");
        assert_eq!(decoded, raw);
        assert_eq!(decoded.flags.unknown_bits(), 0x40);
    }

    #[test]
    fn test_windows_blob_is_reproduced_byte_for_byte() {
        // Arrange
        let blob = windows_blob();

        // Act
        let decoded = decode_settings_exact(&blob).expect("decode failed");
        let encoded = encode_settings(&decoded).expect("encode failed");

        // Assert
        assert_eq!(decoded.version, 5);
        assert_eq!(decoded.flags, Flag::Direct | Flag::Proxy);
        assert_eq!(decoded.proxy_address, b"127.0.0.1:7890");
        assert_eq!(decoded.bypass_list, b"<local>");
        assert!(decoded.script_address.is_empty());
        assert_eq!(encoded, blob);
    }

    #[test]
    fn test_non_utf8_strings_round_trip_unchanged() {
        let mut raw = RawSettings::new();
        raw.proxy_address = vec![0xFF, 0xFE, b':', b'8', 0x00];
        raw.script_address = vec![0xC3, 0x28];

        let bytes = encode_settings(&raw).expect("encode failed");
        let decoded = decode_settings_exact(&bytes).expect("decode failed");

        assert_eq!(decoded, raw);
    }

    #[test]
    fn test_negative_version_round_trips() {
        let mut raw = RawSettings::new();
        raw.version = -1;

        let bytes = encode_settings(&raw).expect("encode failed");

        assert_eq!(&bytes[4..8], &[0xFF; 4]);
        assert_eq!(decode_settings_exact(&bytes).expect("decode failed"), raw);
    }

    // ── Truncation ───────────────────────────────────────────────────────────

    #[test]
    fn test_every_proper_prefix_is_rejected_as_truncated() {
        let bytes = encode_settings(&sample_settings()).expect("encode failed");

        for len in 0..bytes.len() {
            let result = decode_settings(&bytes[..len]);
            assert!(
                matches!(result, Err(CodecError::TruncatedInput { .. })),
                "prefix of {len} bytes should be truncated, got {result:?}"
            );
        }
    }

    #[test]
    fn test_length_prefix_longer_than_remaining_input() {
        // Arrange: header, then a proxy length of 10 with only 3 bytes behind it.
        let mut bytes = encode_settings(&RawSettings::new()).expect("encode failed");
        bytes.truncate(HEADER_SIZE);
        bytes.extend_from_slice(&10i32.to_le_bytes());
        bytes.extend_from_slice(b"abc");

        // Act
        let result = decode_settings(&bytes);

        // Assert
        assert_eq!(
            result,
            Err(CodecError::TruncatedInput {
                field: "proxy_address",
                declared: 10,
                available: 3,
            })
        );
    }

    #[test]
    fn test_negative_length_prefix_is_rejected() {
        let mut bytes = encode_settings(&RawSettings::new()).expect("encode failed");
        bytes[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&(-1i32).to_le_bytes());

        let result = decode_settings(&bytes);

        assert!(matches!(
            result,
            Err(CodecError::TruncatedInput {
                field: "proxy_address",
                declared: -1,
                ..
            })
        ));
    }

    #[test]
    fn test_huge_length_prefix_is_rejected_without_allocating() {
        let mut bytes = encode_settings(&RawSettings::new()).expect("encode failed");
        bytes[HEADER_SIZE + 4..HEADER_SIZE + 8].copy_from_slice(&i32::MAX.to_le_bytes());

        let result = decode_settings(&bytes);

        assert!(matches!(
            result,
            Err(CodecError::TruncatedInput {
                field: "bypass_list",
                declared,
                ..
            }) if declared == i64::from(i32::MAX)
        ));
    }

    #[test]
    fn test_missing_trailer_is_truncated() {
        let bytes = encode_settings(&RawSettings::new()).expect("encode failed");
        let short = &bytes[..bytes.len() - 1];

        let result = decode_settings(short);

        assert_eq!(
            result,
            Err(CodecError::TruncatedInput {
                field: "trailer",
                declared: TRAILER_SIZE as i64,
                available: TRAILER_SIZE - 1,
            })
        );
    }

    // ── Trailing bytes ───────────────────────────────────────────────────────

    #[test]
    fn test_lenient_decode_reports_consumed_length() {
        let mut bytes = encode_settings(&sample_settings()).expect("encode failed");
        let record_len = bytes.len();
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

        let (decoded, consumed) = decode_settings(&bytes).expect("decode failed");

        assert_eq!(consumed, record_len);
        assert_eq!(decoded, sample_settings());
    }

    #[test]
    fn test_exact_decode_rejects_trailing_bytes() {
        let mut bytes = encode_settings(&RawSettings::new()).expect("encode failed");
        bytes.extend_from_slice(&[0u8; 4]);

        let result = decode_settings_exact(&bytes);

        assert_eq!(result, Err(CodecError::TrailingBytes { count: 4 }));
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = CodecError::TruncatedInput {
            field: "script_address",
            declared: 10,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "truncated input reading script_address: declared 10 bytes, 3 available"
        );
    }
}
