//! The proxy bypass list.
//!
//! On the wire the list is one string, e.g. `"*.corp.example; 10.*;<local>"`.
//! Entries are separated by `;` and surrounding whitespace is not significant.
//!
//! Empty entries are kept: `"a;;b"` is three entries.  The only special case
//! is the empty string, which is the empty list rather than one empty entry.
//! A list holding a single empty entry therefore joins to `""` and reads back
//! as the empty list.

/// Separator between bypass entries.
pub const SEPARATOR: char = ';';

/// Splits a stored bypass string into trimmed entries.
///
/// # Examples
///
/// ```rust
/// use winproxy_core::domain::bypass::split;
///
/// assert_eq!(split("localhost; 127.*"), vec!["localhost", "127.*"]);
/// assert!(split("").is_empty());
/// ```
pub fn split(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(SEPARATOR)
        .map(|entry| entry.trim().to_string())
        .collect()
}

/// Trims every entry and joins them with `;`.
///
/// # Examples
///
/// ```rust
/// use winproxy_core::domain::bypass::join;
///
/// assert_eq!(join(&[" localhost ", "127.*"]), "localhost;127.*");
/// ```
pub fn join<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(|entry| entry.as_ref().trim())
        .collect::<Vec<_>>()
        .join(";")
}

/// Trims every entry of a stored bypass list.
///
/// This is what gets written back on apply, and it matches what [`split`]
/// shows: valid UTF-8 is trimmed of all Unicode whitespace.  A list that is
/// not valid UTF-8 is trimmed of ASCII whitespace byte by byte, so it is not
/// mangled by a lossy conversion.
pub fn normalize(raw: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(raw) {
        Ok(text) => join(&split(text)).into_bytes(),
        Err(_) => normalize_bytes(raw),
    }
}

fn normalize_bytes(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    for (i, entry) in raw.split(|&b| b == b';').enumerate() {
        if i > 0 {
            out.push(b';');
        }
        out.extend_from_slice(entry.trim_ascii());
    }
    out
}
