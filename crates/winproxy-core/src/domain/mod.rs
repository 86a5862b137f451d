//! Domain helpers for winproxy.
//!
//! Pure logic with no knowledge of the byte layout or of where the settings
//! are stored.

/// Splitting and joining of the `;`-delimited bypass list.
pub mod bypass;
