//! Infrastructure layer for winproxy.
//!
//! Contains the OS-facing adapters: settings stores (registry, file, memory),
//! the TOML configuration file, and the table / JSON renderers.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `winproxy_core`, but MUST NOT be imported by the `application` layer.

pub mod config;
pub mod render;
pub mod storage;
