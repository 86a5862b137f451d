//! Application layer for winproxy.
//!
//! Everything here is independent of where the settings are stored:
//!
//! - **`store`**    – the [`store::SettingsStore`] trait the facade reads from
//!   and writes to.  Implementations live in `infrastructure::storage`.
//!
//! - **`settings`** – the [`settings::Settings`] facade: typed accessors over
//!   the decoded record and the read / apply protocol.
//!
//! - **`edit`**     – [`edit::SettingsEdit`], the set of changes requested on
//!   the command line.

pub mod edit;
pub mod settings;
pub mod store;
