//! winproxy: show or change the Windows per-user proxy settings.
//!
//! # Usage
//!
//! ```text
//! winproxy                                   print the current settings
//! winproxy on | off                          switch the explicit proxy
//! winproxy -p --proxy-address 10.0.0.1:8080  enable a proxy at that address
//! winproxy --bypass-list "*.local;<local>"   replace the bypass list
//! winproxy export backup.bin                 save the current blob to a file
//! winproxy import backup.bin                 restore a blob saved earlier
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable              | Description                                 |
//! |-----------------------|---------------------------------------------|
//! | `RUST_LOG`            | `tracing` filter, wins over the config file |
//! | `WINPROXY_CONFIG`     | Path of the TOML config file                |
//! | `WINPROXY_STORE_FILE` | Use a file instead of the registry          |
//!
//! Logs go to stderr; stdout only carries the rendered settings.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use winproxy::application::edit::SettingsEdit;
use winproxy::application::settings::Settings;
use winproxy::application::store::SettingsStore;
use winproxy::infrastructure::config::{self, AppConfig};
use winproxy::infrastructure::render::{render_json, render_table};
use winproxy::infrastructure::storage::{open_store, FileStore};
use winproxy_core::{decode_settings_exact, encode_settings};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Show or change the Windows per-user internet proxy settings.
///
/// Without options the current settings are printed.  Any change option
/// rewrites the stored settings and prints the result.
#[derive(Debug, Parser)]
#[command(name = "winproxy", version)]
struct Cli {
    /// Use a proxy server
    #[arg(
        short = 'p',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    use_proxy: Option<bool>,

    /// Use the automatic configuration script
    #[arg(
        short = 's',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    use_script: Option<bool>,

    /// Automatically detect settings
    #[arg(
        short = 'a',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    auto_detect: Option<bool>,

    /// Proxy address, e.g. 10.0.0.1:8080
    #[arg(long, value_name = "ADDRESS")]
    proxy_address: Option<String>,

    /// Automatic configuration script address
    #[arg(long, value_name = "ADDRESS")]
    script_address: Option<String>,

    /// Addresses that bypass the proxy, separated by semicolons
    #[arg(long, value_name = "ADDRESSES", value_delimiter = ';')]
    bypass_list: Option<Vec<String>>,

    /// Print the settings as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Config file [default: platform config directory]
    #[arg(long, value_name = "PATH", env = "WINPROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Read and write the settings blob in this file instead of the
    /// configured store
    #[arg(long, value_name = "PATH", env = "WINPROXY_STORE_FILE")]
    store_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Enable the proxy server
    On,
    /// Disable the proxy server
    Off,
    /// Save the current settings blob to a file
    Export {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Replace the current settings with a blob saved by `export`
    Import {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

impl Cli {
    /// Collects the requested changes.  `on` / `off` take precedence over
    /// `--use-proxy`.
    fn edit(&self) -> SettingsEdit {
        let use_proxy = match self.command {
            Some(Command::On) => Some(true),
            Some(Command::Off) => Some(false),
            _ => self.use_proxy,
        };
        SettingsEdit {
            use_proxy,
            use_script: self.use_script,
            auto_detect: self.auto_detect,
            proxy_address: self.proxy_address.clone(),
            script_address: self.script_address.clone(),
            bypass_list: self.bypass_list.clone(),
        }
    }

    fn load_config(&self) -> anyhow::Result<AppConfig> {
        match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => config::load_config().context("failed to load config"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging comes up before the config is checked, so a broken config file
    // is still reported through tracing.
    let config = cli.load_config();
    let level = config
        .as_ref()
        .map(|c| c.logging.level.as_str())
        .unwrap_or("warn");
    init_logging(level);

    match config.and_then(|config| run(&cli, &config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialises `tracing` on stderr.  `RUST_LOG` wins over `level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(&config.storage, cli.store_file.clone())
        .context("failed to open settings store")?;

    match &cli.command {
        Some(Command::Export { path }) => export(&store, path),
        Some(Command::Import { path }) => {
            let settings = import(&store, path)?;
            print_settings(&settings, cli.json)
        }
        _ => {
            let settings = edit(&store, &cli.edit())?;
            print_settings(&settings, cli.json)
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Reads the settings and, if `changes` has any, applies them.
fn edit<S: SettingsStore + ?Sized>(store: &S, changes: &SettingsEdit) -> anyhow::Result<Settings> {
    let mut settings = Settings::read_or_default(store)
        .with_context(|| format!("failed to read proxy settings from {}", store.location()))?;

    if changes.has_changes() {
        changes.apply_to(&mut settings);
        settings
            .apply(store)
            .with_context(|| format!("failed to write proxy settings to {}", store.location()))?;
    }
    Ok(settings)
}

/// Writes the current settings, re-encoded, to `path`.
fn export<S: SettingsStore + ?Sized>(store: &S, path: &Path) -> anyhow::Result<()> {
    let settings = Settings::read(store)
        .with_context(|| format!("failed to read proxy settings from {}", store.location()))?;
    let bytes = encode_settings(settings.raw()).context("failed to encode proxy settings")?;

    let target = FileStore::new(path);
    target
        .set_raw(&bytes)
        .with_context(|| format!("failed to export proxy settings to {}", path.display()))?;

    info!(path = %path.display(), len = bytes.len(), "exported proxy settings");
    Ok(())
}

/// Replaces the stored settings with the blob in `path`.
///
/// The blob must decode exactly.  Its version is moved past the current one
/// so the counter never goes backwards.
fn import<S: SettingsStore + ?Sized>(store: &S, path: &Path) -> anyhow::Result<Settings> {
    let bytes = FileStore::new(path)
        .get_raw()
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut raw = decode_settings_exact(&bytes)
        .with_context(|| format!("{} does not hold valid proxy settings", path.display()))?;

    let current = Settings::read_or_default(store)
        .with_context(|| format!("failed to read proxy settings from {}", store.location()))?;
    raw.version = raw.version.max(current.version());

    let mut settings = Settings::from_raw(raw);
    settings
        .apply(store)
        .with_context(|| format!("failed to write proxy settings to {}", store.location()))?;

    info!(path = %path.display(), version = settings.version(), "imported proxy settings");
    Ok(settings)
}

fn print_settings(settings: &Settings, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", render_json(settings).context("failed to render settings as JSON")?);
    } else {
        println!("{}", render_table(settings));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use winproxy::infrastructure::storage::MemoryStore;
    use winproxy_core::{decode_settings, RawSettings};

    #[test]
    fn test_no_arguments_means_no_changes() {
        let cli = Cli::parse_from(["winproxy"]);

        assert!(!cli.edit().has_changes());
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_bare_short_flag_means_true() {
        let cli = Cli::parse_from(["winproxy", "-p"]);
        assert_eq!(cli.use_proxy, Some(true));
    }

    #[test]
    fn test_flag_with_explicit_value() {
        let cli = Cli::parse_from(["winproxy", "--use-script=false", "--auto-detect=true"]);

        assert_eq!(cli.use_script, Some(false));
        assert_eq!(cli.auto_detect, Some(true));
        assert_eq!(cli.use_proxy, None);
    }

    #[test]
    fn test_bypass_list_is_split_on_semicolons() {
        let cli = Cli::parse_from(["winproxy", "--bypass-list", "*.local;<local>"]);

        assert_eq!(
            cli.bypass_list,
            Some(vec!["*.local".to_string(), "<local>".to_string()])
        );
    }

    #[test]
    fn test_on_and_off_set_use_proxy() {
        assert_eq!(Cli::parse_from(["winproxy", "on"]).edit().use_proxy, Some(true));
        assert_eq!(Cli::parse_from(["winproxy", "off"]).edit().use_proxy, Some(false));
    }

    #[test]
    fn test_off_overrides_use_proxy_flag() {
        let cli = Cli::parse_from(["winproxy", "-p", "off"]);
        assert_eq!(cli.edit().use_proxy, Some(false));
    }

    #[test]
    fn test_export_and_import_take_a_path() {
        let cli = Cli::parse_from(["winproxy", "export", "backup.bin"]);
        assert_eq!(
            cli.command,
            Some(Command::Export {
                path: PathBuf::from("backup.bin")
            })
        );
    }

    #[test]
    fn test_edit_without_changes_does_not_write() {
        let store = MemoryStore::new();

        let settings = edit(&store, &SettingsEdit::default()).expect("edit");

        assert_eq!(settings, Settings::new());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_edit_with_changes_writes_once() {
        // Arrange
        let store = MemoryStore::new();
        let changes = SettingsEdit {
            proxy_address: Some("10.0.0.1:8080".to_string()),
            ..SettingsEdit::toggle_proxy(true)
        };

        // Act
        let settings = edit(&store, &changes).expect("edit");

        // Assert
        assert_eq!(store.write_count(), 1);
        assert_eq!(settings.version(), 1);
        let (raw, _) = decode_settings(&store.value().expect("stored")).expect("decode");
        assert_eq!(raw.proxy_address, b"10.0.0.1:8080".to_vec());
    }

    #[test]
    fn test_export_then_import_restores_settings() {
        // Arrange: a store with a proxy configured, exported to a file.
        let dir = tempfile::tempdir().expect("tempdir");
        let backup = dir.path().join("backup.bin");
        let store = MemoryStore::new();
        edit(
            &store,
            &SettingsEdit {
                proxy_address: Some("proxy:3128".to_string()),
                ..SettingsEdit::toggle_proxy(true)
            },
        )
        .expect("edit");
        export(&store, &backup).expect("export");

        // Act: switch the proxy off, then import the backup.
        edit(&store, &SettingsEdit::toggle_proxy(false)).expect("edit");
        let restored = import(&store, &backup).expect("import");

        // Assert
        assert!(restored.use_proxy());
        assert_eq!(restored.proxy_address(), "proxy:3128");
        assert_eq!(restored.version(), 3, "version keeps moving forward");
    }

    #[test]
    fn test_export_without_settings_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryStore::new();

        let result = export(&store, &dir.path().join("backup.bin"));

        assert!(result.is_err());
    }

    #[test]
    fn test_import_rejects_trailing_bytes() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let backup = dir.path().join("backup.bin");
        let mut bytes = encode_settings(&RawSettings::new()).expect("encode");
        bytes.push(0xFF);
        std::fs::write(&backup, &bytes).expect("write");
        let store = MemoryStore::new();

        // Act
        let result = import(&store, &backup);

        // Assert
        assert!(result.is_err());
        assert_eq!(store.write_count(), 0);
    }
}
