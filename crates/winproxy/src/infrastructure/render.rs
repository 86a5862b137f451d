//! Human- and machine-readable renderings of a [`Settings`] facade.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::application::settings::Settings;

// ── Table ─────────────────────────────────────────────────────────────────────

fn check_cell(enabled: bool) -> Cell {
    if enabled {
        Cell::new("[x]").fg(Color::White)
    } else {
        Cell::new("[ ]").fg(Color::DarkGrey)
    }
}

fn title_cell(title: &str) -> Cell {
    Cell::new(title).fg(Color::Green)
}

/// Renders the six user-facing settings as a two-column table.
///
/// The bypass list is shown one entry per line.
pub fn render_table(settings: &Settings) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .add_row(vec![title_cell("Proxy"), check_cell(settings.use_proxy())])
        .add_row(vec![title_cell("Script"), check_cell(settings.use_script())])
        .add_row(vec![
            title_cell("Auto-detect"),
            check_cell(settings.auto_detect()),
        ])
        .add_row(vec![
            title_cell("Proxy Address"),
            Cell::new(settings.proxy_address()).fg(Color::Blue),
        ])
        .add_row(vec![
            title_cell("Script Address"),
            Cell::new(settings.script_address()).fg(Color::Blue),
        ])
        .add_row(vec![
            title_cell("Bypass List"),
            Cell::new(settings.bypass_list().join("\n")),
        ]);

    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Left);
    }
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Center);
    }

    table.to_string()
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Serializable snapshot of a facade, for `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsView {
    pub version: i32,
    /// Raw flag bits, unknown bits included.
    pub flags: i32,
    pub direct: bool,
    pub use_proxy: bool,
    pub use_script: bool,
    pub auto_detect: bool,
    pub proxy_address: String,
    pub script_address: String,
    pub bypass_list: Vec<String>,
}

impl From<&Settings> for SettingsView {
    fn from(settings: &Settings) -> Self {
        Self {
            version: settings.version(),
            flags: settings.flags().bits(),
            direct: settings.direct(),
            use_proxy: settings.use_proxy(),
            use_script: settings.use_script(),
            auto_detect: settings.auto_detect(),
            proxy_address: settings.proxy_address(),
            script_address: settings.script_address(),
            bypass_list: settings.bypass_list(),
        }
    }
}

/// Renders `settings` as pretty-printed JSON.
///
/// # Errors
///
/// Propagates `serde_json` serialization errors.
pub fn render_json(settings: &Settings) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SettingsView::from(settings))
}
