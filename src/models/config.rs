use serde::Deserialize;

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_latest_items() -> usize {
    3
}

fn default_search_preview_limit() -> usize {
    5
}

/// Settings of the catalog web server.
///
/// Loaded from `config/default.yaml`, then `config/{APP_ENV}.yaml`, then
/// `APP_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    pub assets_dir: String,
    /// Cookie signing key, at least 64 bytes.
    pub secret: String,
    /// Password that unlocks the admin panel.
    pub admin_password: String,
    /// Delay between the last keystroke and the live search request.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Items of each kind shown on the home page.
    #[serde(default = "default_latest_items")]
    pub latest_items: usize,
    /// Search rows shown before "and N more".
    #[serde(default = "default_search_preview_limit")]
    pub search_preview_limit: usize,
}
