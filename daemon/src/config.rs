use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::error;

use crate::event::DashboardEvent;

pub const DEFAULT_CATALOG_URL: &str = "https://discord.com/api/applications/detectable";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_INSTALL_MS: u64 = 1000;
pub const DEFAULT_RUN_MS: u64 = 800;
pub const DEFAULT_STOP_MS: u64 = 500;
pub const DEFAULT_RPC_CONNECT_MS: u64 = 1500;
pub const DEFAULT_RPC_DISCONNECT_MS: u64 = 500;
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 3000;

pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 10;

/// Root configuration structure. Deserialized from `<app data dir>/config.toml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Where the detectable-games catalog is fetched from.
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Endpoint returning a JSON array of game records.
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// Whole-request timeout; on expiry the sample catalog is used instead.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

/// Simulated transition delays and toast lifetime, in milliseconds.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "default_install_ms")]
    pub install_ms: u64,
    #[serde(default = "default_run_ms")]
    pub run_ms: u64,
    #[serde(default = "default_stop_ms")]
    pub stop_ms: u64,
    #[serde(default = "default_rpc_connect_ms")]
    pub rpc_connect_ms: u64,
    #[serde(default = "default_rpc_disconnect_ms")]
    pub rpc_disconnect_ms: u64,
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            install_ms: DEFAULT_INSTALL_MS,
            run_ms: DEFAULT_RUN_MS,
            stop_ms: DEFAULT_STOP_MS,
            rpc_connect_ms: DEFAULT_RPC_CONNECT_MS,
            rpc_disconnect_ms: DEFAULT_RPC_DISCONNECT_MS,
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL_MS,
        }
    }
}

impl TimingConfig {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Upper bound on results returned for one query, clamped to `1..=10`.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_SEARCH_RESULTS,
        }
    }
}

impl SearchConfig {
    pub fn effective_max_results(&self) -> usize {
        self.max_results.clamp(1, DEFAULT_MAX_SEARCH_RESULTS)
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the file does not exist.
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Spawns a file watcher on the parent directory of `path`. Whenever the config
/// file is created or modified, reloads it and sends a `ConfigReloaded` event.
pub async fn watch_config(path: PathBuf, tx: mpsc::Sender<DashboardEvent>) {
    let (watch_tx, mut watch_rx) = mpsc::channel::<notify::Event>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                let _ = watch_tx.blocking_send(event);
            }
        },
        NotifyConfig::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("[config] Failed to create file watcher: {e}");
            return;
        }
    };

    // Editors save atomically (write-new + rename), so watch the directory.
    let watch_dir = match path.parent() {
        Some(d) => d.to_path_buf(),
        None => {
            error!("[config] Config path has no parent directory");
            return;
        }
    };

    if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
        error!("[config] Failed to watch config directory: {e}");
        return;
    }

    while let Some(event) = watch_rx.recv().await {
        let affects_config = event.paths.iter().any(|p| p == path.as_path());
        let is_write = matches!(
            event.kind,
            notify::EventKind::Create(_) | notify::EventKind::Modify(_)
        );

        if affects_config && is_write {
            match load_or_default(&path) {
                Ok(config) => {
                    if tx.send(DashboardEvent::ConfigReloaded(config)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("[config] Failed to reload config: {e:#}"),
            }
        }
    }
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_install_ms() -> u64 {
    DEFAULT_INSTALL_MS
}

fn default_run_ms() -> u64 {
    DEFAULT_RUN_MS
}

fn default_stop_ms() -> u64 {
    DEFAULT_STOP_MS
}

fn default_rpc_connect_ms() -> u64 {
    DEFAULT_RPC_CONNECT_MS
}

fn default_rpc_disconnect_ms() -> u64 {
    DEFAULT_RPC_DISCONNECT_MS
}

fn default_notification_ttl_ms() -> u64 {
    DEFAULT_NOTIFICATION_TTL_MS
}

fn default_max_results() -> usize {
    DEFAULT_MAX_SEARCH_RESULTS
}
