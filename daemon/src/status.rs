use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::error;

use crate::catalog::CatalogSource;
use crate::state::DashboardState;
use crate::stats::{ConnectionState, DashboardStats};

/// A running game as listed in the status file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RunningEntry {
    pub name: String,
    pub executable: String,
    /// RFC 3339 timestamp of when the run transition completed.
    pub started_at: String,
}

/// Dashboard status written to `<app data dir>/status.toml` after every
/// state change, for companion tools to read.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DashboardStatus {
    /// Daemon binary version (set from Cargo.toml at compile time).
    pub version: String,
    pub catalog_source: CatalogSource,
    pub total_games: usize,
    pub active_sessions: usize,
    pub quest_progress: u8,
    pub connection: ConnectionState,
    /// Name of the game the RPC session was opened for, if connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_game: Option<String>,
    /// RFC 3339 timestamp of the RPC connection, if connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_connected_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub running: Vec<RunningEntry>,
}

impl DashboardStatus {
    pub fn from_state(state: &DashboardState, catalog_source: CatalogSource) -> Self {
        let stats = DashboardStats::from_state(state);
        let session = state.rpc_session();
        let running = state
            .running_games()
            .filter_map(|g| {
                Some(RunningEntry {
                    name: g.name().to_string(),
                    executable: g.running_executable()?.to_string(),
                    started_at: g.started_at()?.to_rfc3339(),
                })
            })
            .collect();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            catalog_source,
            total_games: stats.total_games,
            active_sessions: stats.active_sessions,
            quest_progress: stats.quest_progress,
            connection: stats.connection,
            rpc_game: session.map(|s| s.game_name.clone()),
            rpc_connected_at: session.map(|s| s.connected_at.to_rfc3339()),
            running,
        }
    }
}

/// Serializes `status` to TOML and writes it to `path`.
/// Creates the parent directory if it does not exist.
/// Failures are logged and swallowed; the event loop keeps running.
pub fn write_status(path: &Path, status: &DashboardStatus) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            error!("[status] Failed to create directory {}: {e}", parent.display());
            return;
        }
    }
    match toml::to_string_pretty(status) {
        Ok(content) => {
            if let Err(e) = std::fs::write(path, content) {
                error!("[status] Failed to write status file: {e}");
            }
        }
        Err(e) => error!("[status] Failed to serialize status: {e}"),
    }
}
