/// Canonical file paths for the simulator's data files.
///
/// Both files live in the app data directory:
///   - config.toml  Optional; read at startup and watched for changes.
///   - status.toml  Written by the daemon after every state change.
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "quest-sim";
/// Overrides the platform default data directory when set.
pub const HOME_ENV_VAR: &str = "QUEST_SIM_HOME";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const STATUS_FILE_NAME: &str = "status.toml";

/// Returns the app data directory.
///
/// `$QUEST_SIM_HOME` if set, otherwise `%APPDATA%\quest-sim` on Windows and
/// `$HOME/.config/quest-sim` elsewhere, falling back to `./quest-sim`.
pub fn app_data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV_VAR) {
        return PathBuf::from(home);
    }
    let base = if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        std::env::var_os("HOME").map(|h| Path::new(&h).join(".config"))
    };
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME)
}

pub fn config_file_path() -> PathBuf {
    app_data_dir().join(CONFIG_FILE_NAME)
}

pub fn status_file_path() -> PathBuf {
    app_data_dir().join(STATUS_FILE_NAME)
}
