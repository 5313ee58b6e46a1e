/// In-memory game list: the selected games, the current selection, and the
/// single simulated RPC session.
///
/// Everything here is synchronous and free of I/O. Delays and notifications
/// live one level up in [`crate::dashboard`]; this module only guards the
/// list invariants and applies already-decided changes.
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::GameRecord;

/// Reasons a dashboard request is rejected before anything is scheduled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("No catalog entry with id {0}")]
    UnknownCatalogEntry(String),
    #[error("No game with uid {0} in your list")]
    UnknownGame(String),
    #[error("{executable} is not an executable of {game}")]
    UnknownExecutable { game: String, executable: String },
    #[error("Install {0} before running it")]
    NotInstalled(String),
    #[error("Stop the game before removing")]
    GameRunning(String),
}

/// Display status derived from the install/run flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ready,
    Installed,
    Running,
}

impl GameStatus {
    pub fn label(self) -> &'static str {
        match self {
            GameStatus::Ready => "ready",
            GameStatus::Installed => "installed",
            GameStatus::Running => "running",
        }
    }
}

/// A catalog entry the user added to their list, plus its simulated state.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedGame {
    record: GameRecord,
    uid: String,
    is_installed: bool,
    is_running: bool,
    installed_executables: BTreeSet<String>,
    running_executable: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

impl SelectedGame {
    pub fn new(record: GameRecord, uid: String) -> Self {
        Self {
            record,
            uid,
            is_installed: false,
            is_running: false,
            installed_executables: BTreeSet::new(),
            running_executable: None,
            started_at: None,
        }
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn is_installed(&self) -> bool {
        self.is_installed
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn installed_executables(&self) -> &BTreeSet<String> {
        &self.installed_executables
    }

    pub fn has_installed(&self, executable: &str) -> bool {
        self.installed_executables.contains(executable)
    }

    pub fn running_executable(&self) -> Option<&str> {
        self.running_executable.as_deref()
    }

    /// When the current run completed its start transition.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn status(&self) -> GameStatus {
        if self.is_running {
            GameStatus::Running
        } else if self.is_installed {
            GameStatus::Installed
        } else {
            GameStatus::Ready
        }
    }
}

/// The one simulated Rich Presence connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcSession {
    pub game_id: String,
    pub game_name: String,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added { uid: String },
    AlreadyPresent,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    games: Vec<SelectedGame>,
    selected: Option<String>,
    rpc: Option<RpcSession>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn games(&self) -> &[SelectedGame] {
        &self.games
    }

    pub fn game(&self, uid: &str) -> Option<&SelectedGame> {
        self.games.iter().find(|g| g.uid == uid)
    }

    fn game_mut(&mut self, uid: &str) -> Option<&mut SelectedGame> {
        self.games.iter_mut().find(|g| g.uid == uid)
    }

    pub fn contains_catalog_id(&self, id: &str) -> bool {
        self.games.iter().any(|g| g.record.id == id)
    }

    pub fn selected_uid(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_game(&self) -> Option<&SelectedGame> {
        self.selected.as_deref().and_then(|uid| self.game(uid))
    }

    pub fn rpc_session(&self) -> Option<&RpcSession> {
        self.rpc.as_ref()
    }

    pub fn is_rpc_connected(&self) -> bool {
        self.rpc.is_some()
    }

    pub fn running_games(&self) -> impl Iterator<Item = &SelectedGame> {
        self.games.iter().filter(|g| g.is_running)
    }

    /// Appends `record` unless an entry with the same catalog id is already
    /// listed. `uid` must not collide with an existing entry.
    pub fn add(&mut self, record: &GameRecord, uid: String) -> AddOutcome {
        if self.contains_catalog_id(&record.id) {
            return AddOutcome::AlreadyPresent;
        }
        debug_assert!(self.game(&uid).is_none(), "uid collision: {uid}");
        self.games.push(SelectedGame::new(record.clone(), uid.clone()));
        AddOutcome::Added { uid }
    }

    /// Removes a non-running game, clearing the selection if it pointed at it.
    pub fn remove(&mut self, uid: &str) -> Result<SelectedGame, DashboardError> {
        let index = self
            .games
            .iter()
            .position(|g| g.uid == uid)
            .ok_or_else(|| DashboardError::UnknownGame(uid.to_string()))?;
        if self.games[index].is_running {
            return Err(DashboardError::GameRunning(uid.to_string()));
        }
        if self.selected.as_deref() == Some(uid) {
            self.selected = None;
        }
        Ok(self.games.remove(index))
    }

    pub fn select(&mut self, uid: &str) -> Result<(), DashboardError> {
        if self.game(uid).is_none() {
            return Err(DashboardError::UnknownGame(uid.to_string()));
        }
        self.selected = Some(uid.to_string());
        Ok(())
    }

    /// Checks that `executable` belongs to the listed game `uid`.
    pub fn check_executable(&self, uid: &str, executable: &str) -> Result<&SelectedGame, DashboardError> {
        let game = self
            .game(uid)
            .ok_or_else(|| DashboardError::UnknownGame(uid.to_string()))?;
        if game.record.executable(executable).is_none() {
            return Err(DashboardError::UnknownExecutable {
                game: game.record.name.clone(),
                executable: executable.to_string(),
            });
        }
        Ok(game)
    }

    /// Records a completed install. `None` if the game is no longer listed.
    pub fn mark_installed(&mut self, uid: &str, executable: &str) -> Option<&SelectedGame> {
        let game = self.game_mut(uid)?;
        game.installed_executables.insert(executable.to_string());
        game.is_installed = true;
        Some(game)
    }

    /// Records a completed start. `None` if the game is no longer listed.
    pub fn mark_running(
        &mut self,
        uid: &str,
        executable: &str,
        at: DateTime<Utc>,
    ) -> Option<&SelectedGame> {
        let game = self.game_mut(uid)?;
        game.is_running = true;
        game.running_executable = Some(executable.to_string());
        game.started_at = Some(at);
        Some(game)
    }

    /// Records a completed stop. `None` if the game is no longer listed.
    pub fn mark_stopped(&mut self, uid: &str) -> Option<&SelectedGame> {
        let game = self.game_mut(uid)?;
        game.is_running = false;
        game.running_executable = None;
        game.started_at = None;
        Some(game)
    }

    /// Installs `session` as the only RPC session, returning the one it replaced.
    pub fn connect_rpc(&mut self, session: RpcSession) -> Option<RpcSession> {
        self.rpc.replace(session)
    }

    pub fn disconnect_rpc(&mut self) -> Option<RpcSession> {
        self.rpc.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_games;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn state_with(n: usize) -> (DashboardState, Vec<String>) {
        let mut state = DashboardState::new();
        let uids = sample_games()
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, record)| {
                let uid = format!("uid-{i}");
                assert_eq!(
                    state.add(record, uid.clone()),
                    AddOutcome::Added { uid: uid.clone() }
                );
                uid
            })
            .collect();
        (state, uids)
    }

    // ── add ───────────────────────────────────────────────────────────────────

    #[test]
    fn new_game_starts_ready() {
        let (state, uids) = state_with(1);
        let game = state.game(&uids[0]).unwrap();
        assert_eq!(game.status(), GameStatus::Ready);
        assert!(!game.is_installed());
        assert!(!game.is_running());
        assert!(game.installed_executables().is_empty());
        assert!(game.running_executable().is_none());
    }

    #[test]
    fn add_same_catalog_id_twice_is_noop() {
        let (mut state, _) = state_with(1);
        let record = &sample_games()[0];
        assert_eq!(state.add(record, "other".into()), AddOutcome::AlreadyPresent);
        assert_eq!(state.games().len(), 1);
    }

    // ── remove / select ───────────────────────────────────────────────────────

    #[test]
    fn remove_running_game_is_rejected() {
        let (mut state, uids) = state_with(1);
        state.mark_installed(&uids[0], "VALORANT.exe");
        state.mark_running(&uids[0], "VALORANT.exe", at(0));
        assert_eq!(
            state.remove(&uids[0]),
            Err(DashboardError::GameRunning(uids[0].clone()))
        );
        assert_eq!(state.games().len(), 1);
    }

    #[test]
    fn remove_selected_game_clears_selection() {
        let (mut state, uids) = state_with(2);
        state.select(&uids[1]).unwrap();
        let removed = state.remove(&uids[1]).unwrap();
        assert_eq!(removed.uid(), uids[1]);
        assert!(state.selected_uid().is_none());
        assert_eq!(state.games().len(), 1);
    }

    #[test]
    fn remove_other_game_keeps_selection() {
        let (mut state, uids) = state_with(2);
        state.select(&uids[0]).unwrap();
        state.remove(&uids[1]).unwrap();
        assert_eq!(state.selected_uid(), Some(uids[0].as_str()));
    }

    #[test]
    fn remove_unknown_uid_is_error() {
        let (mut state, _) = state_with(1);
        assert_eq!(
            state.remove("nope"),
            Err(DashboardError::UnknownGame("nope".into()))
        );
    }

    #[test]
    fn select_unknown_uid_is_error() {
        let (mut state, _) = state_with(1);
        assert!(state.select("nope").is_err());
        assert!(state.selected_game().is_none());
    }

    // ── transitions ───────────────────────────────────────────────────────────

    #[test]
    fn ready_installed_running_installed() {
        let (mut state, uids) = state_with(1);
        let uid = &uids[0];

        state.mark_installed(uid, "VALORANT.exe").unwrap();
        assert_eq!(state.game(uid).unwrap().status(), GameStatus::Installed);

        let game = state.mark_running(uid, "VALORANT.exe", at(5)).unwrap();
        assert_eq!(game.status(), GameStatus::Running);
        assert_eq!(game.running_executable(), Some("VALORANT.exe"));
        assert_eq!(game.started_at(), Some(at(5)));

        let game = state.mark_stopped(uid).unwrap();
        assert_eq!(game.status(), GameStatus::Installed);
        assert!(game.running_executable().is_none());
        assert!(game.started_at().is_none());
    }

    #[test]
    fn installing_twice_keeps_one_entry() {
        let (mut state, uids) = state_with(1);
        state.mark_installed(&uids[0], "VALORANT.exe");
        state.mark_installed(&uids[0], "VALORANT.exe");
        assert_eq!(state.game(&uids[0]).unwrap().installed_executables().len(), 1);
    }

    #[test]
    fn marks_on_removed_game_return_none() {
        let (mut state, uids) = state_with(1);
        state.remove(&uids[0]).unwrap();
        assert!(state.mark_installed(&uids[0], "VALORANT.exe").is_none());
        assert!(state.mark_running(&uids[0], "VALORANT.exe", at(0)).is_none());
        assert!(state.mark_stopped(&uids[0]).is_none());
    }

    #[test]
    fn check_executable_rejects_foreign_names() {
        let (state, uids) = state_with(1);
        assert!(state.check_executable(&uids[0], "VALORANT.exe").is_ok());
        assert!(matches!(
            state.check_executable(&uids[0], "r5apex.exe"),
            Err(DashboardError::UnknownExecutable { .. })
        ));
    }

    // ── rpc ───────────────────────────────────────────────────────────────────

    #[test]
    fn connect_replaces_existing_session() {
        let mut state = DashboardState::new();
        let first = RpcSession {
            game_id: "1".into(),
            game_name: "One".into(),
            connected_at: at(0),
        };
        let second = RpcSession {
            game_id: "2".into(),
            game_name: "Two".into(),
            connected_at: at(1),
        };
        assert!(state.connect_rpc(first.clone()).is_none());
        assert_eq!(state.connect_rpc(second.clone()), Some(first));
        assert_eq!(state.rpc_session(), Some(&second));
        assert_eq!(state.disconnect_rpc(), Some(second));
        assert!(!state.is_rpc_connected());
    }
}
