use serde::{Deserialize, Serialize};

use crate::state::DashboardState;

/// Progress credited per running game, in percent.
pub const PROGRESS_PER_SESSION: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Online,
    Offline,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Online => "ONLINE",
            ConnectionState::Offline => "OFFLINE",
        }
    }
}

/// Header counters shown above the game list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    /// Games in the user's list (not the catalog size).
    pub total_games: usize,
    /// Games currently running.
    pub active_sessions: usize,
    /// `min(100, active_sessions * 25)`.
    pub quest_progress: u8,
    pub connection: ConnectionState,
}

impl DashboardStats {
    pub fn from_state(state: &DashboardState) -> Self {
        let active_sessions = state.running_games().count();
        let quest_progress = (active_sessions * PROGRESS_PER_SESSION).min(100) as u8;
        let connection = if state.is_rpc_connected() {
            ConnectionState::Online
        } else {
            ConnectionState::Offline
        };
        Self {
            total_games: state.games().len(),
            active_sessions,
            quest_progress,
            connection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_games;
    use crate::state::{AddOutcome, RpcSession};
    use chrono::Utc;

    fn running(n: usize) -> DashboardState {
        let mut state = DashboardState::new();
        for (i, record) in sample_games().iter().enumerate() {
            let uid = format!("u{i}");
            assert!(matches!(state.add(record, uid.clone()), AddOutcome::Added { .. }));
            if i < n {
                let exe = record.executables[0].name.clone();
                state.mark_installed(&uid, &exe);
                state.mark_running(&uid, &exe, Utc::now());
            }
        }
        state
    }

    #[test]
    fn empty_state_is_offline_and_zero() {
        let stats = DashboardStats::from_state(&DashboardState::new());
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.active_sessions, 0);
        assert_eq!(stats.quest_progress, 0);
        assert_eq!(stats.connection, ConnectionState::Offline);
    }

    #[test]
    fn progress_is_25_per_running_game() {
        let stats = DashboardStats::from_state(&running(2));
        assert_eq!(stats.total_games, 5);
        assert_eq!(stats.active_sessions, 2);
        assert_eq!(stats.quest_progress, 50);
    }

    #[test]
    fn progress_caps_at_100() {
        let stats = DashboardStats::from_state(&running(5));
        assert_eq!(stats.active_sessions, 5);
        assert_eq!(stats.quest_progress, 100);
    }

    #[test]
    fn rpc_session_means_online() {
        let mut state = DashboardState::new();
        state.connect_rpc(RpcSession {
            game_id: "1".into(),
            game_name: "G".into(),
            connected_at: Utc::now(),
        });
        let stats = DashboardStats::from_state(&state);
        assert_eq!(stats.connection, ConnectionState::Online);
        assert_eq!(stats.connection.label(), "ONLINE");
    }
}
