/// Turns dashboard views into display text.
use std::fmt::Write;

use crate::notifier::Notification;
use crate::stats::DashboardStats;
use crate::view::{ActionPanelView, GameCardView, SearchPanel};

pub trait Renderer {
    fn search_panel(&self, panel: &SearchPanel<'_>) -> String;
    fn game_list(&self, cards: &[GameCardView<'_>]) -> String;
    fn action_panel(&self, panel: &ActionPanelView<'_>) -> String;
    fn stats(&self, stats: &DashboardStats) -> String;
    fn toasts(&self, toasts: &[&Notification]) -> String;
}

/// Plain-text renderer for terminals.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn search_panel(&self, panel: &SearchPanel<'_>) -> String {
        match panel {
            SearchPanel::Hidden => String::new(),
            SearchPanel::NoResults => "  No games found\n".to_string(),
            SearchPanel::Results(results) => {
                let mut out = String::new();
                for game in results {
                    let _ = writeln!(out, "  {} ✓  (add {})", game.name, game.id);
                }
                out
            }
        }
    }

    fn game_list(&self, cards: &[GameCardView<'_>]) -> String {
        if cards.is_empty() {
            return "No games selected yet\n  Search and add verified games to get started\n"
                .to_string();
        }
        let mut out = String::new();
        for card in cards {
            let marker = if card.selected { '>' } else { ' ' };
            let _ = write!(
                out,
                "{marker} {} ✓ [{}] {}",
                card.name,
                card.status.label(),
                card.uid
            );
            if card.removable {
                out.push_str("  (remove)");
            }
            out.push('\n');
        }
        out
    }

    fn action_panel(&self, panel: &ActionPanelView<'_>) -> String {
        let ActionPanelView::Game {
            uid,
            name,
            id,
            publisher,
            rpc_action,
            executables,
            running,
        } = panel
        else {
            return "Select a game to view controls\n".to_string();
        };

        let mut out = String::new();
        let _ = writeln!(out, "Name:      {name}");
        let _ = writeln!(out, "Game ID:   {id}");
        if let Some(publisher) = publisher {
            let _ = writeln!(out, "Publisher: {publisher}");
        }
        let _ = writeln!(out, "[{}] (rpc {uid})", rpc_action.label());
        out.push_str("EXECUTABLES\n");
        if executables.is_empty() {
            out.push_str("  No executables available\n");
        }
        for exe in executables {
            let dot = if exe.running { " ●" } else { "" };
            let _ = writeln!(
                out,
                "  {}{dot} ({}) [{}]",
                exe.name,
                exe.os,
                exe.action.label()
            );
        }
        out.push_str("STATUS\n");
        out.push_str(if *running {
            "  Game is running\n"
        } else {
            "  Not running\n"
        });
        out
    }

    fn stats(&self, stats: &DashboardStats) -> String {
        format!(
            "games: {}  sessions: {}  quest: {}%  rpc: {}\n",
            stats.total_games,
            stats.active_sessions,
            stats.quest_progress,
            stats.connection.label()
        )
    }

    fn toasts(&self, toasts: &[&Notification]) -> String {
        let mut out = String::new();
        for n in toasts {
            let _ = writeln!(out, "({}) {}", n.severity.label(), n.message);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_games;
    use crate::notifier::Severity;
    use crate::state::{DashboardState, GameStatus};
    use crate::stats::ConnectionState;
    use crate::view::{action_panel, game_cards};
    use chrono::Utc;

    fn state_with_valorant() -> DashboardState {
        let mut state = DashboardState::new();
        state.add(&sample_games()[0], "v1".into());
        state
    }

    #[test]
    fn empty_list_has_empty_state_text() {
        let out = TextRenderer.game_list(&[]);
        assert!(out.contains("No games selected yet"));
    }

    #[test]
    fn game_list_shows_status_and_selection() {
        let mut state = state_with_valorant();
        state.select("v1").unwrap();
        let out = TextRenderer.game_list(&game_cards(&state));
        assert!(out.starts_with("> VALORANT"));
        assert!(out.contains("[ready]"));
        assert!(out.contains("(remove)"));
    }

    #[test]
    fn running_game_hides_remove() {
        let mut state = state_with_valorant();
        state.mark_installed("v1", "VALORANT.exe");
        state.mark_running("v1", "VALORANT.exe", Utc::now());
        let cards = game_cards(&state);
        assert_eq!(cards[0].status, GameStatus::Running);
        let out = TextRenderer.game_list(&cards);
        assert!(out.contains("[running]"));
        assert!(!out.contains("(remove)"));
    }

    #[test]
    fn search_panel_text() {
        let games = sample_games();
        assert_eq!(TextRenderer.search_panel(&SearchPanel::Hidden), "");
        assert!(TextRenderer
            .search_panel(&SearchPanel::NoResults)
            .contains("No games found"));
        let out = TextRenderer.search_panel(&SearchPanel::Results(vec![&games[3]]));
        assert!(out.contains("Fortnite"));
        assert!(out.contains("438122941302046720"));
    }

    #[test]
    fn action_panel_without_selection() {
        let state = state_with_valorant();
        let out = TextRenderer.action_panel(&action_panel(&state));
        assert_eq!(out, "Select a game to view controls\n");
    }

    #[test]
    fn action_panel_lists_executables_with_actions() {
        let mut state = state_with_valorant();
        state.select("v1").unwrap();
        state.mark_installed("v1", "VALORANT.exe");
        state.mark_running("v1", "VALORANT.exe", Utc::now());
        let out = TextRenderer.action_panel(&action_panel(&state));
        assert!(out.contains("Publisher: Riot Games"));
        assert!(out.contains("[Connect via RPC]"));
        assert!(out.contains("VALORANT-Win64-Shipping.exe (win32) [Install]"));
        assert!(out.contains("VALORANT.exe ● (win32) [Stop]"));
        assert!(out.contains("Game is running"));
    }

    #[test]
    fn stats_line() {
        let stats = DashboardStats {
            total_games: 3,
            active_sessions: 1,
            quest_progress: 25,
            connection: ConnectionState::Offline,
        };
        assert_eq!(
            TextRenderer.stats(&stats),
            "games: 3  sessions: 1  quest: 25%  rpc: OFFLINE\n"
        );
    }

    #[test]
    fn toasts_are_listed_with_severity() {
        let notes = [Notification {
            message: "Game removed".into(),
            severity: Severity::Success,
            shown_at: Utc::now(),
        }];
        let out = TextRenderer.toasts(&notes.iter().collect::<Vec<_>>());
        assert_eq!(out, "(success) Game removed\n");
    }
}
