/// Pure projections of dashboard state into what a renderer displays.
///
/// Views borrow from the state; building them never mutates anything.
use crate::catalog::GameRecord;
use crate::state::{DashboardState, GameStatus, SelectedGame};

/// The search dropdown.
#[derive(Debug, PartialEq)]
pub enum SearchPanel<'a> {
    /// Blank query: the panel is not shown.
    Hidden,
    /// Non-blank query with no hits ("No games found").
    NoResults,
    Results(Vec<&'a GameRecord>),
}

impl<'a> SearchPanel<'a> {
    pub fn from_results(query: &str, results: Vec<&'a GameRecord>) -> Self {
        if query.trim().is_empty() {
            SearchPanel::Hidden
        } else if results.is_empty() {
            SearchPanel::NoResults
        } else {
            SearchPanel::Results(results)
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, SearchPanel::Hidden)
    }
}

/// One card in the game list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCardView<'a> {
    pub uid: &'a str,
    pub name: &'a str,
    pub status: GameStatus,
    pub selected: bool,
    /// Running games hide their remove button.
    pub removable: bool,
}

pub fn game_cards(state: &DashboardState) -> Vec<GameCardView<'_>> {
    let selected = state.selected_uid();
    state
        .games()
        .iter()
        .map(|g| GameCardView {
            uid: g.uid(),
            name: g.name(),
            status: g.status(),
            selected: selected == Some(g.uid()),
            removable: !g.is_running(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcAction {
    Connect,
    Disconnect,
}

impl RpcAction {
    pub fn label(self) -> &'static str {
        match self {
            RpcAction::Connect => "Connect via RPC",
            RpcAction::Disconnect => "Disconnect RPC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableAction {
    Install,
    Run,
    Stop,
}

impl ExecutableAction {
    pub fn label(self) -> &'static str {
        match self {
            ExecutableAction::Install => "Install",
            ExecutableAction::Run => "Run",
            ExecutableAction::Stop => "Stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableView<'a> {
    pub name: &'a str,
    pub os: &'a str,
    pub running: bool,
    pub action: ExecutableAction,
}

fn executable_views(game: &SelectedGame) -> Vec<ExecutableView<'_>> {
    game.record()
        .executables
        .iter()
        .map(|exe| {
            let running = game.is_running() && game.running_executable() == Some(exe.name.as_str());
            let action = if !game.has_installed(&exe.name) {
                ExecutableAction::Install
            } else if running {
                ExecutableAction::Stop
            } else {
                ExecutableAction::Run
            };
            ExecutableView {
                name: &exe.name,
                os: exe.os(),
                running,
                action,
            }
        })
        .collect()
}

/// Controls for the selected game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPanelView<'a> {
    /// Nothing selected ("Select a game to view controls").
    Empty,
    Game {
        uid: &'a str,
        name: &'a str,
        id: &'a str,
        publisher: Option<&'a str>,
        rpc_action: RpcAction,
        /// Empty when the catalog lists no executables.
        executables: Vec<ExecutableView<'a>>,
        running: bool,
    },
}

pub fn action_panel(state: &DashboardState) -> ActionPanelView<'_> {
    let Some(game) = state.selected_game() else {
        return ActionPanelView::Empty;
    };
    let rpc_action = if state.is_rpc_connected() {
        RpcAction::Disconnect
    } else {
        RpcAction::Connect
    };
    ActionPanelView::Game {
        uid: game.uid(),
        name: game.name(),
        id: &game.record().id,
        publisher: game.record().primary_publisher().map(|p| p.name.as_str()),
        rpc_action,
        executables: executable_views(game),
        running: game.is_running(),
    }
}
