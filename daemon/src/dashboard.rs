/// The dashboard: catalog search, the game list, and simulated transitions.
///
/// Every request validates against the current state, emits its "in
/// progress" notification, and schedules a [`Transition`] on the simulated
/// clock. The transition is applied atomically when [`Dashboard::advance`]
/// reaches its due time. Scheduled transitions are never cancelled: if the
/// same request is made twice, both fire and the last one wins.
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{CatalogSource, LoadedCatalog};
use crate::clock::{Scheduler, SimClock};
use crate::config::{SearchConfig, TimingConfig};
use crate::notifier::{Notification, Notifier, Severity};
use crate::search::SearchIndex;
use crate::state::{AddOutcome, DashboardError, DashboardState, RpcSession};
use crate::stats::DashboardStats;
use crate::view::{self, ActionPanelView, GameCardView, SearchPanel};

/// A deferred state change, applied when its delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Install { uid: String, executable: String },
    Run { uid: String, executable: String },
    Stop { uid: String, executable: String },
    /// Game identity is captured at request time.
    ConnectRpc { game_id: String, game_name: String },
    DisconnectRpc,
}

pub struct Dashboard<N: Notifier> {
    index: SearchIndex,
    catalog_source: CatalogSource,
    state: DashboardState,
    scheduler: Scheduler<Transition>,
    timing: TimingConfig,
    notifier: N,
    query: String,
}

impl<N: Notifier> Dashboard<N> {
    /// Builds the dashboard around a loaded catalog and reports where the
    /// catalog came from.
    pub fn new(
        catalog: LoadedCatalog,
        timing: TimingConfig,
        search: &SearchConfig,
        notifier: N,
        clock: SimClock,
    ) -> Self {
        let mut dashboard = Self {
            index: SearchIndex::with_limit(catalog.games, search.effective_max_results()),
            catalog_source: catalog.source,
            state: DashboardState::new(),
            scheduler: Scheduler::new(clock),
            timing,
            notifier,
            query: String::new(),
        };
        match catalog.source {
            CatalogSource::Remote => {
                dashboard.notify(Severity::Success, "Game database loaded successfully")
            }
            CatalogSource::Fallback => dashboard.notify(Severity::Info, "Using sample game database"),
        }
        dashboard
    }

    // ── accessors ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn clock(&self) -> &SimClock {
        self.scheduler.clock()
    }

    pub fn catalog_source(&self) -> CatalogSource {
        self.catalog_source
    }

    pub fn catalog_len(&self) -> usize {
        self.index.len()
    }

    pub fn pending_transitions(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Applies to transitions scheduled from now on.
    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.timing = timing;
    }

    pub fn set_search_limit(&mut self, search: &SearchConfig) {
        self.index.set_limit(search.effective_max_results());
    }

    // ── views ─────────────────────────────────────────────────────────────────

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Updates the search query and returns the resulting panel.
    pub fn search(&mut self, query: &str) -> SearchPanel<'_> {
        self.query = query.to_string();
        self.search_panel()
    }

    pub fn search_panel(&self) -> SearchPanel<'_> {
        SearchPanel::from_results(&self.query, self.index.search(&self.query))
    }

    pub fn game_cards(&self) -> Vec<GameCardView<'_>> {
        view::game_cards(&self.state)
    }

    pub fn action_panel(&self) -> ActionPanelView<'_> {
        view::action_panel(&self.state)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_state(&self.state)
    }

    // ── list operations ───────────────────────────────────────────────────────

    /// Adds the catalog entry `catalog_id` to the list and clears the search.
    pub fn add_game(&mut self, catalog_id: &str) -> Result<AddOutcome, DashboardError> {
        let uid = self.fresh_uid();
        let Some(record) = self.index.find(catalog_id) else {
            return self.reject(DashboardError::UnknownCatalogEntry(catalog_id.to_string()));
        };
        let name = record.name.clone();
        let outcome = self.state.add(record, uid);
        match &outcome {
            AddOutcome::AlreadyPresent => {
                self.notify(Severity::Info, "Game already in your list");
            }
            AddOutcome::Added { uid } => {
                info!("[state] Added {name} as {uid}");
                self.query.clear();
                self.notify(Severity::Success, format!("{name} added successfully"));
            }
        }
        Ok(outcome)
    }

    pub fn remove_game(&mut self, uid: &str) -> Result<(), DashboardError> {
        match self.state.remove(uid) {
            Ok(game) => {
                info!("[state] Removed {} ({uid})", game.name());
                self.notify(Severity::Success, "Game removed");
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn select_game(&mut self, uid: &str) -> Result<(), DashboardError> {
        match self.state.select(uid) {
            Ok(()) => Ok(()),
            Err(e) => self.reject(e),
        }
    }

    // ── simulated transitions ─────────────────────────────────────────────────

    pub fn install_executable(&mut self, uid: &str, executable: &str) -> Result<(), DashboardError> {
        if let Err(e) = self.state.check_executable(uid, executable) {
            return self.reject(e);
        }
        self.notify(Severity::Info, "Installing dummy executable...");
        self.schedule(Transition::Install {
            uid: uid.to_string(),
            executable: executable.to_string(),
        });
        Ok(())
    }

    pub fn run_executable(&mut self, uid: &str, executable: &str) -> Result<(), DashboardError> {
        let (name, installed) = match self.state.check_executable(uid, executable) {
            Ok(game) => (game.name().to_string(), game.has_installed(executable)),
            Err(e) => return self.reject(e),
        };
        if !installed {
            return self.reject(DashboardError::NotInstalled(executable.to_string()));
        }
        self.notify(Severity::Info, format!("Starting {name}..."));
        self.schedule(Transition::Run {
            uid: uid.to_string(),
            executable: executable.to_string(),
        });
        Ok(())
    }

    pub fn stop_executable(&mut self, uid: &str, executable: &str) -> Result<(), DashboardError> {
        let name = match self.state.check_executable(uid, executable) {
            Ok(game) => game.name().to_string(),
            Err(e) => return self.reject(e),
        };
        self.notify(Severity::Info, format!("Stopping {name}..."));
        self.schedule(Transition::Stop {
            uid: uid.to_string(),
            executable: executable.to_string(),
        });
        Ok(())
    }

    /// Disconnects if a session exists, otherwise connects for `uid`.
    ///
    /// Decided on committed state only: a connect that is still pending does
    /// not count as connected.
    pub fn toggle_rpc(&mut self, uid: &str) -> Result<(), DashboardError> {
        if self.state.game(uid).is_none() {
            return self.reject(DashboardError::UnknownGame(uid.to_string()));
        }
        if self.state.is_rpc_connected() {
            self.disconnect_rpc();
            Ok(())
        } else {
            self.connect_rpc(uid)
        }
    }

    pub fn connect_rpc(&mut self, uid: &str) -> Result<(), DashboardError> {
        let Some(game) = self.state.game(uid) else {
            return self.reject(DashboardError::UnknownGame(uid.to_string()));
        };
        let transition = Transition::ConnectRpc {
            game_id: game.record().id.clone(),
            game_name: game.name().to_string(),
        };
        self.notify(Severity::Info, "Connecting to Discord RPC...");
        self.schedule(transition);
        Ok(())
    }

    pub fn disconnect_rpc(&mut self) {
        self.notify(Severity::Info, "Disconnecting from Discord RPC...");
        self.schedule(Transition::DisconnectRpc);
    }

    /// Moves simulated time forward by `by`, applying every transition that
    /// falls due in order, then expires stale notifications. Returns the
    /// number of transitions applied.
    pub fn advance(&mut self, by: Duration) -> usize {
        let deadline = self.scheduler.deadline_after(by);
        let mut applied = 0;
        while let Some(transition) = self.scheduler.pop_due(deadline) {
            self.apply(transition);
            applied += 1;
        }
        self.scheduler.settle(deadline);
        self.notifier.expire(self.scheduler.clock().now());
        applied
    }

    fn apply(&mut self, transition: Transition) {
        let now = self.scheduler.clock().now();
        match transition {
            Transition::Install { uid, executable } => {
                if self.state.mark_installed(&uid, &executable).is_some() {
                    self.notify(Severity::Success, format!("{executable} installed successfully"));
                } else {
                    debug!("[state] Install of {executable} fired after {uid} was removed");
                }
            }
            Transition::Run { uid, executable } => {
                match self.state.mark_running(&uid, &executable, now).map(|g| g.name().to_string()) {
                    Some(name) => {
                        info!("[state] {name} running {executable}");
                        self.notify(Severity::Success, format!("{name} is now running"));
                    }
                    None => debug!("[state] Run of {executable} fired after {uid} was removed"),
                }
            }
            Transition::Stop { uid, executable } => {
                match self.state.mark_stopped(&uid).map(|g| g.name().to_string()) {
                    Some(name) => {
                        info!("[state] {name} stopped {executable}");
                        self.notify(Severity::Success, format!("{name} stopped"));
                    }
                    None => debug!("[state] Stop fired after {uid} was removed"),
                }
            }
            Transition::ConnectRpc { game_id, game_name } => {
                let session = RpcSession {
                    game_id,
                    game_name: game_name.clone(),
                    connected_at: now,
                };
                if let Some(previous) = self.state.connect_rpc(session) {
                    info!("[rpc] Replaced session for {}", previous.game_name);
                }
                self.notify(
                    Severity::Success,
                    format!("Connected to Discord RPC for {game_name}"),
                );
            }
            Transition::DisconnectRpc => {
                if self.state.disconnect_rpc().is_none() {
                    debug!("[rpc] Disconnect fired with no active session");
                }
                self.notify(Severity::Success, "Disconnected from Discord RPC");
            }
        }
    }

    // ── helpers ───────────────────────────────────────────────────────────────

    fn delay(&self, transition: &Transition) -> Duration {
        let ms = match transition {
            Transition::Install { .. } => self.timing.install_ms,
            Transition::Run { .. } => self.timing.run_ms,
            Transition::Stop { .. } => self.timing.stop_ms,
            Transition::ConnectRpc { .. } => self.timing.rpc_connect_ms,
            Transition::DisconnectRpc => self.timing.rpc_disconnect_ms,
        };
        Duration::from_millis(ms)
    }

    fn schedule(&mut self, transition: Transition) {
        let delay = self.delay(&transition);
        debug!("[state] Scheduled {transition:?} in {}ms", delay.as_millis());
        self.scheduler.schedule(delay, transition);
    }

    fn fresh_uid(&self) -> String {
        loop {
            let uid = Uuid::new_v4().simple().to_string();
            if self.state.game(&uid).is_none() {
                return uid;
            }
        }
    }

    fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        let notification = Notification {
            message: message.into(),
            severity,
            shown_at: self.scheduler.clock().now(),
        };
        self.notifier.notify(notification);
    }

    fn reject<T>(&mut self, error: DashboardError) -> Result<T, DashboardError> {
        self.notify(Severity::Error, error.to_string());
        Err(error)
    }
}
