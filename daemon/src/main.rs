use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use quest_sim_daemon::catalog::{self, HttpCatalog, LoadedCatalog};
use quest_sim_daemon::clock::SimClock;
use quest_sim_daemon::command::{self, Command, HELP};
use quest_sim_daemon::config;
use quest_sim_daemon::dashboard::Dashboard;
use quest_sim_daemon::event::DashboardEvent;
use quest_sim_daemon::notifier::{LogNotifier, ToastQueue};
use quest_sim_daemon::paths;
use quest_sim_daemon::render::{Renderer, TextRenderer};
use quest_sim_daemon::status::{self, DashboardStatus};

const TICK_INTERVAL_MS: u64 = 100;

type AppDashboard = Dashboard<(ToastQueue, LogNotifier)>;

#[tokio::main]
async fn main() {
    init_logging();

    // ── App data directory ────────────────────────────────────────────────────
    let app_dir = paths::app_data_dir();
    if let Err(e) = std::fs::create_dir_all(&app_dir) {
        error!("Failed to create app data directory {}: {e}", app_dir.display());
        std::process::exit(1);
    }

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = paths::config_file_path();
    let config = config::load_or_default(&config_path).unwrap_or_else(|e| {
        error!("[config] Error (using defaults): {e:#}");
        config::Config::default()
    });

    // ── Catalog ───────────────────────────────────────────────────────────────
    let loaded = match HttpCatalog::new(&config.catalog) {
        Ok(provider) => catalog::load(&provider).await,
        Err(e) => {
            warn!("[catalog] {e:#}; using sample games");
            LoadedCatalog::fallback()
        }
    };

    let notifier = (
        ToastQueue::new(config.timing.notification_ttl()),
        LogNotifier,
    );
    let mut dashboard = Dashboard::new(
        loaded,
        config.timing.clone(),
        &config.search,
        notifier,
        SimClock::starting_now(),
    );
    let renderer = TextRenderer;

    let status_path = paths::status_file_path();
    write_status(&status_path, &dashboard);

    let (event_tx, mut event_rx) = mpsc::channel::<DashboardEvent>(32);

    // ── Background tasks ──────────────────────────────────────────────────────
    tokio::spawn(config::watch_config(config_path, event_tx.clone()));
    {
        // Stdin reads cannot be cancelled, so they get their own thread
        // instead of a runtime task that would hold up shutdown.
        let tx = event_tx.clone();
        std::thread::spawn(move || command::forward_commands(std::io::stdin().lock(), &tx));
    }
    tokio::spawn(tick(event_tx.clone()));

    // Graceful shutdown on Ctrl+C.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(DashboardEvent::Shutdown).await;
            }
        });
    }

    info!(
        "quest-sim-daemon v{} started ({} games in catalog)",
        env!("CARGO_PKG_VERSION"),
        dashboard.catalog_len()
    );
    println!("{HELP}");
    print_dashboard(&renderer, &dashboard);

    // ── Event loop ────────────────────────────────────────────────────────────
    let mut last_tick = Instant::now();
    let mut draining = false;

    while let Some(evt) = event_rx.recv().await {
        match evt {
            DashboardEvent::Tick => {
                let now = Instant::now();
                let applied = dashboard.advance(now.duration_since(last_tick));
                last_tick = now;
                if applied > 0 {
                    print_dashboard(&renderer, &dashboard);
                    write_status(&status_path, &dashboard);
                }
                if draining && dashboard.pending_transitions() == 0 {
                    info!("Input closed and all transitions settled");
                    break;
                }
            }

            DashboardEvent::Command(Command::Quit) | DashboardEvent::Shutdown => {
                info!("Shutting down");
                break;
            }

            DashboardEvent::Command(command) => {
                if handle_command(&mut dashboard, &renderer, command) {
                    write_status(&status_path, &dashboard);
                }
            }

            DashboardEvent::ConfigReloaded(new_config) => {
                info!("[config] Reloaded; new delays and toast lifetime apply to later requests");
                dashboard
                    .notifier_mut()
                    .0
                    .set_ttl(new_config.timing.notification_ttl());
                dashboard.set_search_limit(&new_config.search);
                dashboard.set_timing(new_config.timing);
            }

            DashboardEvent::InputClosed => {
                draining = true;
            }
        }
    }

    write_status(&status_path, &dashboard);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Applies one command. Returns `true` when the command may have changed
/// state that the status file mirrors.
///
/// Rejected requests have already surfaced through the notifier.
fn handle_command(dashboard: &mut AppDashboard, renderer: &TextRenderer, command: Command) -> bool {
    let changed = match command {
        Command::Search(query) => {
            let panel = dashboard.search(&query);
            print!("{}", renderer.search_panel(&panel));
            return false;
        }
        Command::List => {
            print_dashboard(renderer, dashboard);
            return false;
        }
        Command::Stats => {
            print!("{}", renderer.stats(&dashboard.stats()));
            return false;
        }
        Command::Help => {
            println!("{HELP}");
            return false;
        }
        Command::Add(id) => dashboard.add_game(&id).is_ok(),
        Command::Remove(uid) => dashboard.remove_game(&uid).is_ok(),
        Command::Select(uid) => dashboard.select_game(&uid).is_ok(),
        Command::Install { uid, executable } => {
            dashboard.install_executable(&uid, &executable).is_ok()
        }
        Command::Run { uid, executable } => dashboard.run_executable(&uid, &executable).is_ok(),
        Command::Stop { uid, executable } => dashboard.stop_executable(&uid, &executable).is_ok(),
        Command::ToggleRpc(uid) => dashboard.toggle_rpc(&uid).is_ok(),
        Command::Quit => false,
    };
    if changed {
        print_dashboard(renderer, dashboard);
    }
    changed
}

fn print_dashboard(renderer: &TextRenderer, dashboard: &AppDashboard) {
    let toasts: Vec<_> = dashboard.notifier().0.live().collect();
    println!("────────────────────────────────────────");
    print!("{}", renderer.stats(&dashboard.stats()));
    print!("{}", renderer.game_list(&dashboard.game_cards()));
    print!("{}", renderer.action_panel(&dashboard.action_panel()));
    print!("{}", renderer.toasts(&toasts));
}

fn write_status(path: &Path, dashboard: &AppDashboard) {
    let status = DashboardStatus::from_state(dashboard.state(), dashboard.catalog_source());
    status::write_status(path, &status);
}

async fn tick(tx: mpsc::Sender<DashboardEvent>) {
    let mut ticker = interval(Duration::from_millis(TICK_INTERVAL_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if tx.send(DashboardEvent::Tick).await.is_err() {
            break;
        }
    }
}
