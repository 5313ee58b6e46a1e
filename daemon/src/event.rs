use crate::command::Command;
use crate::config::Config;

pub enum DashboardEvent {
    /// A parsed line from stdin.
    Command(Command),
    /// Periodic tick; advances the simulated clock by real elapsed time.
    Tick,
    /// The config file changed on disk and was successfully re-parsed.
    ConfigReloaded(Config),
    /// Stdin reached EOF; exit once pending transitions have fired.
    InputClosed,
    /// Ctrl+C received; write status and exit immediately.
    Shutdown,
}
