//! Simulated Discord detectable-games dashboard.
//!
//! The library holds the core (catalog search, the game-list state machine,
//! simulated transitions on a schedulable clock, and view projections). The
//! `quest-sim-daemon` binary hosts it in a tokio event loop driven by stdin.

pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod event;
pub mod notifier;
pub mod paths;
pub mod render;
pub mod search;
pub mod state;
pub mod stats;
pub mod status;
pub mod view;
