//! Crash Sim - a crash betting round simulator
//!
//! Core modules:
//! - `sim`: Round state machine, crash points, bets, synthetic players
//! - `renderer`: Backend-neutral growth curve renderer
//! - `history`: Recent crash points shown to players
//! - `settings`: Data-driven tuning loaded from JSON

pub mod history;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use history::RoundHistory;
pub use settings::{Settings, SettingsError};

/// Game configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Multiplier tick interval (20 Hz)
    pub const TICK_INTERVAL: f64 = 0.05;
    /// Largest delta a single tick will integrate (timer starvation guard)
    pub const MAX_TICK_DELTA: f64 = 1.0;
    /// Pre-round betting window in seconds
    pub const WAITING_SECS: f64 = 3.0;
    /// How long the crashed state stays on screen
    pub const CRASHED_SECS: f64 = 3.0;

    /// Growth law: rate(m) = GROWTH_K * m^GROWTH_P
    pub const GROWTH_K: f64 = 0.5;
    pub const GROWTH_P: f64 = 0.7;

    /// Fraction of every wager the house keeps over the long run
    pub const HOUSE_EDGE: f64 = 0.01;
    /// Crash point bounds
    pub const MIN_CRASH_POINT: f64 = 0.9;
    pub const MAX_CRASH_POINT: f64 = 100.0;

    /// Player wallet at startup
    pub const STARTING_BALANCE: f64 = 1000.0;
    /// Bets kept for the recent-bets table
    pub const LEDGER_CAPACITY: usize = 20;
    /// Crash points kept in the history strip
    pub const HISTORY_CAPACITY: usize = 50;

    /// Renderer: minimum visible multiplier range
    pub const DISPLAY_FLOOR: f64 = 10.0;
}

/// Round a value to 2 decimal places (cents / hundredths of a multiplier)
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a currency amount the way the betting table shows it
pub fn format_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount)
    }
}
