//! Game settings and tuning
//!
//! Every constant the round loop and renderer depend on lives here so a JSON
//! file can retune the game without a rebuild. Missing fields fall back to
//! the defaults in [`crate::consts`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::GrowthLaw;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings are not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Round pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Seconds between multiplier ticks
    pub tick_interval: f64,
    /// Largest delta integrated by a single (late) tick
    pub max_tick_delta: f64,
    /// Betting window before the multiplier starts
    pub waiting_secs: f64,
    /// Time the crashed round stays on screen
    pub crashed_secs: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            max_tick_delta: MAX_TICK_DELTA,
            waiting_secs: WAITING_SECS,
            crashed_secs: CRASHED_SECS,
        }
    }
}

/// Synthetic table participants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSettings {
    /// Fewest synthetic bets spawned per round
    pub min_bets: u32,
    /// Most synthetic bets spawned per round
    pub max_bets: u32,
    /// Smallest synthetic wager (inclusive)
    pub min_amount: u32,
    /// Largest synthetic wager (exclusive)
    pub max_amount: u32,
    /// Cashout chance per tick is `cashout_rate * ln(multiplier + 1)`
    pub cashout_rate: f64,
    /// Chance that a synthetic bet carries an auto-cashout target
    pub auto_cashout_chance: f64,
    /// Auto-cashout target range `[min, max)`
    pub auto_cashout_min: f64,
    pub auto_cashout_max: f64,
}

impl Default for SyntheticSettings {
    fn default() -> Self {
        Self {
            min_bets: 2,
            max_bets: 5,
            min_amount: 10,
            max_amount: 510,
            cashout_rate: 0.03,
            auto_cashout_chance: 0.5,
            auto_cashout_min: 1.2,
            auto_cashout_max: 4.2,
        }
    }
}

/// Plot margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            left: 60.0,
            right: 40.0,
            top: 40.0,
            bottom: 60.0,
        }
    }
}

/// Curve renderer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Minimum visible multiplier range
    pub display_floor: f64,
    /// Plot margins
    pub padding: Padding,
    /// Recent crash points drawn as history pills
    pub history_markers: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            display_floor: DISPLAY_FLOOR,
            padding: Padding::default(),
            history_markers: 10,
        }
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Long-run share of every wager kept by the house
    pub house_edge: f64,
    /// Multiplier growth law
    pub growth: GrowthLaw,
    pub timing: TimingSettings,
    /// Player wallet at startup
    pub starting_balance: f64,
    /// Bets kept in the ledger (FIFO)
    pub ledger_capacity: usize,
    /// Crash points kept in the history strip
    pub history_capacity: usize,
    /// Generated rounds seeded into history (and the bet table) at start
    pub prefill_rounds: usize,
    pub synthetic: SyntheticSettings,
    pub render: RenderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            house_edge: HOUSE_EDGE,
            growth: GrowthLaw::default(),
            timing: TimingSettings::default(),
            starting_balance: STARTING_BALANCE,
            ledger_capacity: LEDGER_CAPACITY,
            history_capacity: HISTORY_CAPACITY,
            prefill_rounds: 0,
            synthetic: SyntheticSettings::default(),
            render: RenderSettings::default(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be > 0 (got {value})")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be >= 0 (got {value})")))
    }
}

impl Settings {
    /// Parse settings from a JSON string and validate them
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the round loop cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..1.0).contains(&self.house_edge) {
            return Err(invalid(
                "house_edge",
                format!("must be in [0, 1) (got {})", self.house_edge),
            ));
        }
        positive("growth.k", self.growth.k)?;
        if !self.growth.p.is_finite() {
            return Err(invalid("growth.p", "must be finite"));
        }

        positive("timing.tick_interval", self.timing.tick_interval)?;
        non_negative("timing.waiting_secs", self.timing.waiting_secs)?;
        non_negative("timing.crashed_secs", self.timing.crashed_secs)?;
        if !(self.timing.max_tick_delta >= self.timing.tick_interval) {
            return Err(invalid(
                "timing.max_tick_delta",
                "must be at least timing.tick_interval",
            ));
        }

        non_negative("starting_balance", self.starting_balance)?;
        if self.ledger_capacity == 0 {
            return Err(invalid("ledger_capacity", "must be > 0"));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity", "must be > 0"));
        }

        let synthetic = &self.synthetic;
        // Room for the player's bet plus a full synthetic spawn, so an Active
        // bet is never evicted before it settles
        if self.ledger_capacity <= synthetic.max_bets as usize {
            return Err(invalid(
                "ledger_capacity",
                format!(
                    "must exceed synthetic.max_bets ({})",
                    synthetic.max_bets
                ),
            ));
        }
        if synthetic.min_bets > synthetic.max_bets {
            return Err(invalid("synthetic.min_bets", "must not exceed max_bets"));
        }
        if synthetic.min_amount == 0 || synthetic.min_amount >= synthetic.max_amount {
            return Err(invalid(
                "synthetic.min_amount",
                "must be > 0 and below max_amount",
            ));
        }
        non_negative("synthetic.cashout_rate", synthetic.cashout_rate)?;
        if !(0.0..=1.0).contains(&synthetic.auto_cashout_chance) {
            return Err(invalid("synthetic.auto_cashout_chance", "must be in [0, 1]"));
        }
        if !(synthetic.auto_cashout_min > 1.0 && synthetic.auto_cashout_min < synthetic.auto_cashout_max)
        {
            return Err(invalid(
                "synthetic.auto_cashout_min",
                "must be > 1 and below auto_cashout_max",
            ));
        }

        positive("render.display_floor", self.render.display_floor)?;
        Ok(())
    }
}
