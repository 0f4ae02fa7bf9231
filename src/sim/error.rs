//! Error taxonomy for the round loop
//!
//! Validation and state errors are user-facing and never fatal; their
//! `Display` text is what the notification layer shows. Tick faults are
//! logged and skipped. Only seeding the RNG can fail initialization.

use thiserror::Error;

use super::state::{BetId, RoundPhase};

/// A bet request that cannot be accepted as given
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid bet amount")]
    InvalidAmount { amount: f64 },
    #[error("Insufficient balance")]
    InsufficientBalance { amount: f64, balance: f64 },
    #[error("Auto cashout must be above 1.00×")]
    InvalidAutoCashout { threshold: f64 },
}

/// A command that does not apply to the current round state (no-op)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("Bets are closed while the round is {phase}")]
    BetsClosed { phase: RoundPhase },
    #[error("You already have a bet in this round")]
    AlreadyPlaced { bet: BetId },
    #[error("Cashout is only possible while the round is running")]
    NotRunning { phase: RoundPhase },
    #[error("No active bet to cash out")]
    NoActiveBet,
    #[error("Bet {bet} is already settled")]
    NotActive { bet: BetId },
    #[error("Bet {bet} is no longer tracked")]
    UnknownBet { bet: BetId },
    #[error("The game has not started yet")]
    NotStarted,
    #[error("The game has stopped")]
    Stopped,
}

/// Either kind of rejected player command
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// A tick that could not be applied; the loop skips it and carries on
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickFault {
    #[error("multiplier growth produced a non-finite value from {from}")]
    NonFiniteMultiplier { from: f64 },
    #[error("tick delta {delta}s is not a positive duration")]
    ClockSkew { delta: f64 },
}

/// Fatal initialization errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to seed the random source from the OS: {0}")]
    Entropy(String),
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),
}
