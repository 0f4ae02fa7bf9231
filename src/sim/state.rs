//! Round and bet types
//!
//! Everything a snapshot exposes lives here; all of it is serializable so a
//! host can ship snapshots to a UI layer unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Betting window before launch
    Waiting,
    /// Multiplier climbing
    Running,
    /// Round is over, showing the crash point
    Crashed,
}

impl RoundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Waiting => "waiting",
            RoundPhase::Running => "running",
            RoundPhase::Crashed => "crashed",
        }
    }

    /// Phases in which a bet may exist as Active
    pub fn accepts_bets(&self) -> bool {
        matches!(self, RoundPhase::Waiting | RoundPhase::Running)
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The live round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Round number (1-based, increments each round)
    pub id: u64,
    pub phase: RoundPhase,
    /// Current multiplier (1.0 until launch)
    pub multiplier: f64,
    /// Hidden target; drawn at launch, only published once crashed
    #[serde(skip)]
    pub crash_point: Option<f64>,
    /// Clock time the multiplier started climbing
    pub started_at: Option<f64>,
}

impl Round {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            phase: RoundPhase::Waiting,
            multiplier: 1.0,
            crash_point: None,
            started_at: None,
        }
    }

    pub fn is_crashed(&self) -> bool {
        self.phase == RoundPhase::Crashed
    }

    /// Crash point, visible only after the crash
    pub fn revealed_crash_point(&self) -> Option<f64> {
        if self.is_crashed() {
            self.crash_point
        } else {
            None
        }
    }
}

/// Unique bet identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BetId(pub u64);

impl fmt::Display for BetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who placed a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Synthetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetStatus {
    Active,
    Won,
    Lost,
}

/// A bet request before the ledger assigns it an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewBet {
    pub round: u64,
    pub owner: Owner,
    pub name: String,
    pub amount: f64,
    pub auto_cashout: Option<f64>,
}

impl NewBet {
    pub fn player(round: u64, amount: f64, auto_cashout: Option<f64>) -> Self {
        Self {
            round,
            owner: Owner::Player,
            name: PLAYER_NAME.to_string(),
            amount,
            auto_cashout,
        }
    }
}

/// Display name of the local player in the bet table
pub const PLAYER_NAME: &str = "You";

/// A bet tracked by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub round: u64,
    pub owner: Owner,
    pub name: String,
    pub amount: f64,
    pub auto_cashout: Option<f64>,
    pub resolved_multiplier: Option<f64>,
    pub profit: Option<f64>,
    pub status: BetStatus,
}

impl Bet {
    pub fn new(id: BetId, request: NewBet) -> Self {
        Self {
            id,
            round: request.round,
            owner: request.owner,
            name: request.name,
            amount: request.amount,
            auto_cashout: request.auto_cashout,
            resolved_multiplier: None,
            profit: None,
            status: BetStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BetStatus::Active
    }

    pub fn is_player(&self) -> bool {
        self.owner == Owner::Player
    }

    /// Settle as a win at `multiplier` and return the profit.
    /// Only called on Active bets.
    pub(crate) fn win(&mut self, multiplier: f64) -> f64 {
        let profit = self.amount * (multiplier - 1.0);
        self.status = BetStatus::Won;
        self.resolved_multiplier = Some(multiplier);
        self.profit = Some(profit);
        profit
    }

    /// Settle as a loss at the crash point. Only called on Active bets.
    pub(crate) fn lose(&mut self, crash_point: f64) {
        self.status = BetStatus::Lost;
        self.resolved_multiplier = Some(crash_point);
        self.profit = Some(-self.amount);
    }
}

/// The player's in-memory balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    balance: f64,
}

impl Wallet {
    pub fn new(balance: f64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub(crate) fn debit(&mut self, amount: f64) {
        self.balance -= amount;
    }

    pub(crate) fn credit(&mut self, amount: f64) {
        self.balance += amount;
    }
}

/// Things worth telling the player about (drained by the notification layer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    /// New round opened for betting; launches at `starts_at`
    RoundScheduled { round: u64, starts_at: f64 },
    RoundStarted { round: u64 },
    BetPlaced { bet: BetId, owner: Owner, amount: f64 },
    CashedOut {
        bet: BetId,
        owner: Owner,
        multiplier: f64,
        payout: f64,
    },
    Crashed { round: u64, crash_point: f64 },
    /// The player's bet was still riding when the round crashed
    PlayerBusted { bet: BetId, crash_point: f64 },
}
