//! Synthetic table participants
//!
//! Non-player bets that make the table look busy. They join at launch and
//! cash out at random, more eagerly the higher the multiplier climbs.

use rand::Rng;

use super::state::{Bet, BetId, BetStatus, NewBet, Owner};
use crate::round2;
use crate::settings::SyntheticSettings;

/// Names drawn for synthetic bets
pub const NAMES: [&str; 16] = [
    "CryptoKing",
    "LuckyGambler",
    "WhaleBet",
    "CasinoRoyale",
    "GambleTron",
    "HighRoller",
    "FortuneSeeker",
    "JackpotHunter",
    "BetMaster",
    "LuckyCharm",
    "RiskyBusiness",
    "AllInPlayer",
    "VegasWinner",
    "SlotMaster",
    "BetHunter",
    "RoulettePro",
];

/// Settled bets generated for a pre-filled table per history entry
pub const PREFILL_BETS: usize = 7;
/// Chance a pre-filled bet had cashed out before its crash
const PREFILL_WIN_CHANCE: f64 = 0.6;

/// A bet that is already settled, used to populate the table at startup
#[derive(Debug, Clone, PartialEq)]
pub struct SettledBet {
    pub request: NewBet,
    pub status: BetStatus,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticParticipants {
    settings: SyntheticSettings,
}

impl SyntheticParticipants {
    pub fn new(settings: SyntheticSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SyntheticSettings {
        &self.settings
    }

    fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
        NAMES[rng.random_range(0..NAMES.len())].to_string()
    }

    fn random_amount<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.settings.min_amount..self.settings.max_amount) as f64
    }

    /// Bets joining round `round` at launch
    pub fn spawn_for_round<R: Rng + ?Sized>(&self, rng: &mut R, round: u64) -> Vec<NewBet> {
        let s = &self.settings;
        let count = rng.random_range(s.min_bets..=s.max_bets);
        (0..count)
            .map(|_| {
                let auto_cashout = rng
                    .random_bool(s.auto_cashout_chance)
                    .then(|| round2(rng.random_range(s.auto_cashout_min..s.auto_cashout_max)));
                NewBet {
                    round,
                    owner: Owner::Synthetic,
                    name: Self::random_name(rng),
                    amount: self.random_amount(rng),
                    auto_cashout,
                }
            })
            .collect()
    }

    /// Per-tick chance that a synthetic bet cashes out at `multiplier`
    pub fn cashout_probability(&self, multiplier: f64) -> f64 {
        if !(multiplier > 0.0) {
            return 0.0;
        }
        (self.settings.cashout_rate * (multiplier + 1.0).ln()).clamp(0.0, 1.0)
    }

    /// Synthetic Active bets that decide to cash out this tick.
    /// Player bets are never selected.
    pub fn maybe_cashout<'a, R, I>(&self, rng: &mut R, bets: I, multiplier: f64) -> Vec<BetId>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = &'a Bet>,
    {
        let p = self.cashout_probability(multiplier);
        bets.into_iter()
            .filter(|b| b.owner == Owner::Synthetic && b.is_active())
            .filter(|_| rng.random_bool(p))
            .map(|b| b.id)
            .collect()
    }

    /// Settled bets for a table pre-filled with `history` (oldest first).
    /// Bets cycle backwards through the history starting from the newest round.
    pub fn seed_settled<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        history: &[f64],
        count: usize,
    ) -> Vec<SettledBet> {
        if history.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|i| {
                let crash_point = history[history.len() - 1 - (i % history.len())];
                let request = NewBet {
                    round: 0,
                    owner: Owner::Synthetic,
                    name: Self::random_name(rng),
                    amount: self.random_amount(rng),
                    auto_cashout: None,
                };
                let cashed_out = crash_point > 1.0 && rng.random_bool(PREFILL_WIN_CHANCE);
                if cashed_out {
                    let at = round2(1.0 + (crash_point - 1.0) * rng.random::<f64>()).max(1.0);
                    SettledBet {
                        request,
                        status: BetStatus::Won,
                        multiplier: at.min(crash_point),
                    }
                } else {
                    SettledBet {
                        request,
                        status: BetStatus::Lost,
                        multiplier: crash_point,
                    }
                }
            })
            .collect()
    }
}
