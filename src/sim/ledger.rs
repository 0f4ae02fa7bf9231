//! Bet ledger
//!
//! Passive store of recent bets. Only the engine calls into it, so a
//! user-triggered cashout and the tick-driven crash can never race; each
//! operation still re-checks phase and bet status before mutating.

use std::collections::VecDeque;

use super::error::{CommandError, StateError, ValidationError};
use super::state::{Bet, BetId, BetStatus, NewBet, Owner, RoundPhase, Wallet};
use crate::consts::LEDGER_CAPACITY;

/// Outcome of a successful cashout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub bet: BetId,
    pub owner: Owner,
    pub multiplier: f64,
    pub profit: f64,
    /// Stake plus profit
    pub payout: f64,
}

#[derive(Debug, Clone)]
pub struct BetLedger {
    /// Insertion order, oldest first
    bets: VecDeque<Bet>,
    capacity: usize,
    next_id: u64,
}

impl Default for BetLedger {
    fn default() -> Self {
        Self::new(LEDGER_CAPACITY)
    }
}

impl BetLedger {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bets: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> BetId {
        let id = BetId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, bet: Bet) {
        if self.bets.len() == self.capacity {
            if let Some(evicted) = self.bets.pop_front() {
                log::trace!("Evicted bet {} from ledger", evicted.id);
            }
        }
        self.bets.push_back(bet);
    }

    /// Validate and record a new Active bet, debiting the wallet for player bets
    pub fn place(
        &mut self,
        request: NewBet,
        phase: RoundPhase,
        wallet: &mut Wallet,
    ) -> Result<BetId, CommandError> {
        if !phase.accepts_bets() {
            return Err(StateError::BetsClosed { phase }.into());
        }
        if !(request.amount.is_finite() && request.amount > 0.0) {
            return Err(ValidationError::InvalidAmount {
                amount: request.amount,
            }
            .into());
        }
        if request.owner == Owner::Player {
            if request.amount > wallet.balance() {
                return Err(ValidationError::InsufficientBalance {
                    amount: request.amount,
                    balance: wallet.balance(),
                }
                .into());
            }
            wallet.debit(request.amount);
        }

        let id = self.allocate_id();
        log::debug!(
            "Bet {} placed: {} ${:.2} ({:?})",
            id,
            request.name,
            request.amount,
            request.owner
        );
        self.insert(Bet::new(id, request));
        Ok(id)
    }

    /// Record a bet that is already settled (history prefill)
    pub(crate) fn record_settled(
        &mut self,
        request: NewBet,
        status: BetStatus,
        multiplier: f64,
    ) -> BetId {
        let id = self.allocate_id();
        let mut bet = Bet::new(id, request);
        match status {
            BetStatus::Won => {
                bet.win(multiplier);
            }
            BetStatus::Lost | BetStatus::Active => bet.lose(multiplier),
        }
        self.insert(bet);
        id
    }

    /// Settle an Active bet as a win at `multiplier`
    pub fn cashout(
        &mut self,
        id: BetId,
        multiplier: f64,
        phase: RoundPhase,
        wallet: &mut Wallet,
    ) -> Result<Settlement, StateError> {
        if phase != RoundPhase::Running {
            return Err(StateError::NotRunning { phase });
        }
        let bet = self
            .bets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StateError::UnknownBet { bet: id })?;
        if bet.status != BetStatus::Active {
            return Err(StateError::NotActive { bet: id });
        }

        let profit = bet.win(multiplier);
        let payout = bet.amount + profit;
        if bet.owner == Owner::Player {
            wallet.credit(payout);
        }
        log::debug!(
            "Bet {} cashed out at {:.2}x for ${:.2}",
            id,
            multiplier,
            payout
        );
        Ok(Settlement {
            bet: id,
            owner: bet.owner,
            multiplier,
            profit,
            payout,
        })
    }

    /// Mark every still-Active bet as Lost at `crash_point`.
    /// Returns the bets that changed; a repeat call returns nothing.
    pub fn resolve_crash(&mut self, crash_point: f64) -> Vec<Bet> {
        let mut lost = Vec::new();
        for bet in self.bets.iter_mut().filter(|b| b.is_active()) {
            bet.lose(crash_point);
            lost.push(bet.clone());
        }
        if !lost.is_empty() {
            log::debug!("{} bets lost at {:.2}x", lost.len(), crash_point);
        }
        lost
    }

    pub fn get(&self, id: BetId) -> Option<&Bet> {
        self.bets.iter().find(|b| b.id == id)
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Bet> + '_ {
        self.bets.iter()
    }

    /// Newest first (bet table order)
    pub fn recent(&self) -> Vec<Bet> {
        self.bets.iter().rev().cloned().collect()
    }

    pub fn active(&self) -> impl Iterator<Item = &Bet> + '_ {
        self.bets.iter().filter(|b| b.is_active())
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
