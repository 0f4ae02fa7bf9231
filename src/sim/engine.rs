//! Round state machine
//!
//! `Waiting -> Running -> Crashed -> Waiting` forever. The host owns the
//! clock and calls [`RoundEngine::update`] with a monotonic time in seconds;
//! every due timer fires inside that call. Player commands are plain method
//! calls between updates, so they interleave atomically with ticks. Each one
//! re-checks phase and bet status before touching anything.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::crash_point::{CrashPointGenerator, CrashPointSource};
use super::error::{CommandError, EngineError, StateError, TickFault, ValidationError};
use super::ledger::{BetLedger, Settlement};
use super::state::{Bet, BetId, NewBet, Owner, Round, RoundEvent, RoundPhase, Wallet};
use super::synthetic::{PREFILL_BETS, SyntheticParticipants};
use super::timers::{PhaseAction, Timers};
use crate::history::RoundHistory;
use crate::settings::Settings;
use crate::format_money;

/// Successful command result with the text to show the player
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub bet: BetId,
    pub message: String,
    /// Present for cashouts
    pub settlement: Option<Settlement>,
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub round: u64,
    pub phase: RoundPhase,
    pub multiplier: f64,
    pub crashed: bool,
    /// Only revealed once the round has crashed
    pub crash_point: Option<f64>,
    /// Past crash points, most recent last
    pub history: Vec<f64>,
    /// Bet table, newest first
    pub recent_bets: Vec<Bet>,
    pub player_bet: Option<Bet>,
    pub balance: f64,
    /// Banner text above the graph
    pub status_line: String,
    /// Seconds until launch while Waiting
    pub countdown: Option<f64>,
}

pub struct RoundEngine {
    settings: Settings,
    rng: Pcg32,
    crash_source: Box<dyn CrashPointSource>,
    synthetic: SyntheticParticipants,
    ledger: BetLedger,
    wallet: Wallet,
    history: RoundHistory,
    round: Round,
    timers: Timers,
    /// The player's bet in the current round
    player_bet: Option<BetId>,
    events: Vec<RoundEvent>,
    now: f64,
    started: bool,
    stopped: bool,
}

impl RoundEngine {
    /// Create an engine with a seeded RNG. Call [`start`](Self::start) to
    /// open the first round.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(Self::with_rng(settings, Pcg32::seed_from_u64(seed)))
    }

    /// Create an engine seeded from OS entropy
    pub fn from_entropy(settings: Settings) -> Result<Self, EngineError> {
        settings.validate()?;
        let rng = Pcg32::try_from_os_rng().map_err(|e| EngineError::Entropy(e.to_string()))?;
        Ok(Self::with_rng(settings, rng))
    }

    fn with_rng(settings: Settings, rng: Pcg32) -> Self {
        Self {
            crash_source: Box::new(CrashPointGenerator::new(settings.house_edge)),
            synthetic: SyntheticParticipants::new(settings.synthetic.clone()),
            ledger: BetLedger::new(settings.ledger_capacity),
            wallet: Wallet::new(settings.starting_balance),
            history: RoundHistory::new(settings.history_capacity),
            round: Round::new(0),
            timers: Timers::default(),
            player_bet: None,
            events: Vec::new(),
            now: 0.0,
            started: false,
            stopped: false,
            settings,
            rng,
        }
    }

    /// Replace the crash point distribution (scripted rounds, replays)
    pub fn with_crash_source(mut self, source: Box<dyn CrashPointSource>) -> Self {
        self.crash_source = source;
        self
    }

    // === Lifecycle ===

    /// Open the first round at clock time `now`
    pub fn start(&mut self, now: f64) {
        if self.stopped {
            log::warn!("Ignoring start on a stopped engine");
            return;
        }
        if self.started {
            return;
        }
        self.started = true;
        self.now = now;
        if self.settings.prefill_rounds > 0 && self.history.is_empty() {
            self.prefill();
        }
        self.begin_round(now);
    }

    /// Cancel both timers. A stopped engine never mutates again.
    pub fn stop(&mut self) {
        self.timers.cancel_all();
        self.stopped = true;
        log::info!("Engine stopped in round {}", self.round.id);
    }

    /// Fire every timer due at `now`
    pub fn update(&mut self, now: f64) {
        if self.stopped || !self.started {
            return;
        }
        if !now.is_finite() {
            log::warn!("Ignoring non-finite clock value {now}");
            return;
        }
        self.now = now;

        loop {
            if let Some(action) = self.timers.take_due_phase(now) {
                match action {
                    PhaseAction::Launch => self.launch(now),
                    PhaseAction::NextRound => self.begin_round(now),
                }
                continue;
            }
            // The tick is re-armed before the body runs, so a fault never
            // stops the heartbeat.
            if let Some(delta) = self.timers.take_due_tick(now) {
                if let Err(fault) = self.on_tick(now, delta) {
                    log::warn!("Round {}: tick skipped: {}", self.round.id, fault);
                }
                continue;
            }
            break;
        }
    }

    // === Phase transitions ===

    fn draw_crash_point(&mut self) -> f64 {
        let raw = self.crash_source.next_crash_point(&mut self.rng);
        let crash_point = CrashPointGenerator::normalize(raw);
        if crash_point != raw {
            log::debug!("Crash point {raw} normalized to {crash_point}");
        }
        crash_point
    }

    fn prefill(&mut self) {
        for _ in 0..self.settings.prefill_rounds {
            let crash_point = self.draw_crash_point();
            self.history.push(crash_point);
        }
        let history = self.history.to_vec();
        let seeded = self
            .synthetic
            .seed_settled(&mut self.rng, &history, PREFILL_BETS);
        // Oldest first so the newest round's bets land on top of the table
        for settled in seeded.into_iter().rev() {
            self.ledger
                .record_settled(settled.request, settled.status, settled.multiplier);
        }
        log::info!("Pre-filled {} rounds of history", self.history.len());
    }

    /// Enter Waiting for a fresh round
    fn begin_round(&mut self, now: f64) {
        self.timers.cancel_all();
        self.round = Round::new(self.round.id + 1);
        self.player_bet = None;

        let starts_at = now + self.settings.timing.waiting_secs;
        self.timers.schedule_phase(starts_at, PhaseAction::Launch);
        self.events.push(RoundEvent::RoundScheduled {
            round: self.round.id,
            starts_at,
        });
        log::info!("Round {} open for bets", self.round.id);
    }

    /// Waiting -> Running
    fn launch(&mut self, now: f64) {
        if self.round.phase != RoundPhase::Waiting {
            log::warn!(
                "Round {}: launch fired while {}",
                self.round.id,
                self.round.phase
            );
            return;
        }

        let crash_point = self.draw_crash_point();
        self.round.crash_point = Some(crash_point);
        self.round.multiplier = 1.0;
        self.round.started_at = Some(now);
        self.round.phase = RoundPhase::Running;

        let spawned = self.synthetic.spawn_for_round(&mut self.rng, self.round.id);
        for request in spawned {
            let amount = request.amount;
            match self
                .ledger
                .place(request, RoundPhase::Running, &mut self.wallet)
            {
                Ok(bet) => self.events.push(RoundEvent::BetPlaced {
                    bet,
                    owner: Owner::Synthetic,
                    amount,
                }),
                Err(e) => log::warn!("Synthetic bet rejected: {e}"),
            }
        }

        self.events.push(RoundEvent::RoundStarted {
            round: self.round.id,
        });
        // A crash point at or below 1.00x busts before any cashout can land
        if crash_point <= 1.0 {
            self.crash(now, crash_point);
            return;
        }
        self.timers
            .start_ticks(now, self.settings.timing.tick_interval);
        log::info!("Round {} running", self.round.id);
    }

    /// One multiplier step
    fn on_tick(&mut self, now: f64, delta: f64) -> Result<(), TickFault> {
        if self.round.phase != RoundPhase::Running {
            self.timers.cancel_ticks();
            return Ok(());
        }
        if !(delta.is_finite() && delta > 0.0) {
            return Err(TickFault::ClockSkew { delta });
        }
        let delta = delta.min(self.settings.timing.max_tick_delta);

        let crash_point = match self.round.crash_point {
            Some(cp) => cp,
            None => {
                log::warn!("Round {} had no crash point, drawing one", self.round.id);
                let cp = self.draw_crash_point();
                self.round.crash_point = Some(cp);
                cp
            }
        };

        let from = self.round.multiplier;
        let next = self.settings.growth.step(from, delta);
        if !next.is_finite() {
            return Err(TickFault::NonFiniteMultiplier { from });
        }

        let crashing = next >= crash_point;
        self.round.multiplier = if crashing { crash_point } else { next };

        self.settle_auto_cashouts(crash_point);
        if crashing {
            self.crash(now, crash_point);
        } else {
            let multiplier = self.round.multiplier;
            let picked = self
                .synthetic
                .maybe_cashout(&mut self.rng, self.ledger.iter(), multiplier);
            for id in picked {
                if let Err(e) = self.apply_cashout(id, multiplier) {
                    log::debug!("Synthetic cashout skipped: {e}");
                }
            }
        }
        Ok(())
    }

    /// Bets whose auto-cashout target was reached below the crash point
    /// settle at exactly that target.
    fn settle_auto_cashouts(&mut self, crash_point: f64) {
        let multiplier = self.round.multiplier;
        let due: Vec<(BetId, f64)> = self
            .ledger
            .active()
            .filter_map(|b| {
                b.auto_cashout
                    .filter(|&t| t <= multiplier && t < crash_point)
                    .map(|t| (b.id, t))
            })
            .collect();
        for (id, target) in due {
            if let Err(e) = self.apply_cashout(id, target) {
                log::debug!("Auto cashout skipped: {e}");
            }
        }
    }

    fn apply_cashout(&mut self, id: BetId, multiplier: f64) -> Result<Settlement, StateError> {
        let settlement =
            self.ledger
                .cashout(id, multiplier, self.round.phase, &mut self.wallet)?;
        self.events.push(RoundEvent::CashedOut {
            bet: id,
            owner: settlement.owner,
            multiplier,
            payout: settlement.payout,
        });
        Ok(settlement)
    }

    /// Running -> Crashed
    fn crash(&mut self, now: f64, crash_point: f64) {
        self.timers.cancel_ticks();
        self.round.phase = RoundPhase::Crashed;
        self.round.multiplier = crash_point;

        for bet in self.ledger.resolve_crash(crash_point) {
            if bet.is_player() {
                self.events.push(RoundEvent::PlayerBusted {
                    bet: bet.id,
                    crash_point,
                });
            }
        }
        self.history.push(crash_point);
        self.events.push(RoundEvent::Crashed {
            round: self.round.id,
            crash_point,
        });
        self.timers.schedule_phase(
            now + self.settings.timing.crashed_secs,
            PhaseAction::NextRound,
        );
        log::info!("Round {} crashed at {:.2}x", self.round.id, crash_point);
    }

    // === Player commands ===

    fn check_live(&self) -> Result<(), StateError> {
        if self.stopped {
            Err(StateError::Stopped)
        } else if !self.started {
            Err(StateError::NotStarted)
        } else {
            Ok(())
        }
    }

    /// Place the player's bet for the upcoming round (Waiting only)
    pub fn place_bet(
        &mut self,
        amount: f64,
        auto_cashout: Option<f64>,
    ) -> Result<Receipt, CommandError> {
        self.check_live()?;
        let phase = self.round.phase;
        if phase != RoundPhase::Waiting {
            return Err(StateError::BetsClosed { phase }.into());
        }
        if let Some(bet) = self.player_bet {
            return Err(StateError::AlreadyPlaced { bet }.into());
        }
        if let Some(threshold) = auto_cashout {
            if !(threshold.is_finite() && threshold > 1.0) {
                return Err(ValidationError::InvalidAutoCashout { threshold }.into());
            }
        }

        let request = NewBet::player(self.round.id, amount, auto_cashout);
        let bet = self.ledger.place(request, phase, &mut self.wallet)?;
        self.player_bet = Some(bet);
        self.events.push(RoundEvent::BetPlaced {
            bet,
            owner: Owner::Player,
            amount,
        });
        Ok(Receipt {
            bet,
            message: format!("Bet placed: {}", format_money(amount)),
            settlement: None,
        })
    }

    /// Cash out the player's bet at the current multiplier (Running only)
    pub fn cashout(&mut self) -> Result<Receipt, CommandError> {
        self.check_live()?;
        let phase = self.round.phase;
        if phase != RoundPhase::Running {
            return Err(StateError::NotRunning { phase }.into());
        }
        let bet = self.player_bet.ok_or(StateError::NoActiveBet)?;
        let settlement = self.apply_cashout(bet, self.round.multiplier)?;
        Ok(Receipt {
            bet,
            message: format!(
                "Cashed out at {:.2}× for {}",
                settlement.multiplier,
                format_money(settlement.payout)
            ),
            settlement: Some(settlement),
        })
    }

    // === Queries ===

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn multiplier(&self) -> f64 {
        self.round.multiplier
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn balance(&self) -> f64 {
        self.wallet.balance()
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn player_bet(&self) -> Option<&Bet> {
        self.player_bet.and_then(|id| self.ledger.get(id))
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Clock time of the last update
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Banner text: countdown, live multiplier, or crash point
    pub fn status_line(&self) -> String {
        match self.round.phase {
            RoundPhase::Waiting => "STARTING SOON".to_string(),
            RoundPhase::Running => format!("{:.2}×", self.round.multiplier),
            RoundPhase::Crashed => format!("CRASHED @ {:.2}×", self.round.multiplier),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let countdown = match (self.round.phase, self.timers.phase_pending()) {
            (RoundPhase::Waiting, Some((deadline, PhaseAction::Launch))) => {
                Some((deadline - self.now).max(0.0))
            }
            _ => None,
        };
        Snapshot {
            round: self.round.id,
            phase: self.round.phase,
            multiplier: self.round.multiplier,
            crashed: self.round.is_crashed(),
            crash_point: self.round.revealed_crash_point(),
            history: self.history.to_vec(),
            recent_bets: self.ledger.recent(),
            player_bet: self.player_bet().cloned(),
            balance: self.wallet.balance(),
            status_line: self.status_line(),
            countdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BetStatus;
    use rand::RngCore;
    use std::collections::VecDeque;

    const STEP: f64 = 0.01;

    /// Crash points played back in order, then a fixed fallback
    struct Scripted(VecDeque<f64>);

    impl CrashPointSource for Scripted {
        fn next_crash_point(&mut self, _rng: &mut dyn RngCore) -> f64 {
            self.0.pop_front().unwrap_or(2.0)
        }
    }

    fn quiet_settings() -> Settings {
        let mut settings = Settings::default();
        settings.synthetic.min_bets = 0;
        settings.synthetic.max_bets = 0;
        settings
    }

    fn scripted(points: &[f64]) -> RoundEngine {
        let mut engine = RoundEngine::new(quiet_settings(), 42)
            .unwrap()
            .with_crash_source(Box::new(Scripted(points.iter().copied().collect())));
        engine.start(0.0);
        engine
    }

    /// Advance the clock in small steps until `done` or the time limit
    fn run_until(engine: &mut RoundEngine, limit: f64, done: impl Fn(&RoundEngine) -> bool) {
        let start = engine.now();
        let mut i = 1u64;
        while !done(engine) {
            let now = start + i as f64 * STEP;
            assert!(now - start < limit, "condition not reached within {limit}s");
            engine.update(now);
            i += 1;
        }
    }

    fn run_to_phase(engine: &mut RoundEngine, phase: RoundPhase) {
        run_until(engine, 120.0, |e| e.phase() == phase);
    }

    #[test]
    fn test_starts_waiting() {
        let engine = scripted(&[2.0]);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, RoundPhase::Waiting);
        assert_eq!(snap.round, 1);
        assert_eq!(snap.multiplier, 1.0);
        assert_eq!(snap.countdown, Some(3.0));
        assert_eq!(snap.status_line, "STARTING SOON");
        assert!(snap.history.is_empty());
    }

    #[test]
    fn test_commands_before_start() {
        let mut engine = RoundEngine::new(quiet_settings(), 1).unwrap();
        assert_eq!(
            engine.place_bet(10.0, None),
            Err(CommandError::State(StateError::NotStarted))
        );
        engine.update(100.0);
        assert_eq!(engine.round().id, 0);
    }

    #[test]
    fn test_place_bet_while_waiting() {
        let mut engine = scripted(&[2.0]);
        let receipt = engine.place_bet(50.0, None).unwrap();
        assert_eq!(receipt.message, "Bet placed: $50.00");
        assert_eq!(engine.balance(), 950.0);

        let active: Vec<&Bet> = engine.ledger().active().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].owner, Owner::Player);
        assert_eq!(active[0].amount, 50.0);
        assert_eq!(active[0].status, BetStatus::Active);
    }

    #[test]
    fn test_place_bet_rejections() {
        let mut engine = scripted(&[5.0]);
        assert_eq!(
            engine.place_bet(0.0, None).unwrap_err().to_string(),
            "Please enter a valid bet amount"
        );
        assert_eq!(
            engine.place_bet(5000.0, None).unwrap_err().to_string(),
            "Insufficient balance"
        );
        assert!(matches!(
            engine.place_bet(10.0, Some(1.0)),
            Err(CommandError::Validation(ValidationError::InvalidAutoCashout { .. }))
        ));
        assert_eq!(engine.balance(), 1000.0);

        let bet = engine.place_bet(10.0, None).unwrap().bet;
        assert_eq!(
            engine.place_bet(10.0, None),
            Err(CommandError::State(StateError::AlreadyPlaced { bet }))
        );

        run_to_phase(&mut engine, RoundPhase::Running);
        assert!(matches!(
            engine.place_bet(10.0, None),
            Err(CommandError::State(StateError::BetsClosed {
                phase: RoundPhase::Running
            }))
        ));
        assert_eq!(engine.balance(), 990.0);
    }

    #[test]
    fn test_launch_resets_round() {
        let mut engine = scripted(&[4.0]);
        run_to_phase(&mut engine, RoundPhase::Running);
        let snap = engine.snapshot();
        assert!(snap.multiplier >= 1.0 && snap.multiplier < 1.1);
        assert_eq!(snap.crash_point, None);
        assert!(!snap.crashed);
        assert_eq!(snap.countdown, None);
        assert!(engine.round().started_at.is_some());
        assert!(engine.timers.ticking());
    }

    #[test]
    fn test_cashout_at_two() {
        let mut engine = scripted(&[50.0]);
        engine.place_bet(50.0, None).unwrap();
        run_to_phase(&mut engine, RoundPhase::Running);

        engine.round.multiplier = 2.0;
        let receipt = engine.cashout().unwrap();
        assert_eq!(receipt.message, "Cashed out at 2.00× for $100.00");

        let bet = engine.player_bet().unwrap().clone();
        assert_eq!(bet.status, BetStatus::Won);
        assert_eq!(bet.profit, Some(50.0));
        assert_eq!(bet.resolved_multiplier, Some(2.0));
        assert_eq!(engine.balance(), 1050.0);

        // Second cashout is a no-op
        engine.round.multiplier = 3.0;
        assert_eq!(
            engine.cashout(),
            Err(CommandError::State(StateError::NotActive { bet: bet.id }))
        );
        assert_eq!(engine.player_bet().unwrap(), &bet);
        assert_eq!(engine.balance(), 1050.0);

        // A won bet is untouched by the crash
        run_to_phase(&mut engine, RoundPhase::Crashed);
        assert_eq!(engine.player_bet().unwrap(), &bet);
        assert_eq!(engine.balance(), 1050.0);
    }

    #[test]
    fn test_crash_without_cashout() {
        let mut engine = scripted(&[3.45]);
        engine.place_bet(50.0, None).unwrap();
        run_to_phase(&mut engine, RoundPhase::Running);

        let start = engine.now();
        let mut last = engine.multiplier();
        let mut i = 1u64;
        while engine.phase() == RoundPhase::Running {
            engine.update(start + i as f64 * STEP);
            assert!(engine.multiplier() >= last);
            assert!(engine.multiplier() <= 3.45);
            last = engine.multiplier();
            i += 1;
        }

        assert_eq!(engine.multiplier(), 3.45);
        let bet = engine.player_bet().unwrap().clone();
        assert_eq!(bet.status, BetStatus::Lost);
        assert_eq!(bet.profit, Some(-50.0));
        assert_eq!(bet.resolved_multiplier, Some(3.45));
        assert_eq!(engine.balance(), 950.0);

        let snap = engine.snapshot();
        assert!(snap.crashed);
        assert_eq!(snap.crash_point, Some(3.45));
        assert_eq!(snap.history, vec![3.45]);
        assert_eq!(snap.status_line, "CRASHED @ 3.45×");
        assert!(!engine.timers.ticking());

        let events = engine.drain_events();
        assert!(events.contains(&RoundEvent::PlayerBusted {
            bet: bet.id,
            crash_point: 3.45
        }));
        assert!(events.contains(&RoundEvent::Crashed {
            round: 1,
            crash_point: 3.45
        }));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_cashout_outside_running() {
        let mut engine = scripted(&[1.5]);
        assert!(matches!(
            engine.cashout(),
            Err(CommandError::State(StateError::NotRunning {
                phase: RoundPhase::Waiting
            }))
        ));
        run_to_phase(&mut engine, RoundPhase::Running);
        assert_eq!(
            engine.cashout(),
            Err(CommandError::State(StateError::NoActiveBet))
        );
        run_to_phase(&mut engine, RoundPhase::Crashed);
        assert!(matches!(
            engine.cashout(),
            Err(CommandError::State(StateError::NotRunning { .. }))
        ));
    }

    #[test]
    fn test_history_after_five_rounds() {
        let points = [1.5, 2.0, 1.2, 3.0, 1.1];
        let mut engine = scripted(&points);
        run_until(&mut engine, 200.0, |e| e.history().len() == 5);
        assert_eq!(engine.history().to_vec(), points.to_vec());
        assert_eq!(engine.history().last(), Some(1.1));
        assert_eq!(engine.round().id, 5);
    }

    #[test]
    fn test_next_round_after_crash_delay() {
        let mut engine = scripted(&[1.3, 2.0]);
        run_to_phase(&mut engine, RoundPhase::Crashed);
        let crashed_at = engine.now();
        run_to_phase(&mut engine, RoundPhase::Waiting);
        assert!(engine.now() - crashed_at >= 3.0 - 1e-9);
        assert_eq!(engine.round().id, 2);
        assert_eq!(engine.round().crash_point, None);
        assert!(engine.player_bet().is_none());
        assert!(!engine.timers.ticking());
        assert!(matches!(
            engine.timers.phase_pending(),
            Some((_, PhaseAction::Launch))
        ));
    }

    #[test]
    fn test_auto_cashout_settles_at_target() {
        let mut engine = scripted(&[3.0]);
        engine.place_bet(50.0, Some(1.5)).unwrap();
        run_to_phase(&mut engine, RoundPhase::Crashed);
        let bet = engine.player_bet().unwrap();
        assert_eq!(bet.status, BetStatus::Won);
        assert_eq!(bet.resolved_multiplier, Some(1.5));
        assert_eq!(bet.profit, Some(25.0));
        assert_eq!(engine.balance(), 1025.0);
    }

    #[test]
    fn test_auto_cashout_above_crash_loses() {
        let mut engine = scripted(&[1.4]);
        engine.place_bet(50.0, Some(1.4)).unwrap();
        run_to_phase(&mut engine, RoundPhase::Crashed);
        let bet = engine.player_bet().unwrap();
        assert_eq!(bet.status, BetStatus::Lost);
        assert_eq!(engine.balance(), 950.0);
    }

    #[test]
    fn test_instant_bust() {
        let mut engine = scripted(&[0.95]);
        engine.place_bet(20.0, None).unwrap();

        // Launch and crash land in the same update; no window to cash out
        engine.update(3.0);
        assert_eq!(engine.phase(), RoundPhase::Crashed);
        assert!(matches!(
            engine.cashout(),
            Err(CommandError::State(StateError::NotRunning {
                phase: RoundPhase::Crashed
            }))
        ));
        assert_eq!(engine.multiplier(), 0.95);
        assert_eq!(engine.player_bet().unwrap().status, BetStatus::Lost);
        assert_eq!(engine.balance(), 980.0);
        assert!(!engine.timers.ticking());
        assert_eq!(engine.history().to_vec(), vec![0.95]);
    }

    #[test]
    fn test_multiplier_never_exceeds_low_crash_point() {
        let mut engine = scripted(&[1.0]);
        engine.place_bet(20.0, None).unwrap();
        engine.update(3.0);
        assert_eq!(engine.phase(), RoundPhase::Crashed);
        assert_eq!(engine.multiplier(), 1.0);
        assert_eq!(engine.player_bet().unwrap().status, BetStatus::Lost);

        // Next round plays normally
        run_to_phase(&mut engine, RoundPhase::Running);
        assert!(engine.timers.ticking());
    }

    #[test]
    fn test_out_of_range_source_is_clamped() {
        let mut engine = scripted(&[250.0]);
        run_to_phase(&mut engine, RoundPhase::Running);
        assert_eq!(engine.round().crash_point, Some(100.0));
    }

    #[test]
    fn test_stop_cancels_everything() {
        let mut engine = scripted(&[5.0]);
        engine.place_bet(10.0, None).unwrap();
        run_to_phase(&mut engine, RoundPhase::Running);
        engine.stop();
        assert!(engine.timers.is_idle());

        let before = engine.snapshot();
        engine.update(engine.now() + 100.0);
        assert_eq!(engine.snapshot(), before);
        assert_eq!(
            engine.cashout(),
            Err(CommandError::State(StateError::Stopped))
        );
        engine.start(0.0);
        assert!(engine.timers.is_idle());
    }

    #[test]
    fn test_tick_fault_does_not_stop_loop() {
        let mut engine = scripted(&[5.0]);
        run_to_phase(&mut engine, RoundPhase::Running);

        engine.round.multiplier = f64::INFINITY;
        let now = engine.now();
        assert!(matches!(
            engine.on_tick(now, 0.05),
            Err(TickFault::NonFiniteMultiplier { .. })
        ));
        assert!(matches!(
            engine.on_tick(now, 0.0),
            Err(TickFault::ClockSkew { .. })
        ));
        assert_eq!(engine.phase(), RoundPhase::Running);

        // Next tick recovers and the round still crashes normally
        engine.round.multiplier = 1.0;
        engine.update(now + 1.0);
        assert!(engine.multiplier() > 1.0);
        run_to_phase(&mut engine, RoundPhase::Crashed);
        assert_eq!(engine.multiplier(), 5.0);
    }

    #[test]
    fn test_late_update_crashes_cleanly() {
        let mut engine = scripted(&[1.8]);
        engine.update(3.0);
        assert_eq!(engine.phase(), RoundPhase::Running);
        // A long stall integrates at most max_tick_delta per tick
        engine.update(30.0);
        assert_eq!(engine.phase(), RoundPhase::Running);
        assert_eq!(engine.multiplier(), 1.5);
        engine.update(31.0);
        assert_eq!(engine.phase(), RoundPhase::Crashed);
        assert_eq!(engine.multiplier(), 1.8);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_synthetic_bets_join_and_settle() {
        let mut engine = RoundEngine::new(Settings::default(), 7)
            .unwrap()
            .with_crash_source(Box::new(Scripted(VecDeque::from(vec![4.0]))));
        engine.start(0.0);
        run_to_phase(&mut engine, RoundPhase::Running);
        let joined = engine.ledger().active().count();
        assert!((2..=5).contains(&joined));
        assert!(engine.ledger().active().all(|b| b.owner == Owner::Synthetic));

        run_to_phase(&mut engine, RoundPhase::Crashed);
        assert_eq!(engine.ledger().active().count(), 0);
        for bet in engine.ledger().iter() {
            match bet.status {
                BetStatus::Won => {
                    let m = bet.resolved_multiplier.unwrap();
                    assert!(m < 4.0);
                    assert_eq!(bet.profit, Some(bet.amount * (m - 1.0)));
                }
                BetStatus::Lost => assert_eq!(bet.profit, Some(-bet.amount)),
                BetStatus::Active => unreachable!(),
            }
        }
        // Synthetic bets never touch the player's wallet
        assert_eq!(engine.balance(), 1000.0);
    }

    #[test]
    fn test_prefill() {
        let mut settings = quiet_settings();
        settings.prefill_rounds = 5;
        let mut engine = RoundEngine::new(settings, 9).unwrap();
        engine.start(0.0);
        assert_eq!(engine.history().len(), 5);
        assert_eq!(engine.ledger().len(), PREFILL_BETS);
        assert_eq!(engine.ledger().active().count(), 0);
        assert_eq!(engine.round().id, 1);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let run = |seed| {
            let mut engine = RoundEngine::new(Settings::default(), seed).unwrap();
            engine.start(0.0);
            run_until(&mut engine, 400.0, |e| e.history().len() == 3);
            serde_json::to_string(&engine.snapshot()).unwrap()
        };
        assert_eq!(run(1234), run(1234));
    }
}
