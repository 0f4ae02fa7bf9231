//! Engine-owned timers
//!
//! One slot for the coarse phase timer and one for the 20 Hz multiplier
//! tick. Scheduling into a slot replaces whatever was pending there, so there
//! is never more than one of each and a new round can't leave a stale tick
//! loop running.

/// What the phase timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    /// Waiting -> Running
    Launch,
    /// Crashed -> Waiting of the next round
    NextRound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PhaseTimer {
    deadline: f64,
    action: PhaseAction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TickTimer {
    next: f64,
    last: f64,
    interval: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    phase: Option<PhaseTimer>,
    tick: Option<TickTimer>,
}

impl Timers {
    /// Arm the phase timer, cancelling any pending one
    pub fn schedule_phase(&mut self, deadline: f64, action: PhaseAction) {
        self.phase = Some(PhaseTimer { deadline, action });
    }

    /// Start the tick loop at `now`, cancelling any running one
    pub fn start_ticks(&mut self, now: f64, interval: f64) {
        self.tick = Some(TickTimer {
            next: now + interval,
            last: now,
            interval,
        });
    }

    pub fn cancel_phase(&mut self) {
        self.phase = None;
    }

    pub fn cancel_ticks(&mut self) {
        self.tick = None;
    }

    pub fn cancel_all(&mut self) {
        self.cancel_phase();
        self.cancel_ticks();
    }

    pub fn phase_pending(&self) -> Option<(f64, PhaseAction)> {
        self.phase.map(|t| (t.deadline, t.action))
    }

    pub fn ticking(&self) -> bool {
        self.tick.is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.phase.is_none() && self.tick.is_none()
    }

    /// Take the phase action if its deadline has passed
    pub fn take_due_phase(&mut self, now: f64) -> Option<PhaseAction> {
        match self.phase {
            Some(t) if now >= t.deadline => {
                self.phase = None;
                Some(t.action)
            }
            _ => None,
        }
    }

    /// If a tick is due, re-arm it one interval after `now` and return the
    /// wall time elapsed since the previous tick. A late tick fires once with
    /// the whole gap rather than replaying every missed interval.
    pub fn take_due_tick(&mut self, now: f64) -> Option<f64> {
        let tick = self.tick.as_mut()?;
        if now < tick.next {
            return None;
        }
        let delta = now - tick.last;
        tick.last = now;
        tick.next = now + tick.interval;
        Some(delta)
    }
}
