//! Round simulation module
//!
//! All gameplay logic lives here. Randomness only enters through an explicit
//! `Rng` argument (seeded `Pcg32` in the engine) and time only through the
//! `now` passed to [`RoundEngine::update`], so every round can be replayed.
//! No rendering or platform dependencies.

pub mod crash_point;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod growth;
pub mod ledger;
pub mod state;
pub mod synthetic;
pub mod timers;

pub use crash_point::{CrashPointGenerator, CrashPointSource};
pub use dataset::{CurveDataset, CurveSample};
pub use engine::{Receipt, RoundEngine, Snapshot};
pub use error::{CommandError, EngineError, StateError, TickFault, ValidationError};
pub use growth::GrowthLaw;
pub use ledger::{BetLedger, Settlement};
pub use state::{Bet, BetId, BetStatus, NewBet, Owner, Round, RoundEvent, RoundPhase, Wallet};
pub use synthetic::SyntheticParticipants;
pub use timers::{PhaseAction, Timers};
