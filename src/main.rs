//! Crash Sim entry point
//!
//! Headless demo driver: runs the round engine on a simulated 60 Hz clock,
//! bets $50 with a 2.00x auto-cashout every round, renders a frame at each
//! crash and prints the final snapshot as JSON.
//!
//! Usage: `crash-sim [settings.json] [--rounds N] [--seed S]`

use std::path::PathBuf;
use std::process::ExitCode;

use crash_sim::renderer::{RenderInput, Viewport, render, vertex_bytes};
use crash_sim::sim::{CurveDataset, EngineError, Owner, RoundEngine, RoundEvent, RoundPhase};
use crash_sim::{Settings, SettingsError, format_money};

const DEMO_BET: f64 = 50.0;
const DEMO_AUTO_CASHOUT: f64 = 2.0;
const DEMO_ROUNDS: u64 = 10;
const DEMO_PREFILL: usize = 5;
const FRAME_RATE: f64 = 60.0;
const VIEWPORT: (f32, f32) = (800.0, 600.0);

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("{0}\nusage: crash-sim [settings.json] [--rounds N] [--seed S]")]
    Usage(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to encode snapshot")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
struct Args {
    settings: Option<PathBuf>,
    rounds: u64,
    seed: Option<u64>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, DemoError> {
    let mut parsed = Args {
        settings: None,
        rounds: DEMO_ROUNDS,
        seed: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--rounds" | "--seed" => {
                let value = args
                    .next()
                    .ok_or_else(|| DemoError::Usage(format!("{arg} needs a value")))?;
                let number: u64 = value
                    .parse()
                    .map_err(|_| DemoError::Usage(format!("{arg}: not a number: {value}")))?;
                if arg == "--rounds" {
                    parsed.rounds = number;
                } else {
                    parsed.seed = Some(number);
                }
            }
            flag if flag.starts_with("--") => {
                return Err(DemoError::Usage(format!("unknown option {flag}")));
            }
            path => parsed.settings = Some(PathBuf::from(path)),
        }
    }
    Ok(parsed)
}

fn run(args: Args) -> Result<(), DemoError> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings {
            prefill_rounds: DEMO_PREFILL,
            ..Settings::default()
        },
    };
    let render_settings = settings.render.clone();
    let viewport = Viewport::new(VIEWPORT.0, VIEWPORT.1).with_padding(render_settings.padding);
    let dataset = CurveDataset::reference();

    let mut engine = match args.seed {
        Some(seed) => RoundEngine::new(settings, seed)?,
        None => RoundEngine::from_entropy(settings)?,
    };
    log::info!(
        "Crash Sim starting: {} rounds, seed {:?}",
        args.rounds,
        args.seed
    );

    engine.start(0.0);
    let step = 1.0 / FRAME_RATE;
    let mut frame_index: u64 = 0;
    let mut completed = 0;
    let mut bet_round = 0;

    while completed < args.rounds {
        frame_index += 1;
        engine.update(frame_index as f64 * step);

        let round = engine.round().id;
        if engine.phase() == RoundPhase::Waiting && bet_round != round {
            bet_round = round;
            match engine.place_bet(DEMO_BET, Some(DEMO_AUTO_CASHOUT)) {
                Ok(receipt) => log::info!("Round {round}: {}", receipt.message),
                Err(e) => log::warn!("Round {round}: {e}"),
            }
        }

        for event in engine.drain_events() {
            match event {
                RoundEvent::CashedOut {
                    owner: Owner::Player,
                    multiplier,
                    payout,
                    ..
                } => println!(
                    "Cashed out at {:.2}× for {}",
                    multiplier,
                    format_money(payout)
                ),
                RoundEvent::PlayerBusted { crash_point, .. } => {
                    println!("Crashed at {:.2}×!", crash_point)
                }
                RoundEvent::Crashed { round, crash_point } => {
                    completed += 1;
                    let snapshot = engine.snapshot();
                    let input = RenderInput::from_snapshot(&snapshot, &dataset, &render_settings);
                    let frame = render(&input, &viewport);
                    let vertices = frame.tessellate();
                    println!(
                        "round {:>3}  {:>7.2}x  balance {:>10}  frame: {} commands, {} vertex bytes",
                        round,
                        crash_point,
                        format_money(snapshot.balance),
                        frame.commands.len(),
                        vertex_bytes(&vertices).len()
                    );
                }
                _ => {}
            }
        }
    }

    engine.stop();
    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, DemoError> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_defaults() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.rounds, DEMO_ROUNDS);
        assert!(parsed.seed.is_none());
        assert!(parsed.settings.is_none());
    }

    #[test]
    fn test_parse_all_options() {
        let parsed = args(&["tuning.json", "--rounds", "3", "--seed", "42"]).unwrap();
        assert_eq!(parsed.settings, Some(PathBuf::from("tuning.json")));
        assert_eq!(parsed.rounds, 3);
        assert_eq!(parsed.seed, Some(42));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(args(&["--rounds"]), Err(DemoError::Usage(_))));
        assert!(matches!(args(&["--seed", "x"]), Err(DemoError::Usage(_))));
        assert!(matches!(args(&["--fast"]), Err(DemoError::Usage(_))));
    }

    #[test]
    fn test_seeded_run_completes() {
        let parsed = args(&["--rounds", "2", "--seed", "7"]).unwrap();
        assert!(run(parsed).is_ok());
    }
}
