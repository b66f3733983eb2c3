//! Squadron headless runner
//!
//! Drives the simulation with a scripted pilot at a variable frame rate and
//! prints the run statistics. Usage:
//!
//! `squadron [--seed N] [--seconds S] [--settings PATH] [--quality low|medium|high] [--debug]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use squadron::consts::{MAX_SUBSTEPS, SIM_DT};
use squadron::renderer::{BillboardBatch, Camera};
use squadron::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use squadron::{AssetRegistry, QualityPreset, Settings};

/// Host frame time; deliberately off the simulation rate
const FRAME_DT: f32 = 1.0 / 50.0;

#[derive(Parser, Debug)]
#[command(name = "squadron")]
#[command(about = "Headless squadron simulation runner")]
#[command(version)]
struct Args {
    /// Random seed for the run
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,

    /// Simulated host time in seconds
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Settings JSON file (defaults when missing)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Particle quality preset (low, medium, high)
    #[arg(long, value_parser = parse_quality)]
    quality: Option<QualityPreset>,

    /// Report tested bounding boxes
    #[arg(long)]
    debug: bool,
}

fn parse_quality(value: &str) -> Result<QualityPreset, String> {
    QualityPreset::parse(value).ok_or_else(|| format!("unknown preset: {value}"))
}

/// Fixed-step driver fed by variable host frames
struct Runner {
    state: GameState,
    input: TickInput,
    accumulator: f32,
    frame: u32,
}

impl Runner {
    fn new(state: GameState) -> Self {
        Self {
            state,
            input: TickInput::default(),
            accumulator: 0.0,
            frame: 0,
        }
    }

    /// Sweep side to side and keep the trigger down
    fn pilot(&mut self) {
        let phase = (self.frame / 90) % 2;
        self.input = TickInput {
            left: phase == 0,
            right: phase == 1,
            fire: true,
            ..Default::default()
        };
    }

    fn update(&mut self, dt: f32) {
        self.pilot();
        self.frame += 1;
        self.accumulator += dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            for event in &self.state.events {
                match event {
                    GameEvent::LevelStarted { level } => log::info!("Entering level {}", level + 1),
                    GameEvent::UnitDestroyed { .. } => log::debug!("Unit down at {:.2}s", self.state.time),
                    _ => {}
                }
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Squadron (headless) starting...");

    let options = Args::parse();

    let mut settings = match &options.settings {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    if let Some(quality) = options.quality {
        settings.quality = quality;
    }
    settings.debug_boxes |= options.debug;

    let assets = AssetRegistry::with_defaults();
    let state = match GameState::new(&assets, settings, options.seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Cannot start: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Game initialized with seed: {}", options.seed);

    let mut runner = Runner::new(state);
    let camera = Camera::default();
    let mut batch = BillboardBatch::new();
    let frames = (options.seconds / FRAME_DT).ceil() as u32;
    let mut peak_particles = 0;
    for _ in 0..frames {
        runner.update(FRAME_DT);
        batch.clear();
        runner.state.draw_particles(&camera, &mut batch);
        peak_particles = peak_particles.max(batch.len());
        if options.debug && runner.frame % 50 == 0 {
            log::debug!(
                "{} boxes tested, {} bullets, {} units",
                runner.state.debug_boxes.len(),
                runner.state.bullets.len(),
                runner.state.units.len()
            );
        }
        if runner.state.phase == GamePhase::GameOver {
            break;
        }
    }

    let state = &runner.state;
    let snap = state.snapshot();
    println!("time      {:.1}s ({} ticks)", state.time, state.time_ticks);
    println!("level     {}", state.level.level + 1);
    println!("hits      {}", snap.hits);
    println!("misses    {}", snap.misses);
    println!("score     {}", snap.score);
    println!("health    {}", state.player.vitals.health);
    println!("particles {} (peak)", peak_particles);
    if state.phase == GamePhase::GameOver {
        println!("GAME OVER");
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["squadron"]).unwrap();
        assert_eq!(args.seed, 0x5EED);
        assert_eq!(args.seconds, 60.0);
        assert!(args.settings.is_none());
        assert!(args.quality.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_args_flags() {
        let args = Args::try_parse_from([
            "squadron", "--seed", "42", "--seconds", "5", "--quality", "HIGH", "--debug",
        ])
        .unwrap();
        assert_eq!(args.seed, 42);
        assert_eq!(args.seconds, 5.0);
        assert_eq!(args.quality, Some(QualityPreset::High));
        assert!(args.debug);
    }

    #[test]
    fn test_args_rejects_unknown_preset() {
        assert!(Args::try_parse_from(["squadron", "--quality", "ultra"]).is_err());
        assert!(Args::try_parse_from(["squadron", "--bogus"]).is_err());
    }
}
