#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Deck Defence with a scripted autopilot.

mod autopilot;
mod logging;
mod text_backend;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use deck_defence_core::SessionPhase;
use deck_defence_rendering::{cues_for_tick, RenderingBackend, Scene};
use deck_defence_session::{
    JsonBestWaveStore, SessionConfig, SessionController, SimulationClock,
};
use deck_defence_world::query;

use crate::{autopilot::Autopilot, text_backend::TextBackend};

/// Headless tower-defence session driven by an autopilot
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file overriding the default tuning
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON file holding the best wave reached
    #[arg(long, default_value = "scores.json")]
    scores: PathBuf,
    /// Waves to play before stopping
    #[arg(long, default_value_t = 10)]
    waves: u32,
    /// Seed for the wave order shuffle, overriding the config
    #[arg(long)]
    seed: Option<u64>,
    /// Advance with the background clock at the configured tick period
    #[arg(long)]
    realtime: bool,
    /// Colour the board with ANSI escape codes
    #[arg(long)]
    color: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Deck Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }

    let store = Arc::new(JsonBestWaveStore::new(&args.scores));
    let controller = SessionController::new(&config, store);
    let (mut autopilot, banner) = controller.inspect(|session| {
        let world = session.world();
        (Autopilot::new(query::path(world)), query::welcome_banner(world))
    });
    let mut backend = TextBackend::new(std::io::stdout(), args.color);

    println!("{banner}");
    if args.realtime {
        play_realtime(
            &controller,
            &mut autopilot,
            &mut backend,
            args.waves,
            config.tick_period(),
        )?;
    } else {
        play_headless(&controller, &mut autopilot, &mut backend, args.waves)?;
    }

    let hud = controller.hud();
    println!(
        "finished on wave {} with {} lives; best wave {}",
        hud.wave_number,
        hud.lives,
        controller.best_wave()
    );
    Ok(())
}

fn present(controller: &SessionController, backend: &mut impl RenderingBackend) -> Result<()> {
    let events = controller.drain_events();
    let scene = Scene::from_snapshot(&controller.snapshot());
    backend.present(&scene, &cues_for_tick(&events))
}

fn begin_wave(controller: &SessionController, autopilot: &mut Autopilot) -> Result<u32> {
    let purchases = autopilot.shop(controller);
    let wave = controller
        .start_wave()
        .context("autopilot could not start the next wave")?;
    log::info!("autopilot made {purchases} purchases before wave {wave}");
    Ok(wave)
}

fn play_headless(
    controller: &SessionController,
    autopilot: &mut Autopilot,
    backend: &mut impl RenderingBackend,
    waves: u32,
) -> Result<()> {
    for _ in 0..waves {
        let _ = begin_wave(controller, autopilot)?;
        loop {
            let _ = controller.tick()?;
            if controller.hud().phase != SessionPhase::WaveInProgress {
                break;
            }
        }
        present(controller, backend)?;
        if controller.hud().phase == SessionPhase::GameOver {
            break;
        }
    }
    Ok(())
}

fn play_realtime(
    controller: &SessionController,
    autopilot: &mut Autopilot,
    backend: &mut impl RenderingBackend,
    waves: u32,
    period: Duration,
) -> Result<()> {
    if waves == 0 {
        return Ok(());
    }
    let mut started = begin_wave(controller, autopilot)?;
    let (clock, reports) = SimulationClock::start(controller.clone(), period)
        .context("failed to start the simulation clock")?;

    for _report in reports.iter() {
        present(controller, backend)?;
        match controller.hud().phase {
            SessionPhase::WaveInProgress => {}
            SessionPhase::GameOver => break,
            SessionPhase::Idle if started >= waves => break,
            SessionPhase::Idle => started = begin_wave(controller, autopilot)?,
        }
    }

    clock.stop();
    Ok(())
}
