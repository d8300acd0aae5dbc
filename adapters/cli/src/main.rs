#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Bubble Shooter headless.
//!
//! A seeded autoplayer drives the same aim and release entry points an
//! interactive frontend would, and every presentation call is logged.

mod autoplay;
mod best_scores;
mod console;

use std::{
    fs,
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use bubble_shooter_core::{Event, GameConfig};
use bubble_shooter_rendering::{dispatch, Palette};
use bubble_shooter_system_orchestrator::Orchestrator;
use bubble_shooter_world::query;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{autoplay::Autoplayer, best_scores::BestScores, console::ConsolePresentation};

/// Command-line arguments for the headless session.
#[derive(Debug, Parser)]
#[command(name = "bubble-shooter", about = "Plays a seeded Bubble Shooter session")]
struct CliArgs {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for the level fill and the autoplayer.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Frames simulated before giving up.
    #[arg(long, default_value_t = 20_000)]
    max_frames: u32,
    /// Simulated frame duration in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
    /// Best score file; defaults to the local data directory.
    #[arg(long, value_name = "PATH")]
    scores: Option<PathBuf>,
}

/// Entry point for the Bubble Shooter command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_ref())?;

    let scores_path = args.scores.clone().or_else(BestScores::default_path);
    let scores = match &scores_path {
        Some(path) => BestScores::load(path)?,
        None => {
            warn!("no data directory available, best scores stay in memory");
            BestScores::default()
        }
    };

    let mut session = Orchestrator::new(config).context("invalid configuration")?;
    let palette = Palette::default();
    let mut presentation = ConsolePresentation::new(scores, scores_path);
    let mut player = Autoplayer::new(args.seed);
    let frame = Duration::from_millis(args.frame_ms);

    let mut events = Vec::new();
    session.start(args.seed, &mut events);
    present(&events, &palette, &mut presentation);

    let mut frames = 0;
    while session.outcome().is_none() && frames < args.max_frames {
        events.clear();
        if session.ready_to_fire() {
            let pointer = player.next_pull(&query::config(session.world()).launcher);
            session.aim(pointer, &mut events);
            session.release(&mut events);
        }
        session.tick(frame, &mut events);
        present(&events, &palette, &mut presentation);
        frames += 1;
    }

    match presentation.finished() {
        Some(won) => info!(
            won,
            frames,
            score = presentation.score(),
            best = ?presentation.best_score(),
            "session finished"
        ),
        None => info!(
            frames,
            score = presentation.score(),
            remaining = presentation.remaining(),
            "frame limit reached"
        ),
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    GameConfig::from_toml_str(&source)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

fn present(events: &[Event], palette: &Palette, presentation: &mut ConsolePresentation) {
    if let Err(error) = dispatch(events, palette, unix_timestamp(), presentation) {
        warn!("{error:#}");
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
