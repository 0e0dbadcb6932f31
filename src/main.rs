//! Tile Dash - headless runner
//!
//! Plays a scripted run through a level and prints a JSON summary.
//!
//! Usage:
//!   tile-dash --ticks 3600 --seed 7 --level my_level.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use tile_dash::consts::TICKS_PER_SECOND;
use tile_dash::sim::{GameEvent, GamePhase, GameState, InputScript, PowerTier, tick};
use tile_dash::{LevelData, Settings};

#[derive(Parser, Debug)]
#[command(name = "tile-dash")]
#[command(about = "Run the platformer simulation headless and report the outcome")]
struct Args {
    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 3600)]
    ticks: usize,

    /// Seed for random input; omit to walk right and hop
    #[arg(long)]
    seed: Option<u64>,

    /// Physics settings JSON (defaults when omitted or unreadable)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Level layout JSON (built-in first stage when omitted)
    #[arg(long)]
    level: Option<PathBuf>,
}

#[derive(Serialize)]
struct Summary {
    level: String,
    ticks: u64,
    seconds: f32,
    phase: GamePhase,
    score: u64,
    coins: u32,
    lives: u32,
    tier: PowerTier,
    time_left: u32,
    player_x: f32,
    player_y: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    let data = match &args.level {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read level {}", path.display()))?;
            LevelData::from_json(&json)
                .with_context(|| format!("failed to decode level {}", path.display()))?
        }
        None => LevelData::first_stage(),
    };
    let level = data
        .parse()
        .with_context(|| format!("invalid layout in level '{}'", data.name))?;

    let script = match args.seed {
        Some(seed) => {
            log::info!("Random input with seed {}", seed);
            InputScript::random(seed, args.ticks)
        }
        None => InputScript::hold_right_and_hop(args.ticks, 45),
    };

    let mut state = GameState::new(level, settings);
    for input in script.iter() {
        tick(&mut state, input);
        for event in &state.events {
            match event {
                GameEvent::ScoreAwarded { .. } | GameEvent::CoinCollected => {
                    log::debug!("tick {}: {:?}", state.time_ticks, event)
                }
                _ => log::info!("tick {}: {:?}", state.time_ticks, event),
            }
        }
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    let summary = Summary {
        level: state.level().name.clone(),
        ticks: state.time_ticks,
        seconds: state.time_ticks as f32 / TICKS_PER_SECOND as f32,
        phase: state.phase,
        score: state.player.score,
        coins: state.player.coins,
        lives: state.player.lives,
        tier: state.player.tier,
        time_left: state.time_left,
        player_x: state.player.body.pos.x,
        player_y: state.player.body.pos.y,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to encode summary")?
    );

    Ok(())
}
