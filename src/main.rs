//! Sparring - Entry Point
//!
//! Runs a scripted sparring partner against the combat core. The partner
//! watches the presentation events, moves its arms, and the resulting poses
//! are fed through the async runtime exactly as camera frames would be.

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sparring::combat::{PatternSelector, PresentationEvent, PresentationSink};
use sparring::core::config::{load_config, CombatConfig, DEFAULT_CONFIG_PATH};
use sparring::core::error::Result;
use sparring::runtime::{spawn_match, FrameTick, SparringPartner};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const FRAME_RATE: f64 = 60.0;
/// Wall-clock pause between frames; the match clock runs ahead of real time
const FRAME_PACING: Duration = Duration::from_millis(2);
const PIXELS_PER_INCH: f32 = 4.0;
/// Match clock allowed per requested turn before giving up
const MAX_SECONDS_PER_TURN: f64 = 10.0;

/// Sparring - scripted partner against the combat core
#[derive(Parser, Debug)]
#[command(name = "sparring")]
#[command(about = "Run a scripted sparring partner against the combat core")]
struct Args {
    /// Combat config (TOML); built-in defaults are used if the file is missing
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Random seed for deterministic turn selection
    #[arg(long)]
    seed: Option<u64>,

    /// Number of turns to play
    #[arg(long, default_value_t = 10)]
    turns: u32,

    /// Chance (0-1) that the partner answers a turn correctly
    #[arg(long, default_value_t = 0.8)]
    accuracy: f64,

    /// Print events and the summary as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct EventRecord<'a> {
    at: f64,
    #[serde(flatten)]
    event: &'a PresentationEvent,
}

#[derive(Debug, Serialize)]
struct MatchSummary {
    seed: u64,
    turns: u32,
    best_combo: u32,
    final_combo: u32,
    player_health: f32,
    player_knockdowns: u32,
    opponent_health: f32,
    opponent_knockdowns: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sparring=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        tracing::warn!(
            "Config {} not found - using built-in defaults",
            args.config.display()
        );
        CombatConfig::default()
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(
        "Sparring starting: seed {}, {} turns, accuracy {:.2}",
        seed,
        args.turns,
        args.accuracy
    );

    let rt = Runtime::new()?;
    let summary = rt.block_on(run_match(config, seed, &args))?;

    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!();
        println!("=== MATCH SUMMARY ===");
        println!("Turns played:   {}", summary.turns);
        println!("Best combo:     {}", summary.best_combo);
        println!(
            "Player:         {:.0} health, knocked down {} times",
            summary.player_health, summary.player_knockdowns
        );
        println!(
            "Opponent:       {:.0} health, knocked down {} times",
            summary.opponent_health, summary.opponent_knockdowns
        );
    }

    Ok(())
}

async fn run_match(config: CombatConfig, seed: u64, args: &Args) -> Result<MatchSummary> {
    let selector = PatternSelector::new(ChaCha8Rng::seed_from_u64(seed), config.turns.clone());
    let mut partner = SparringPartner::new(
        ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
        args.accuracy,
        PIXELS_PER_INCH,
    );

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let sink = channel_sink(events_tx);

    let first = FrameTick {
        at: 0.0,
        pose: partner.pose(0.0),
    };
    let handle = spawn_match(config, selector, sink, first)?;

    let mut pacing = tokio::time::interval(FRAME_PACING);
    let mut best_combo = 0;
    let max_frames = (args.turns as f64 * MAX_SECONDS_PER_TURN * FRAME_RATE) as u64;
    let mut now = 0.0;

    for frame in 1..=max_frames {
        pacing.tick().await;
        now = frame as f64 / FRAME_RATE;

        while let Ok(event) = events_rx.try_recv() {
            if let PresentationEvent::ComboChanged { combo, .. } = event {
                best_combo = best_combo.max(combo);
            }
            report(&event, now, args.json)?;
            partner.react(&event, now);
        }

        if handle.status().turns_played >= args.turns {
            break;
        }
        handle.push_frame(FrameTick {
            at: now,
            pose: partner.pose(now),
        });
    }

    let battle = handle.shutdown().await?;
    while let Ok(event) = events_rx.try_recv() {
        report(&event, now, args.json)?;
    }

    let state = battle.state();
    Ok(MatchSummary {
        seed,
        turns: state.turns_played,
        best_combo,
        final_combo: state.combo,
        player_health: state.player.health,
        player_knockdowns: state.player.defeats,
        opponent_health: state.opponent.health,
        opponent_knockdowns: state.opponent.defeats,
    })
}

/// Forward presentation events to the reporting loop
fn channel_sink(events: mpsc::UnboundedSender<PresentationEvent>) -> impl PresentationSink {
    move |event: PresentationEvent| {
        if events.send(event).is_err() {
            tracing::debug!("Event reporter gone, dropping presentation event");
        }
    }
}

fn report(event: &PresentationEvent, at: f64, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&EventRecord { at, event })?);
    } else {
        println!("[{:>7.2}s] {}", at, describe(event));
    }
    Ok(())
}

fn describe(event: &PresentationEvent) -> String {
    match event {
        PresentationEvent::ShowAttackPath { path, duration } => {
            format!("Throw a {} ({:.1}s)", path.name(), duration)
        }
        PresentationEvent::HideAttackPath { path } => format!("Hide {} indicator", path.name()),
        PresentationEvent::HideFinisherHalf { hand } => {
            format!("Finisher {} half landed", hand.name())
        }
        PresentationEvent::HideAllAttackPaths => "Clear attack indicators".to_string(),
        PresentationEvent::ShowIncomingAttack { attack, duration } => {
            format!("Incoming {} attack in {:.1}s", attack.name(), duration)
        }
        PresentationEvent::HideIncomingAttack { attack } => {
            format!("{} attack arrives", attack.name())
        }
        PresentationEvent::ComboChanged { combo, success } => {
            if *success {
                format!("Combo x{}", combo)
            } else {
                "Combo broken".to_string()
            }
        }
        PresentationEvent::HealthChanged { side, health, max } => {
            format!("{:?} health {:.0}/{:.0}", side, health, max)
        }
        PresentationEvent::Defeated { side } => format!("{:?} knocked down!", side),
        PresentationEvent::PlaySound { cue } => format!("Sound: {}", cue.name()),
        PresentationEvent::PlayParticle { cue } => format!("Effect: {}", cue.name()),
        PresentationEvent::JabMarker { hand, position, .. } => format!(
            "{} jab at ({:.0}, {:.0})",
            hand.name(),
            position.x,
            position.y
        ),
    }
}
