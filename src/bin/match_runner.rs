//! Headless Match Runner
//!
//! Plays a full match without a UI and prints a summary as JSON or text.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use serde::Serialize;
use squadfall::battle::{Battle, MatchSummary};
use squadfall::core::types::{ControlMode, Side};
use squadfall::core::{SimClock, SimConfig};
use squadfall::events::{EventKind, SimEvent};
use tracing_subscriber::EnvFilter;

const COMBAT_LOG_CAPACITY: usize = 100;

/// Headless Match Runner - play rounds until the player side falls
#[derive(Parser, Debug)]
#[command(name = "match_runner")]
#[command(about = "Run a squadfall match headless and report the result")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many rounds have been started
    #[arg(long, default_value_t = 20)]
    max_rounds: u32,

    /// Stop after this much match time
    #[arg(long, default_value_t = 600.0)]
    max_seconds: f32,

    /// Let the AI spend player skill points too
    #[arg(long)]
    auto_player: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print the last combat log lines after the summary
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct MatchResult {
    seed: Option<u64>,
    finished: bool,
    summary: MatchSummary,
    combat_log: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        tracing::error!(error = %err, "Match runner failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> squadfall::core::Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.auto_player {
        config.control.player = ControlMode::Auto;
    } else if config.control.mode(Side::Player) == ControlMode::Manual
        && config.timing.selection_timeout.is_none()
    {
        // Nobody answers selections in a headless run
        tracing::warn!("Manual player without selection timeout, switching player to auto");
        config.control.player = ControlMode::Auto;
    }
    // One match per run
    config.control.restart_on_defeat = false;

    let seed = config.seed;
    let max_ticks = SimClock::new(config.timing.tick_rate).ticks_for(args.max_seconds);
    let mut battle = Battle::with_arena(config)?;

    let combat_log = Rc::new(RefCell::new(VecDeque::with_capacity(COMBAT_LOG_CAPACITY)));
    let sink = Rc::clone(&combat_log);
    let subscriptions = battle.bus_mut().subscribe_many(
        &[EventKind::UnitDeath, EventKind::RoundCompleted, EventKind::UnitLeveledUp],
        move |event: &SimEvent| {
            let mut log = sink.borrow_mut();
            if log.len() == COMBAT_LOG_CAPACITY {
                log.pop_front();
            }
            log.push_back(describe(event));
        },
    );

    battle.start();
    let max_rounds = args.max_rounds;
    let finished = battle.run_until(max_ticks, |b| {
        b.is_game_over() || b.round_number() > max_rounds
    });
    subscriptions.release(battle.bus_mut());

    let summary = MatchSummary::capture(&battle);
    let combat_log: Vec<String> = combat_log.borrow().iter().cloned().collect();
    let result = MatchResult {
        seed,
        finished,
        summary,
        combat_log,
    };

    match args.format.as_str() {
        "text" => print_text(&result, args.verbose),
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

fn describe(event: &SimEvent) -> String {
    match event {
        SimEvent::UnitDeath { victim, killer } => match killer {
            Some(killer) => format!("{} was slain by {}", victim, killer),
            None => format!("{} died", victim),
        },
        SimEvent::RoundCompleted { round, outcome } => match outcome.winner() {
            Some(side) => format!("Round {} won by {}", round, side.name()),
            None => format!("Round {} ended with both sides wiped out", round),
        },
        SimEvent::UnitLeveledUp {
            unit,
            new_level,
            skill_points,
            ..
        } => format!("{} reached level {} ({} points)", unit, new_level, skill_points),
        other => format!("{:?}", other),
    }
}

fn print_text(result: &MatchResult, verbose: bool) {
    let summary = &result.summary;
    println!("Match Result");
    println!("============");
    println!("Rounds won: {}", summary.rounds_won);
    println!("Last round: {} ({:?})", summary.round, summary.round_status);
    println!("Game over: {}", summary.game_over);
    println!("Match time: {:.1}s ({} ticks)", summary.elapsed_seconds, summary.ticks);
    println!("Experience awarded: {}", summary.experience_awarded);
    println!();
    for side in Side::ALL {
        println!("{} ({} alive)", side.name(), summary.living(side));
        for unit in summary.units.iter().filter(|u| u.side == side) {
            println!(
                "  {} {:<12} lvl {:>3}  hp {:>6.1}/{:<6.1} {:?}",
                unit.id, unit.name, unit.level, unit.health, unit.max_health, unit.ranks
            );
        }
    }
    if verbose {
        println!();
        for line in &result.combat_log {
            println!("  {}", line);
        }
    }
    if let Some(seed) = result.seed {
        println!();
        println!("Seed: {}", seed);
    }
}
