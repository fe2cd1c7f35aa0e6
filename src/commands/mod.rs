use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Parser, Subcommand};
use maskhunt::{AbilityKind, Direction, Event, TickResult};
use tracing_subscriber::EnvFilter;

mod level;
mod play;

use level::run_check;
use play::{PlayOptions, run_play};

#[derive(Parser)]
#[command(
    name = "maskhunt",
    version,
    about = "Tick-based grid survival: outlast the masked pursuers",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a headless session and print every tick
    Play {
        /// Config file (defaults to maskhunt.toml when present)
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
        /// Level map; overrides [level].path
        #[arg(short = 'l', long)]
        level: Option<PathBuf>,
        /// Starting ability of the controlled actor
        #[arg(long, value_enum)]
        ability: Option<AbilityKind>,
        /// RNG seed for pursuer moves; overrides [session].seed
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many ticks (defaults to the survival target)
        #[arg(short = 't', long)]
        ticks: Option<u64>,
        /// Simulated frame length fed to the clock, in milliseconds
        #[arg(long, default_value_t = 100)]
        frame_ms: u64,
        /// Key groups per tick, comma separated, e.g. "wa,d,,s"
        #[arg(short = 's', long, default_value = "")]
        script: ScriptArg,
        /// Sleep for each frame instead of running as fast as possible
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        realtime: bool,
        /// Print only the final world snapshot as JSON
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        json: bool,
    },
    /// Parse a level map and summarize it
    Check {
        #[arg(short = 'l', long)]
        level: PathBuf,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        origin_x: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        origin_y: i32,
    },
}

/// Scripted input: one group of `w a s d` presses per tick.
#[derive(Clone, Debug, Default)]
pub struct ScriptArg(pub Vec<Vec<Direction>>);

impl ScriptArg {
    pub fn group(&self, tick: u64) -> &[Direction] {
        usize::try_from(tick.saturating_sub(1))
            .ok()
            .and_then(|idx| self.0.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl FromStr for ScriptArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(ScriptArg::default());
        }
        let groups = s
            .split(',')
            .map(|group| {
                group
                    .trim()
                    .chars()
                    .map(|key| {
                        Direction::from_key(key)
                            .ok_or_else(|| format!("unknown key '{}' (use w, a, s, d)", key))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ScriptArg(groups))
    }
}

pub fn run() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("maskhunt=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(command: Command) -> Result<(), String> {
    match command {
        Command::Play {
            config,
            level,
            ability,
            seed,
            ticks,
            frame_ms,
            script,
            realtime,
            json,
        } => run_play(PlayOptions {
            config,
            level,
            ability,
            seed,
            ticks,
            frame_ms,
            script,
            realtime,
            json,
        }),
        Command::Check {
            level,
            origin_x,
            origin_y,
        } => run_check(level, origin_x, origin_y),
    }
}

pub(crate) fn print_tick(tick: &TickResult) {
    println!(
        "Tick {}: {} events, {} rejections",
        tick.tick,
        tick.events.len(),
        tick.rejections.len()
    );

    for event in &tick.events {
        if matches!(
            event,
            Event::TickStarted { .. } | Event::TickCompleted { .. }
        ) {
            continue;
        }
        println!(" - {}", describe_event(event));
    }

    if !tick.rejections.is_empty() {
        println!("Rejections:");
        for rejection in &tick.rejections {
            println!(
                " - actor {} {} -> {}: {}",
                rejection.actor, rejection.from, rejection.target, rejection.reason
            );
        }
    }
}

pub(crate) fn describe_event(event: &Event) -> String {
    match event {
        Event::TickStarted { tick } => format!("tick {} started", tick),
        Event::TickCompleted { tick } => format!("tick {} completed", tick),
        Event::ActorSpawned {
            actor,
            role,
            ability,
            position,
        } => format!(
            "{:?} {} spawned wearing {} at {}",
            role,
            actor,
            ability.mask_name(),
            position
        ),
        Event::CollectiblePlaced { ability, position } => {
            format!("{} mask dropped at {}", ability.mask_name(), position)
        }
        Event::SpawnWarning {
            position,
            spawn_tick,
        } => format!("warning: spawn at {} on tick {}", position, spawn_tick),
        Event::SpawnFailed { position, error } => {
            format!("spawn at {} skipped: {}", position, error)
        }
        Event::ActorMoved { actor, from, to } => {
            format!("actor {} moved from {} to {}", actor, from, to)
        }
        Event::ActorRested { actor } => format!("actor {} rests", actor),
        Event::ActorStalled { actor, position } => {
            format!("actor {} is boxed in at {}", actor, position)
        }
        Event::AbilityChanged {
            actor,
            from,
            to,
            position,
        } => format!(
            "actor {} swapped {} for {} at {}",
            actor,
            from.mask_name(),
            to.mask_name(),
            position
        ),
        Event::ActorCaught {
            actor,
            pursuer,
            cause,
        } => format!(
            "actor {} caught by {} ({})",
            actor,
            pursuer,
            cause.mask_name()
        ),
    }
}
