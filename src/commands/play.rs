use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use maskhunt::{
    AbilityKind, ArrowLevels, DEFAULT_CONFIG_PATH, GameConfig, Level, Outcome, Session,
    TickListener, TickResult,
};

use super::{ScriptArg, print_tick};

pub struct PlayOptions {
    pub config: Option<PathBuf>,
    pub level: Option<PathBuf>,
    pub ability: Option<AbilityKind>,
    pub seed: Option<u64>,
    pub ticks: Option<u64>,
    pub frame_ms: u64,
    pub script: ScriptArg,
    pub realtime: bool,
    pub json: bool,
}

/// Prints the survival countdown and every resolved tick.
struct Hud {
    target: u64,
}

impl TickListener for Hud {
    fn tick_advanced(&mut self, tick: u64) {
        let left = self.target.saturating_sub(tick);
        let urgency = if left <= 10 { " !" } else { "" };
        println!("== SURVIVE: {}{} ==", left, urgency);
    }

    fn tick_resolved(&mut self, result: &TickResult) {
        print_tick(result);
    }

    fn outcome_reached(&mut self, outcome: Outcome) {
        println!();
        println!("*** {} ***", outcome);
    }
}

/// Runs frames until the session ends or `max_ticks` have fired. Each tick's
/// script group is pressed right before that tick, however many ticks a frame drains.
fn drive(session: &mut Session, opts: &PlayOptions, max_ticks: u64) -> Result<(), String> {
    let dt = opts.frame_ms as f32 / 1000.0;
    let mut failure = None;
    while !session.outcome().is_over() && session.engine().tick() < max_ticks {
        session.advance_with(dt, |session, upcoming| {
            if upcoming > max_ticks {
                return ControlFlow::Break(());
            }
            let keys = opts.script.group(upcoming);
            for dir in keys {
                if let Err(e) = session.press(*dir) {
                    failure = Some(e.to_string());
                    return ControlFlow::Break(());
                }
            }
            if !opts.json && !keys.is_empty() {
                let arrows = session
                    .player()
                    .and_then(|id| session.engine().predicted_pattern(id))
                    .map(ArrowLevels::from_pattern)
                    .unwrap_or_default();
                println!("input for tick {}: {}", upcoming, arrows.render());
            }
            ControlFlow::Continue(())
        });
        if let Some(error) = failure.take() {
            return Err(error);
        }
        if opts.realtime {
            thread::sleep(Duration::from_millis(opts.frame_ms));
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig, String> {
    let config = match path {
        Some(path) => GameConfig::load(path),
        None => GameConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    };
    config.map_err(|e| e.to_string())
}

pub fn run_play(opts: PlayOptions) -> Result<(), String> {
    if opts.frame_ms == 0 {
        return Err("--frame-ms must be at least 1".into());
    }

    let mut config = load_config(opts.config.as_deref())?;
    if let Some(ability) = opts.ability {
        config.player.ability = ability;
    }
    if opts.seed.is_some() {
        config.session.seed = opts.seed;
    }

    let level_path = opts
        .level
        .clone()
        .or_else(|| config.level.path.clone())
        .ok_or("no level given; pass --level or set [level].path")?;
    let level = Level::load(&level_path, config.level.origin()).map_err(|e| e.to_string())?;
    if level.player.is_none() {
        return Err(format!("level {} has no '@' start", level_path.display()));
    }

    let mut session = config
        .session_builder()
        .map_err(|e| e.to_string())?
        .level(level)
        .build()
        .map_err(|e| e.to_string())?;

    let max_ticks = opts.ticks.unwrap_or(session.target_survival_ticks());
    if !opts.json {
        println!(
            "Level {} | {}x{} | ability={} | target={} ticks",
            level_path.display(),
            session.engine().grid().width(),
            session.engine().grid().height(),
            config.player.ability.mask_name(),
            session.target_survival_ticks()
        );
        session.add_listener(Box::new(Hud {
            target: session.target_survival_ticks(),
        }));
    }

    drive(&mut session, &opts, max_ticks)?;

    if opts.json {
        let json = session.engine().snapshot().to_json().map_err(|e| e.to_string())?;
        println!("{}", json);
    } else if !session.outcome().is_over() {
        println!();
        println!(
            "Stopped after {} ticks, {} to go",
            session.engine().tick(),
            session.ticks_remaining()
        );
    }
    Ok(())
}
