use std::fmt;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::modules::ability::{AbilityKind, Direction};
use crate::modules::actor::{ActorId, Role};
use crate::modules::clock::Clock;
use crate::modules::engine::{DEFAULT_SPRITE_BASE_ANGLE, Engine, Event, TickResult};
use crate::modules::error::{EngineError, SetupError};
use crate::modules::grid::{Grid, GridPos};
use crate::modules::input::DEFAULT_BUFFER_CAPACITY;
use crate::modules::level::Level;
use crate::modules::spawn::{Prefab, ScheduleAction, SpawnSchedule};

pub const DEFAULT_TARGET_SURVIVAL_TICKS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Outcome {
    Running,
    Victory {
        tick: u64,
    },
    Caught {
        tick: u64,
        actor: ActorId,
        by: AbilityKind,
    },
}

impl Outcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::Running)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Running => write!(f, "RUNNING"),
            Outcome::Victory { .. } => write!(f, "SURVIVED"),
            Outcome::Caught { by, .. } => {
                write!(f, "HUNTED BY {}", by.mask_name().to_uppercase())
            }
        }
    }
}

/// Presentation hook. Called after every fired tick, in registration order.
pub trait TickListener {
    fn tick_advanced(&mut self, _tick: u64) {}

    /// Fired once, when a catch ends the session.
    fn actor_caught(&mut self, _cause: AbilityKind) {}

    fn tick_resolved(&mut self, _result: &TickResult) {}

    fn outcome_reached(&mut self, _outcome: Outcome) {}
}

#[derive(Debug, Clone, Copy)]
enum Placement {
    Controlled(GridPos, AbilityKind),
    Pursuer(GridPos, AbilityKind),
    Collectible(GridPos, AbilityKind),
}

pub struct SessionBuilder {
    grid: Option<Grid>,
    clock: Option<Clock>,
    seed: Option<u64>,
    target_survival_ticks: u64,
    schedule: SpawnSchedule,
    buffer_capacity: usize,
    sprite_base_angle: f32,
    player_ability: AbilityKind,
    player_start: Option<GridPos>,
    placements: Vec<Placement>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            grid: None,
            clock: None,
            seed: None,
            target_survival_ticks: DEFAULT_TARGET_SURVIVAL_TICKS,
            schedule: SpawnSchedule::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            sprite_base_angle: DEFAULT_SPRITE_BASE_ANGLE,
            player_ability: AbilityKind::None,
            player_start: None,
            placements: Vec::new(),
        }
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn target_survival_ticks(mut self, ticks: u64) -> Self {
        self.target_survival_ticks = ticks;
        self
    }

    pub fn schedule(mut self, schedule: SpawnSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Base angle for pursuers placed by the builder or by a level.
    pub fn sprite_base_angle(mut self, angle: f32) -> Self {
        self.sprite_base_angle = angle;
        self
    }

    /// Starting ability for the level's `@` actor.
    pub fn player_ability(mut self, ability: AbilityKind) -> Self {
        self.player_ability = ability;
        self
    }

    pub fn controlled(mut self, position: GridPos, ability: AbilityKind) -> Self {
        self.placements.push(Placement::Controlled(position, ability));
        self
    }

    pub fn pursuer(mut self, position: GridPos, ability: AbilityKind) -> Self {
        self.placements.push(Placement::Pursuer(position, ability));
        self
    }

    pub fn collectible(mut self, position: GridPos, ability: AbilityKind) -> Self {
        self.placements.push(Placement::Collectible(position, ability));
        self
    }

    /// Takes the level's terrain and its initial placements.
    pub fn level(mut self, level: Level) -> Self {
        self.player_start = level.player;
        for (pos, ability) in level.pursuers {
            self.placements.push(Placement::Pursuer(pos, ability));
        }
        for (pos, ability) in level.collectibles {
            self.placements.push(Placement::Collectible(pos, ability));
        }
        self.grid = Some(level.grid);
        self
    }

    pub fn build(self) -> Result<Session, SetupError> {
        self.assemble().inspect_err(|e| error!(error = %e, "session setup failed"))
    }

    fn assemble(self) -> Result<Session, SetupError> {
        let grid = self.grid.ok_or(SetupError::MissingGrid)?;
        let clock = self.clock.ok_or(SetupError::MissingClock)?;

        let mut engine = Engine::new(grid, self.seed);
        // The level's actor spawns first so it gets the lowest id.
        if let Some(start) = self.player_start {
            engine.spawn_controlled(start, self.player_ability, self.buffer_capacity)?;
        }
        for placement in self.placements {
            match placement {
                Placement::Controlled(pos, ability) => {
                    engine.spawn_controlled(pos, ability, self.buffer_capacity)?;
                }
                Placement::Pursuer(pos, ability) => {
                    engine.spawn_pursuer(pos, ability, self.sprite_base_angle)?;
                }
                Placement::Collectible(pos, ability) => {
                    engine.place_collectible(pos, ability)?;
                }
            }
        }

        info!(
            target_survival_ticks = self.target_survival_ticks,
            scheduled_spawns = self.schedule.entries().len(),
            "session ready"
        );
        Ok(Session {
            engine,
            clock,
            schedule: self.schedule,
            target_survival_ticks: self.target_survival_ticks,
            outcome: Outcome::Running,
            listeners: Vec::new(),
        })
    }
}

/// A running game: engine, clock, spawn schedule and the win/lose check.
pub struct Session {
    engine: Engine,
    clock: Clock,
    schedule: SpawnSchedule,
    target_survival_ticks: u64,
    outcome: Outcome,
    listeners: Vec<Box<dyn TickListener>>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn schedule(&self) -> &SpawnSchedule {
        &self.schedule
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn target_survival_ticks(&self) -> u64 {
        self.target_survival_ticks
    }

    /// Ticks left until victory.
    pub fn ticks_remaining(&self) -> u64 {
        self.target_survival_ticks.saturating_sub(self.engine.tick())
    }

    /// The lowest-id controlled actor.
    pub fn player(&self) -> Option<ActorId> {
        self.engine.controlled_ids().first().copied()
    }

    /// Routes a key-down to the player actor.
    pub fn press(&mut self, dir: Direction) -> Result<(), EngineError> {
        let id = self.player().ok_or(EngineError::NoControlledActor)?;
        self.engine.press(id, dir)
    }

    pub fn add_listener(&mut self, listener: Box<dyn TickListener>) {
        self.listeners.push(listener);
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// No effect once the session has an outcome.
    pub fn resume(&mut self) {
        if !self.outcome.is_over() {
            self.clock.resume();
        }
    }

    /// Feeds frame time to the clock and fires whatever ticks it allows.
    pub fn advance(&mut self, dt: f32) -> Vec<TickResult> {
        self.advance_with(dt, |_, _| ControlFlow::Continue(()))
    }

    /// Like `advance`, but calls `before_tick` with the upcoming tick number
    /// right before each tick fires. `Break` stops without firing that tick.
    pub fn advance_with<F>(&mut self, dt: f32, mut before_tick: F) -> Vec<TickResult>
    where
        F: FnMut(&mut Session, u64) -> ControlFlow<()>,
    {
        self.clock.advance(dt);
        let mut fired = Vec::new();
        while !self.outcome.is_over() && self.clock.poll() {
            let upcoming = self.engine.tick() + 1;
            if before_tick(self, upcoming).is_break() {
                break;
            }
            match self.fire_tick() {
                Some(result) => fired.push(result),
                None => break,
            }
        }
        fired
    }

    /// Fires one tick now, bypassing the clock's timer. `None` when paused or over.
    pub fn fire_tick(&mut self) -> Option<TickResult> {
        if self.clock.is_paused() || self.outcome.is_over() {
            return None;
        }

        let mut result = self.engine.step();
        let tick = result.tick;
        let completed = result.events.pop();
        self.apply_schedule(tick, &mut result.events);
        result.events.extend(completed);

        // Survival counts in phase 1, so it wins over a same-tick catch.
        if tick >= self.target_survival_ticks {
            self.outcome = Outcome::Victory { tick };
            self.clock.pause();
            info!(tick, "survived");
        } else if let Some((actor, cause)) = result.caught() {
            self.outcome = Outcome::Caught {
                tick,
                actor,
                by: cause,
            };
            self.clock.pause();
            info!(tick, %actor, by = cause.mask_name(), "hunted");
        }

        for listener in &mut self.listeners {
            listener.tick_advanced(tick);
            listener.tick_resolved(&result);
            if let Outcome::Caught { by, .. } = self.outcome {
                listener.actor_caught(by);
            }
            if self.outcome.is_over() {
                listener.outcome_reached(self.outcome);
            }
        }

        Some(result)
    }

    fn apply_schedule(&mut self, tick: u64, events: &mut Vec<Event>) {
        for action in self.schedule.poll(tick) {
            match action {
                ScheduleAction::Warn {
                    position,
                    spawn_tick,
                } => {
                    let position = self.engine.grid().world_to_grid(position);
                    debug!(%position, spawn_tick, "spawn warning");
                    events.push(Event::SpawnWarning {
                        position,
                        spawn_tick,
                    });
                }
                ScheduleAction::Spawn { prefab, position } => {
                    let position = self.engine.grid().world_to_grid(position);
                    let spawned = match prefab {
                        Prefab::Pursuer {
                            ability,
                            sprite_base_angle,
                        } => self
                            .engine
                            .spawn_pursuer(position, ability, sprite_base_angle)
                            .map(|actor| Event::ActorSpawned {
                                actor,
                                role: Role::Pursuer,
                                ability,
                                position,
                            }),
                        Prefab::Collectible { ability } => self
                            .engine
                            .place_collectible(position, ability)
                            .map(|()| Event::CollectiblePlaced { ability, position }),
                    };
                    match spawned {
                        Ok(event) => events.push(event),
                        Err(error) => {
                            warn!(tick, %position, prefab = %prefab.label(), %error, "spawn skipped");
                            events.push(Event::SpawnFailed { position, error });
                        }
                    }
                }
            }
        }
    }
}
