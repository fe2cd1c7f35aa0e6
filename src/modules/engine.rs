use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::modules::ability::{AbilityKind, Direction};
use crate::modules::actor::{Actor, ActorId, ActorKind, Role};
use crate::modules::error::EngineError;
use crate::modules::grid::{Grid, GridPos, TileKind};
use crate::modules::input::{Controls, MovementPattern};
use crate::modules::view::{ActorSnapshot, WorldSnapshot};

/// Pursuer sprites point up when unrotated.
pub const DEFAULT_SPRITE_BASE_ANGLE: f32 = 90.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    TickStarted {
        tick: u64,
    },
    TickCompleted {
        tick: u64,
    },
    ActorSpawned {
        actor: ActorId,
        role: Role,
        ability: AbilityKind,
        position: GridPos,
    },
    CollectiblePlaced {
        ability: AbilityKind,
        position: GridPos,
    },
    SpawnWarning {
        position: GridPos,
        spawn_tick: u64,
    },
    SpawnFailed {
        position: GridPos,
        error: EngineError,
    },
    ActorMoved {
        actor: ActorId,
        from: GridPos,
        to: GridPos,
    },
    /// Forced idle turn.
    ActorRested {
        actor: ActorId,
    },
    /// Pursuer found no legal candidate and held its cell.
    ActorStalled {
        actor: ActorId,
        position: GridPos,
    },
    AbilityChanged {
        actor: ActorId,
        from: AbilityKind,
        to: AbilityKind,
        position: GridPos,
    },
    ActorCaught {
        actor: ActorId,
        pursuer: ActorId,
        cause: AbilityKind,
    },
}

/// Why a move left the world unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    OutOfBounds,
    Blocked(TileKind),
    Occupied(ActorId),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::OutOfBounds => write!(f, "target is outside the grid"),
            RejectReason::Blocked(kind) => write!(f, "target is {}", kind),
            RejectReason::Occupied(other) => write!(f, "target is held by {}", other),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRejection {
    pub actor: ActorId,
    pub from: GridPos,
    pub target: GridPos,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    pub tick: u64,
    pub events: Vec<Event>,
    pub rejections: Vec<MoveRejection>,
}

impl TickResult {
    fn new(tick: u64) -> Self {
        Self {
            tick,
            events: vec![Event::TickStarted { tick }],
            rejections: Vec::new(),
        }
    }

    /// First catch of the tick as `(caught actor, cause)`.
    pub fn caught(&self) -> Option<(ActorId, AbilityKind)> {
        self.events.iter().find_map(|e| match e {
            Event::ActorCaught { actor, cause, .. } => Some((*actor, *cause)),
            _ => None,
        })
    }

    pub fn catches(&self) -> impl Iterator<Item = AbilityKind> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::ActorCaught { cause, .. } => Some(*cause),
            _ => None,
        })
    }
}

/// Legality of landing on `target`. Occupied cells are refused for everyone;
/// walls and void only for movers without terrain passthrough.
pub(crate) fn landing_verdict(
    grid: &Grid,
    target: GridPos,
    passthrough: bool,
) -> Result<(), RejectReason> {
    if !grid.is_valid(target) {
        return Err(RejectReason::OutOfBounds);
    }
    let cell = grid.get(target);
    if !passthrough && !cell.kind.is_walkable() {
        return Err(RejectReason::Blocked(cell.kind));
    }
    if let Some(other) = cell.occupant {
        return Err(RejectReason::Occupied(other));
    }
    Ok(())
}

/// The simulation core: grid, actor arena and the two-phase tick.
#[derive(Debug)]
pub struct Engine {
    pub(crate) tick: u64,
    pub(crate) grid: Grid,
    pub(crate) actors: BTreeMap<ActorId, Actor>,
    next_actor_id: u32,
    pub(crate) rng: StdRng,
}

impl Engine {
    /// Without a seed the pursuer RNG is drawn from entropy.
    pub fn new(grid: Grid, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            tick: 0,
            grid,
            actors: BTreeMap::new(),
            next_actor_id: 1,
            rng,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Changes terrain only; occupancy and collectibles stay put.
    pub fn set_tile(&mut self, pos: GridPos, kind: TileKind) {
        self.grid.set_kind(pos, kind);
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// All actors in ascending id order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    fn ids_with_role(&self, role: Role) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|a| a.role() == role)
            .map(|a| a.id)
            .collect()
    }

    pub fn controlled_ids(&self) -> Vec<ActorId> {
        self.ids_with_role(Role::Controlled)
    }

    pub fn pursuer_ids(&self) -> Vec<ActorId> {
        self.ids_with_role(Role::Pursuer)
    }

    fn spawn(
        &mut self,
        position: GridPos,
        ability: AbilityKind,
        sprite_base_angle: f32,
        kind: ActorKind,
    ) -> Result<ActorId, EngineError> {
        if !self.grid.is_valid(position) {
            return Err(EngineError::OutOfBounds(position));
        }
        if let Some(occupant) = self.grid.occupant(position) {
            return Err(EngineError::CellOccupied { position, occupant });
        }

        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;
        self.grid.register_occupant(position, id);

        let actor = Actor {
            id,
            position,
            ability,
            facing: 0.0,
            resting: false,
            sprite_base_angle,
            kind,
        };
        info!(actor = %id, role = ?actor.role(), %ability, %position, "actor spawned");
        self.actors.insert(id, actor);
        Ok(id)
    }

    pub fn spawn_controlled(
        &mut self,
        position: GridPos,
        ability: AbilityKind,
        buffer_capacity: usize,
    ) -> Result<ActorId, EngineError> {
        self.spawn(
            position,
            ability,
            0.0,
            ActorKind::Controlled(Controls::new(buffer_capacity)),
        )
    }

    pub fn spawn_pursuer(
        &mut self,
        position: GridPos,
        ability: AbilityKind,
        sprite_base_angle: f32,
    ) -> Result<ActorId, EngineError> {
        if ability.pursuer_offsets().is_none() {
            return Err(EngineError::UnsupportedPursuerAbility(ability));
        }
        self.spawn(position, ability, sprite_base_angle, ActorKind::Pursuer)
    }

    pub fn place_collectible(
        &mut self,
        position: GridPos,
        ability: AbilityKind,
    ) -> Result<(), EngineError> {
        if !self.grid.place_collectible(position, ability) {
            return Err(EngineError::OutOfBounds(position));
        }
        Ok(())
    }

    /// Removes the actor and releases its cell.
    pub fn despawn(&mut self, id: ActorId) -> Result<Actor, EngineError> {
        let actor = self
            .actors
            .remove(&id)
            .ok_or(EngineError::ActorNotFound(id))?;
        self.grid.unregister_occupant(actor.position, id);
        info!(actor = %id, position = %actor.position, "actor despawned");
        Ok(actor)
    }

    fn controls_mut(&mut self, id: ActorId) -> Result<(&mut Controls, AbilityKind), EngineError> {
        let actor = self
            .actors
            .get_mut(&id)
            .ok_or(EngineError::ActorNotFound(id))?;
        let ability = actor.ability;
        let controls = actor.controls_mut().ok_or(EngineError::NotControlled(id))?;
        Ok((controls, ability))
    }

    /// Routes one raw key-down to a controlled actor.
    pub fn press(&mut self, id: ActorId, dir: Direction) -> Result<(), EngineError> {
        let (controls, ability) = self.controls_mut(id)?;
        controls.add_input(dir, ability);
        Ok(())
    }

    pub fn reset_input(&mut self, id: ActorId) -> Result<(), EngineError> {
        let (controls, _) = self.controls_mut(id)?;
        controls.reset();
        Ok(())
    }

    /// Steps the actor would take if the tick fired now.
    pub fn predicted_pattern(&self, id: ActorId) -> Option<&MovementPattern> {
        self.actors.get(&id)?.controls().map(|c| c.pattern())
    }

    /// Unregister-then-register, keeping the stored position in lockstep.
    pub(crate) fn relocate(&mut self, id: ActorId, to: GridPos) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        self.grid.unregister_occupant(actor.position, id);
        self.grid.register_occupant(to, id);
        actor.position = to;
    }

    /// Runs one tick: every controlled actor, then every pursuer, each group in
    /// ascending id order. Moves made earlier in a phase are visible to later actors.
    pub fn step(&mut self) -> TickResult {
        let tick = self.tick + 1;
        self.tick = tick;
        let mut result = TickResult::new(tick);

        for id in self.controlled_ids() {
            self.resolve_controlled(id, &mut result);
        }

        for id in self.pursuer_ids() {
            self.resolve_pursuer(id, &mut result);
        }

        result.events.push(Event::TickCompleted { tick });
        result
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let actors = self
            .actors
            .values()
            .map(|a| ActorSnapshot {
                id: a.id,
                role: a.role(),
                ability: a.ability,
                position: a.position,
                facing: a.facing,
                resting: a.resting,
                predicted: a
                    .controls()
                    .map(|c| c.pattern().steps().to_vec())
                    .unwrap_or_default(),
            })
            .collect();

        WorldSnapshot {
            tick: self.tick,
            width: self.grid.width(),
            height: self.grid.height(),
            origin: self.grid.origin(),
            actors,
            collectibles: self.grid.collectibles().collect(),
        }
    }
}
