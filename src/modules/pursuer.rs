//! Phase 2: pursuer movement and the neighborhood catch scan.

use rand::Rng;
use tracing::{debug, info};

use crate::modules::ability::AbilityKind;
use crate::modules::actor::ActorId;
use crate::modules::engine::{Engine, Event, TickResult, landing_verdict};
use crate::modules::grid::GridPos;

impl Engine {
    pub(crate) fn resolve_pursuer(&mut self, id: ActorId, out: &mut TickResult) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };

        // Resting pursuers neither move nor scan.
        if actor.resting {
            actor.resting = false;
            out.events.push(Event::ActorRested { actor: id });
            return;
        }

        let ability = actor.ability;
        let from = actor.position;
        let candidates = self.pursuer_candidates(from, ability);

        let position = if candidates.is_empty() {
            debug!(actor = %id, position = %from, "no legal move");
            out.events.push(Event::ActorStalled {
                actor: id,
                position: from,
            });
            from
        } else {
            let target = candidates[self.rng.gen_range(0..candidates.len())];
            self.relocate(id, target);
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.face_towards(target - from);
            }
            out.events.push(Event::ActorMoved {
                actor: id,
                from,
                to: target,
            });
            target
        };

        if let Some(prey) = self.scan_for_prey(position, ability) {
            info!(pursuer = %id, actor = %prey, cause = %ability, "actor caught");
            out.events.push(Event::ActorCaught {
                actor: prey,
                pursuer: id,
                cause: ability,
            });
        }

        if ability.rests() {
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.resting = true;
            }
        }
    }

    /// Offsets from the ability table that land in bounds, on walkable ground and
    /// on an empty cell. Pursuers never fly over terrain.
    fn pursuer_candidates(&self, from: GridPos, ability: AbilityKind) -> Vec<GridPos> {
        ability
            .pursuer_offsets()
            .unwrap_or_default()
            .iter()
            .filter_map(|offset| from.checked_add(*offset))
            .filter(|target| landing_verdict(&self.grid, *target, false).is_ok())
            .collect()
    }

    /// First controlled actor in the 3x3 block around `center` whose ability
    /// differs from the pursuer's. Matching masks are invisible to each other.
    fn scan_for_prey(&self, center: GridPos, ability: AbilityKind) -> Option<ActorId> {
        center.neighborhood().find_map(|pos| {
            let occupant = self.grid.get(pos).occupant?;
            let actor = self.actors.get(&occupant)?;
            (actor.is_controlled() && actor.ability != ability).then_some(occupant)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::modules::ability::{AbilityKind, Direction};
    use crate::modules::actor::ActorId;
    use crate::modules::engine::{Engine, Event};
    use crate::modules::grid::{Grid, GridPos, TileKind};

    fn floor_engine(width: u32, height: u32) -> Engine {
        Engine::new(
            Grid::filled(width, height, GridPos::origin(), TileKind::Floor),
            Some(42),
        )
    }

    fn position(engine: &Engine, id: ActorId) -> GridPos {
        engine.actor(id).unwrap().position
    }

    #[test]
    fn straight_takes_the_only_legal_jump() {
        let mut engine = floor_engine(1, 5);
        engine.set_tile(GridPos::new(0, 4), TileKind::Wall);
        let hawk = engine
            .spawn_pursuer(GridPos::new(0, 2), AbilityKind::Straight, 90.0)
            .unwrap();
        for _ in 0..5 {
            let tick = engine.step();
            assert!(tick.events.contains(&Event::ActorMoved {
                actor: hawk,
                from: GridPos::new(0, 2),
                to: GridPos::new(0, 0)
            }) || tick.events.contains(&Event::ActorMoved {
                actor: hawk,
                from: GridPos::new(0, 0),
                to: GridPos::new(0, 2)
            }));
        }
        let mut engine = floor_engine(1, 5);
        engine.set_tile(GridPos::new(0, 4), TileKind::Wall);
        let hawk = engine
            .spawn_pursuer(GridPos::new(0, 2), AbilityKind::Straight, 90.0)
            .unwrap();
        engine.step();
        assert_eq!(position(&engine, hawk), GridPos::new(0, 0));
        let facing = engine.actor(hawk).unwrap().facing;
        assert!((facing - -180.0).abs() < 1e-4);
    }

    #[test]
    fn stalled_pursuer_still_scans() {
        let mut engine = floor_engine(1, 2);
        let player = engine
            .spawn_controlled(GridPos::new(0, 1), AbilityKind::None, 3)
            .unwrap();
        let hawk = engine
            .spawn_pursuer(GridPos::new(0, 0), AbilityKind::Straight, 90.0)
            .unwrap();
        let tick = engine.step();
        assert_eq!(position(&engine, hawk), GridPos::origin());
        assert!(tick.events.contains(&Event::ActorStalled {
            actor: hawk,
            position: GridPos::origin()
        }));
        assert_eq!(tick.caught(), Some((player, AbilityKind::Straight)));
        assert_eq!(engine.actor(hawk).unwrap().facing, 0.0);
    }

    #[test]
    fn same_mask_is_invisible() {
        let mut engine = floor_engine(1, 2);
        engine
            .spawn_controlled(GridPos::new(0, 1), AbilityKind::Straight, 3)
            .unwrap();
        engine
            .spawn_pursuer(GridPos::new(0, 0), AbilityKind::Straight, 90.0)
            .unwrap();
        let tick = engine.step();
        assert_eq!(tick.caught(), None);
    }

    #[test]
    fn catches_after_moving_next_to_actor() {
        let mut engine = floor_engine(3, 3);
        let player = engine
            .spawn_controlled(GridPos::new(2, 2), AbilityKind::None, 3)
            .unwrap();
        let ox = engine
            .spawn_pursuer(GridPos::new(0, 0), AbilityKind::Diagonal, 90.0)
            .unwrap();
        engine
            .place_collectible(GridPos::new(2, 1), AbilityKind::Rest)
            .unwrap();
        engine.press(player, Direction::Down).unwrap();
        let tick = engine.step();
        // The player swaps to the turtle mask, then the ox lands in the center.
        assert_eq!(position(&engine, player), GridPos::new(2, 1));
        assert_eq!(position(&engine, ox), GridPos::new(1, 1));
        assert_eq!(tick.caught(), Some((player, AbilityKind::Diagonal)));
        assert_eq!(tick.catches().count(), 1);
    }

    #[test]
    fn resting_pursuer_skips_scan() {
        let mut engine = floor_engine(1, 3);
        let turtle = engine
            .spawn_pursuer(GridPos::new(0, 0), AbilityKind::Rest, 90.0)
            .unwrap();
        let first = engine.step();
        assert!(
            first
                .events
                .iter()
                .any(|e| matches!(e, Event::ActorMoved { actor, .. } if *actor == turtle))
        );
        assert_eq!(position(&engine, turtle), GridPos::new(0, 1));

        engine.set_tile(GridPos::new(0, 0), TileKind::Wall);
        let player = engine
            .spawn_controlled(GridPos::new(0, 2), AbilityKind::None, 3)
            .unwrap();

        let resting = engine.step();
        assert!(resting.events.contains(&Event::ActorRested { actor: turtle }));
        assert_eq!(resting.caught(), None);

        let awake = engine.step();
        assert!(awake.events.contains(&Event::ActorStalled {
            actor: turtle,
            position: GridPos::new(0, 1)
        }));
        assert_eq!(awake.caught(), Some((player, AbilityKind::Rest)));
        assert!(engine.actor(turtle).unwrap().resting);
    }

    #[test]
    fn earlier_pursuer_frees_cell_for_later_one() {
        let mut engine = floor_engine(3, 1);
        let first = engine
            .spawn_pursuer(GridPos::new(1, 0), AbilityKind::None, 90.0)
            .unwrap();
        let second = engine
            .spawn_pursuer(GridPos::new(2, 0), AbilityKind::None, 90.0)
            .unwrap();
        engine.step();
        assert_eq!(position(&engine, first), GridPos::new(0, 0));
        assert_eq!(position(&engine, second), GridPos::new(1, 0));
        assert_eq!(engine.grid().occupant(GridPos::new(2, 0)), None);
    }

    #[test]
    fn knight_candidates_skip_occupied_and_walls() {
        let mut engine = floor_engine(3, 3);
        let fox = engine
            .spawn_pursuer(GridPos::new(0, 0), AbilityKind::LShape, 0.0)
            .unwrap();
        engine.set_tile(GridPos::new(1, 2), TileKind::Wall);
        engine.step();
        assert_eq!(position(&engine, fox), GridPos::new(2, 1));
        let facing = engine.actor(fox).unwrap().facing;
        assert!((facing - 26.565_05).abs() < 1e-3);
    }

    #[test]
    fn pursuer_at_i32_edge_drops_overflowing_candidates() {
        let origin = GridPos::new(i32::MAX - 2, 0);
        let mut engine = Engine::new(Grid::filled(3, 3, origin, TileKind::Floor), Some(42));
        let hawk = engine
            .spawn_pursuer(GridPos::new(i32::MAX, 1), AbilityKind::Straight, 90.0)
            .unwrap();
        let tick = engine.step();
        assert_eq!(position(&engine, hawk), GridPos::new(i32::MAX - 2, 1));
        assert!(tick.caught().is_none());
    }
}
