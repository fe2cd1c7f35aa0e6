//! Phase 1: controlled-actor movement and collectible pickup.

use tracing::{debug, info};

use crate::modules::actor::ActorId;
use crate::modules::engine::{
    Engine, Event, MoveRejection, RejectReason, TickResult, landing_verdict,
};
use crate::modules::grid::GridPos;

impl Engine {
    pub(crate) fn resolve_controlled(&mut self, id: ActorId, out: &mut TickResult) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };

        // A resting turn keeps whatever was buffered for the next one.
        if actor.resting {
            actor.resting = false;
            out.events.push(Event::ActorRested { actor: id });
            return;
        }

        let ability = actor.ability;
        let from = actor.position;
        let Some(controls) = actor.controls_mut() else {
            return;
        };
        let net = controls.pattern().net();
        controls.reset();

        if net == GridPos::origin() {
            return;
        }

        let target = from + net;
        let verdict = match from.checked_add(net) {
            Some(_) => landing_verdict(&self.grid, target, ability.ignores_terrain()),
            None => Err(RejectReason::OutOfBounds),
        };
        if let Err(reason) = verdict {
            debug!(actor = %id, %from, %target, %reason, "move rejected");
            out.rejections.push(MoveRejection {
                actor: id,
                from,
                target,
                reason,
            });
            return;
        }

        if let Some(picked) = self.grid.take_collectible(target) {
            actor.ability = picked;
            if let Some(controls) = actor.controls_mut() {
                controls.reset();
            }
            info!(actor = %id, from = %ability, to = %picked, position = %target, "mask picked up");
            out.events.push(Event::AbilityChanged {
                actor: id,
                from: ability,
                to: picked,
                position: target,
            });
        }

        if actor.ability.rests() {
            actor.resting = true;
        }
        self.relocate(id, target);
        out.events.push(Event::ActorMoved {
            actor: id,
            from,
            to: target,
        });
    }
}
