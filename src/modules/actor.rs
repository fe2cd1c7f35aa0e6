use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::ability::AbilityKind;
use crate::modules::grid::GridPos;
use crate::modules::input::Controls;

/// Stable arena handle. Assigned in spawn order; phases iterate in ascending id.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Controlled,
    Pursuer,
}

#[derive(Clone, Debug)]
pub enum ActorKind {
    Controlled(Controls),
    Pursuer,
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub position: GridPos,
    pub ability: AbilityKind,
    /// Sprite rotation in degrees, already corrected by `sprite_base_angle`.
    pub facing: f32,
    pub resting: bool,
    /// Angle the sprite art points at when unrotated; cosmetic only.
    pub sprite_base_angle: f32,
    pub kind: ActorKind,
}

impl Actor {
    pub fn role(&self) -> Role {
        match self.kind {
            ActorKind::Controlled(_) => Role::Controlled,
            ActorKind::Pursuer => Role::Pursuer,
        }
    }

    pub fn is_controlled(&self) -> bool {
        self.role() == Role::Controlled
    }

    pub fn controls(&self) -> Option<&Controls> {
        match &self.kind {
            ActorKind::Controlled(controls) => Some(controls),
            ActorKind::Pursuer => None,
        }
    }

    pub fn controls_mut(&mut self) -> Option<&mut Controls> {
        match &mut self.kind {
            ActorKind::Controlled(controls) => Some(controls),
            ActorKind::Pursuer => None,
        }
    }

    /// Right is 0 degrees, up is 90.
    pub fn face_towards(&mut self, delta: GridPos) {
        let angle = (delta.y as f32).atan2(delta.x as f32).to_degrees();
        self.facing = angle - self.sprite_base_angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pursuer(sprite_base_angle: f32) -> Actor {
        Actor {
            id: ActorId(7),
            position: GridPos::origin(),
            ability: AbilityKind::Straight,
            facing: 0.0,
            resting: false,
            sprite_base_angle,
            kind: ActorKind::Pursuer,
        }
    }

    #[test]
    fn facing_subtracts_sprite_base_angle() {
        let mut actor = pursuer(90.0);
        actor.face_towards(GridPos::new(2, 0));
        assert!((actor.facing - -90.0).abs() < 1e-4);
        actor.face_towards(GridPos::new(0, 2));
        assert!(actor.facing.abs() < 1e-4);
        actor.face_towards(GridPos::new(-1, 1));
        assert!((actor.facing - 45.0).abs() < 1e-4);
    }

    #[test]
    fn pursuers_have_no_controls() {
        let actor = pursuer(0.0);
        assert_eq!(actor.role(), Role::Pursuer);
        assert!(actor.controls().is_none());
        assert_eq!(actor.id.to_string(), "#7");
    }
}
