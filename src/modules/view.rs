use serde::{Deserialize, Serialize};

use crate::modules::ability::{AbilityKind, Direction};
use crate::modules::actor::{ActorId, Role};
use crate::modules::grid::GridPos;
use crate::modules::input::MovementPattern;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub role: Role,
    pub ability: AbilityKind,
    pub position: GridPos,
    pub facing: f32,
    pub resting: bool,
    /// Steps the next tick would apply; empty for pursuers.
    #[serde(default)]
    pub predicted: Vec<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    pub origin: GridPos,
    pub actors: Vec<ActorSnapshot>,
    pub collectibles: Vec<(GridPos, AbilityKind)>,
}

impl WorldSnapshot {
    pub fn actor(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Arrow strength per direction around the controlled actor: 0 (idle),
/// 1 (one cell) or 2 (two or more cells) along that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowLevels {
    pub up: u8,
    pub down: u8,
    pub left: u8,
    pub right: u8,
}

fn level(displacement: i32) -> u8 {
    match displacement {
        i32::MIN..=0 => 0,
        1 => 1,
        _ => 2,
    }
}

impl ArrowLevels {
    pub fn from_pattern(pattern: &MovementPattern) -> Self {
        let net = pattern.net();
        Self {
            up: level(net.y),
            down: level(-net.y),
            left: level(-net.x),
            right: level(net.x),
        }
    }

    pub fn get(&self, dir: Direction) -> u8 {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// HUD line in up, down, left, right order; `.` marks an idle direction.
    pub fn render(&self) -> String {
        Direction::ALL
            .iter()
            .map(|dir| {
                let glyph = match dir {
                    Direction::Up => '^',
                    Direction::Down => 'v',
                    Direction::Left => '<',
                    Direction::Right => '>',
                };
                match self.get(*dir) {
                    0 => ".".to_string(),
                    n => glyph.to_string().repeat(n as usize),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
